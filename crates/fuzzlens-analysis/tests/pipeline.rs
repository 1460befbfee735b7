use expect_test::expect;
use fuzzlens_analysis::consistency::ConsistencyLog;
use fuzzlens_analysis::metrics::{metric_panels, MetricRun};
use fuzzlens_analysis::observer::ObserverAgreement;
use fuzzlens_analysis::system_load::LoadReport;
use fuzzlens_log::LogScanner;
use std::io::Write;

const CAMPAIGN: &str = "\
[Calibration] consistency_ratios for input of len 2: 10, 5
[Calibration] consistency_ratios for input of len 2: 8, 2, 2
[Calibration] Input inconsistent
[Calibration] consistency_ratios for input of len 3: 12
[Calibration] 12 tries, still unstable
[Observer] Observer correctness stats for input of len 2: both wrong: 1, first wrong/second right: 0, first right/second wrong: 1, both right: 2
";

#[test]
fn consistency_and_observers_from_one_log() {
    let events = LogScanner::new().parse(CAMPAIGN);

    let consistency = ConsistencyLog::from_events(&events);
    let summary = consistency.summary().unwrap();
    assert_eq!(summary.unfixed, 1);
    assert_eq!(summary.max_replay, 12);
    assert_eq!(consistency.unstable_notes.len(), 1);

    let ranges = consistency.global_ranges().unwrap();
    assert_eq!(ranges.length, (1, 3));

    let observers = ObserverAgreement::from_events(&events);
    assert_eq!(observers.overall_mean(), Some([0.25, 0.0, 0.25, 0.5]));
}

#[test]
fn system_load_report() {
    let top = "\
top - 10:00:01 up 3 days,  1 user,  load average: 1.10, 1.20, 1.30
Tasks: 200 total,   2 running, 198 sleeping,   0 stopped,   0 zombie
%Cpu(s): 10.0 us,  2.0 sy,  0.0 ni, 88.0 id,  0.0 wa,  0.0 hi,  0.0 si,  0.0 st
MiB Mem :  16000.0 total,   4000.0 free,   8000.0 used,   4000.0 buff/cache
MiB Swap:   2048.0 total,   2048.0 free,      0.0 used.   7000.0 avail Mem
top - 10:00:04 up 3 days,  1 user,  load average: 1.30, 1.40, 1.50
Tasks: 202 total,   4 running, 198 sleeping,   0 stopped,   0 zombie
%Cpu(s): 20.0 us,  4.0 sy,  0.0 ni, 76.0 id,  0.0 wa,  0.0 hi,  0.0 si,  0.0 st
MiB Mem :  16000.0 total,   3000.0 free,   9000.0 used,   4000.0 buff/cache
MiB Swap:   2048.0 total,   2048.0 free,      0.0 used.   6000.0 avail Mem
";
    let report = LoadReport::from_events(&LogScanner::new().parse(top));
    expect![[r#"
        top - load average: 1.20, 1.30, 1.40
        Tasks: 201 total, 3 running, 198 sleeping, 0 stopped, 0 zombie
        %Cpu(s): 15.0 us, 3.0 sy, 0.0 ni, 82.0 id, 0.0 wa, 0.0 hi, 0.0 si, 0.0 st
        MiB Mem : 16000.0 total, 3500.0 free, 8500.0 used, 4000.0 buff/cache
        MiB Swap: 2048.0 total, 2048.0 free, 0.0 used, 6500.0 avail Mem
    "#]]
    .assert_eq(&report.render());
}

#[test]
fn partial_top_output_reports_missing_sections() {
    let report = LoadReport::from_events(
        &LogScanner::new().parse("top - 10:00:01 up 1 min,  load average: 0.50, 0.25, 0.75\n"),
    );
    expect![[r#"
        top - load average: 0.50, 0.25, 0.75
        Tasks: no samples
        %Cpu(s): no samples
        MiB Mem: no samples
        MiB Swap: no samples
    "#]]
    .assert_eq(&report.render());
}

#[test]
fn metric_runs_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("campaign-a.json");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, r#"{{"run_time": 0, "corpus": {{"Number": 1}}, "exec_sec": {{"Float": 2.5}}}}"#).unwrap();
    writeln!(file, r#"{{"run_time": 30, "corpus": {{"Number": 4}}, "exec_sec": {{"Float": 3.5}}}}"#).unwrap();
    drop(file);

    let run = MetricRun::load(&path).unwrap();
    assert_eq!(run.label, "campaign-a");

    let panels = metric_panels(&[run], false).unwrap();
    assert_eq!(panels.len(), 2);
    assert_eq!(panels[0].ylabel, "corpus [count]");
    assert_eq!(panels[1].ylabel, "exec_sec [count]");
    assert_eq!(panels[1].series[0].points, vec![(0.0, 2.5), (30.0, 3.5)]);
}
