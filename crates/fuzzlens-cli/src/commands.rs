//! Subcommand bodies. Each writes its user-facing report to `out`.

use anyhow::{bail, Context, Result};
use fuzzlens_analysis::compare::{compare_chart, output_name, CompareRun, XAxis};
use fuzzlens_analysis::consistency::ConsistencyLog;
use fuzzlens_analysis::metrics::{metric_panels, run_label, MetricRun};
use fuzzlens_analysis::monitor::MonitorLog;
use fuzzlens_analysis::observer::ObserverAgreement;
use fuzzlens_analysis::profile::ProfileSet;
use fuzzlens_analysis::system_load::LoadReport;
use fuzzlens_analysis::AnalysisError;
use fuzzlens_artifacts::stability::check_executable;
use fuzzlens_artifacts::{DedupOptions, StabilityReport, Symbolizer};
use fuzzlens_log::{scan_file, LogScanner};
use fuzzlens_plot::consistency::{save_distributions, save_ratio_grid, save_sum_ratio, SingleRatioChart};
use fuzzlens_plot::observer::{save_pie, save_stacked_bars};
use fuzzlens_plot::timeseries::{save_compare_chart, save_panel_grid, TimeUnit};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The input path without its last extension.
pub fn output_base(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// `base` with `suffix` appended to its file name.
pub fn suffixed(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn title_of(base: &Path) -> String {
    base.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy)]
pub struct ConsistencyPlots {
    pub ratios: bool,
    pub distributions: bool,
    pub print_counts: bool,
}

pub fn consistency(log_path: &Path, plots: ConsistencyPlots, out: &mut dyn Write) -> Result<()> {
    let events = scan_file(log_path)?;
    let log = ConsistencyLog::from_events(&events);
    for note in &log.unstable_notes {
        writeln!(out, "{note}")?;
    }
    if log.is_empty() {
        return Err(AnalysisError::NoData.into());
    }
    let base = output_base(log_path);

    if plots.ratios {
        let boxplot = suffixed(&base, "-boxplot.svg");
        save_sum_ratio(&boxplot, &log, SingleRatioChart::Box)?;
        writeln!(out, "Separate boxplot saved as '{}'", boxplot.display())?;

        let violin = suffixed(&base, "-violin.svg");
        save_sum_ratio(&violin, &log, SingleRatioChart::Violin)?;
        writeln!(out, "Separate violin plot saved as '{}'", violin.display())?;

        let ratios = suffixed(&base, "-ratios.svg");
        save_ratio_grid(&ratios, &log)?;
        writeln!(out, "Ratio plots saved as '{}'", ratios.display())?;
    }

    if plots.distributions {
        let distributions = suffixed(&base, "-distributions.svg");
        save_distributions(&distributions, &log)?;
        writeln!(out, "Distribution plots saved as '{}'", distributions.display())?;

        if plots.print_counts {
            writeln!(out, "\nList Length Counts (Combined):")?;
            for (length, count) in &log.distribution().lengths {
                writeln!(out, "Length {length}: {count} entries")?;
            }
        }
    }

    let summary = log.summary()?;
    writeln!(out, "Number of unfixable inputs: {}", summary.unfixed)?;
    writeln!(out, "Max number of replay to stable: {}", summary.max_replay)?;
    Ok(())
}

pub fn observers(log_path: &Path, out: &mut dyn Write) -> Result<()> {
    let agreement = ObserverAgreement::from_events(&scan_file(log_path)?);
    if agreement.is_empty() {
        writeln!(out, "No matching data found in the file")?;
        return Ok(());
    }
    let base = output_base(log_path);

    let pie = suffixed(&base, "-observer-ratios.svg");
    save_pie(&pie, &agreement)?;
    writeln!(out, "Pie chart saved to {}", pie.display())?;

    let bars = suffixed(&base, "-observer-ratios-by-len.svg");
    save_stacked_bars(&bars, &agreement)?;
    writeln!(out, "Stacked bar chart saved to {}", bars.display())?;
    Ok(())
}

pub fn monitor(log_path: &Path, out: &mut dyn Write) -> Result<()> {
    let monitor = MonitorLog::from_events(&scan_file(log_path)?);
    for line in &monitor.unparsed {
        log::warn!("Unparsed status line: {line}");
    }
    if monitor.is_empty() {
        bail!("No GLOBAL status lines in {}", log_path.display());
    }
    let base = output_base(log_path);
    let path = suffixed(&base, ".svg");
    save_panel_grid(&path, &title_of(&base), &monitor.panels(), TimeUnit::Hours)?;
    writeln!(out, "Plot saved as {}", path.display())?;
    Ok(())
}

pub fn metrics(files: &[PathBuf], include_recent: bool, out: &mut dyn Write) -> Result<()> {
    let Some(first) = files.first() else {
        bail!("No input files");
    };
    let runs = files
        .iter()
        .map(|path| MetricRun::load(path))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let panels = metric_panels(&runs, include_recent)?;

    let base = output_base(first);
    let path = suffixed(&base, ".svg");
    save_panel_grid(&path, &run_label(first), &panels, TimeUnit::Seconds)?;
    writeln!(out, "Plot saved as {}", path.display())?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct CompareOptions<'a> {
    pub x_axis: XAxis,
    pub key: &'a str,
    pub limit_range: bool,
    pub config: Option<&'a Path>,
    pub output_dir: Option<&'a Path>,
}

pub fn compare(files: &[PathBuf], options: CompareOptions<'_>, out: &mut dyn Write) -> Result<()> {
    if let Some(missing) = files.iter().find(|path| !path.exists()) {
        bail!("{} does not exist", missing.display());
    }
    let profiles = ProfileSet::load(options.config);
    let profile = profiles.get(options.key)?;
    let runs = files
        .iter()
        .map(|path| CompareRun::load(path))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let chart = compare_chart(
        &runs,
        options.x_axis,
        options.key,
        profile,
        options.limit_range,
    )?;

    let dir = options.output_dir.unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(output_name(options.key));
    save_compare_chart(&path, &chart)?;
    writeln!(out, "Plot saved as {}", path.display())?;
    Ok(())
}

pub fn system_load(path: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?,
    };
    let report = LoadReport::from_events(&LogScanner::new().parse(&text));
    if report.is_empty() {
        log::warn!("No top snapshots found");
    }
    write!(out, "{}", report.render())?;
    Ok(())
}

pub fn stability(
    executable: &Path,
    sanitizer_cov: &Path,
    unstable: &Path,
    symbolizer: &dyn Symbolizer,
    out: &mut dyn Write,
) -> Result<()> {
    check_executable(executable)?;
    let report = StabilityReport::load(sanitizer_cov, unstable)?;
    write!(out, "{}", report.render_not_found())?;
    if report.found.is_empty() {
        writeln!(out, "No matching addresses found")?;
        return Ok(());
    }
    writeln!(out, "\nFound {} matching addresses", report.found.unique())?;

    let hits = report.resolve(executable, symbolizer)?;
    writeln!(out, "\nAddress resolution results:")?;
    for hit in &hits {
        writeln!(out, "{}", hit.render())?;
    }
    Ok(())
}

pub fn extract_pcap(input: &Path, output: &Path, jobs: usize, out: &mut dyn Write) -> Result<()> {
    let report = fuzzlens_artifacts::extract_flat_pcaps(input, output, jobs)?;
    writeln!(
        out,
        "Extracted {} of {} PCAP files to {}",
        report.written,
        report.total,
        output.display()
    )?;
    Ok(())
}

pub fn dedup(input: &Path, output: &Path, options: &DedupOptions, out: &mut dyn Write) -> Result<()> {
    let report = fuzzlens_artifacts::dedup(input, output, options)?;
    writeln!(
        out,
        "Found {} unique files out of {} total",
        report.unique, report.total
    )?;
    if options.pcap_only {
        writeln!(
            out,
            "Extracted {} unique PCAP files to {}",
            report.unique,
            output.display()
        )?;
    } else {
        writeln!(
            out,
            "Processed {} unique files to {}",
            report.unique,
            output.display()
        )?;
    }
    if report.failures > 0 {
        log::warn!("{} files could not be exported", report.failures);
    }
    Ok(())
}

pub fn parse(path: &Path, out: &mut dyn Write) -> Result<()> {
    let events = scan_file(path)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&events)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzlens_artifacts::stability::Symbol;
    use std::fs;

    fn run(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_output_base() {
        assert_eq!(output_base(Path::new("logs/run.2.log")), PathBuf::from("logs/run.2"));
        assert_eq!(output_base(Path::new("logs/run")), PathBuf::from("logs/run"));
        assert_eq!(
            suffixed(Path::new("logs/run"), "-ratios.svg"),
            PathBuf::from("logs/run-ratios.svg")
        );
    }

    #[test]
    fn test_consistency_writes_every_figure() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("calibration.log");
        fs::write(
            &log,
            "\
consistency_ratios for input of len 3: 10, 2
consistency_ratios for input of len 3: 9, 3, 1
consistency_ratios for input of len 4: 12, 1
Input inconsistent
5 tries, still unstable
",
        )
        .unwrap();

        let plots = ConsistencyPlots {
            ratios: true,
            distributions: true,
            print_counts: true,
        };
        let output = run(|out| consistency(&log, plots, out));
        assert!(output.starts_with("5 tries, still unstable\n"));
        assert!(output.contains("Separate boxplot saved as"));
        assert!(output.contains("\nList Length Counts (Combined):\nLength 2: 2 entries\nLength 3: 1 entries\n"));
        assert!(output.ends_with("Number of unfixable inputs: 1\nMax number of replay to stable: 12\n"));
        for suffix in ["-ratios.svg", "-boxplot.svg", "-violin.svg", "-distributions.svg"] {
            assert!(dir.path().join(format!("calibration{suffix}")).exists(), "{suffix}");
        }
    }

    #[test]
    fn test_consistency_without_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("empty.log");
        fs::write(&log, "nothing here\n").unwrap();
        let plots = ConsistencyPlots {
            ratios: true,
            distributions: false,
            print_counts: false,
        };
        let err = consistency(&log, plots, &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "No matching log entries found!");
    }

    #[test]
    fn test_observers_without_data() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("observers.log");
        fs::write(&log, "unrelated\n").unwrap();
        let output = run(|out| observers(&log, out));
        assert_eq!(output, "No matching data found in the file\n");
    }

    #[test]
    fn test_compare_writes_named_plot() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("baseline.json");
        let b = dir.path().join("patched.json");
        fs::write(
            &a,
            "{\"run_time\": 0, \"coverage-observer\": 0.01}\n{\"run_time\": 60, \"coverage-observer\": 0.02}\n",
        )
        .unwrap();
        fs::write(&b, "{\"run_time\": 0, \"coverage-observer\": 0.015}\n").unwrap();

        let output_dir = dir.path().join("plots");
        let config = dir.path().join("no-such-config.json");
        let options = CompareOptions {
            x_axis: XAxis::RunTime,
            key: "coverage-observer",
            limit_range: false,
            config: Some(&config),
            output_dir: Some(&output_dir),
        };
        let output = run(|out| compare(&[a.clone(), b.clone()], options, out));
        assert!(output.starts_with("Plot saved as "));
        assert!(output_dir.join("coverage-observer-plot.svg").exists());
    }

    #[test]
    fn test_compare_missing_file() {
        let options = CompareOptions {
            x_axis: XAxis::Executions,
            key: "coverage-observer",
            limit_range: true,
            config: None,
            output_dir: None,
        };
        let err = compare(&[PathBuf::from("/nonexistent/run.json")], options, &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "/nonexistent/run.json does not exist");
    }

    #[derive(Debug)]
    struct NoSymbols;

    impl Symbolizer for NoSymbols {
        fn symbolize(&self, _exe: &Path, addrs: &[&str]) -> fuzzlens_artifacts::Result<Vec<Symbol>> {
            Ok(addrs
                .iter()
                .map(|_| Symbol {
                    function: "??".into(),
                    location: "??:0".into(),
                })
                .collect())
        }
    }

    #[test]
    fn test_stability_report() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("zephyr.exe");
        let sancov = dir.path().join("sancov.txt");
        let unstable = dir.path().join("unstable.txt");
        fs::write(&exe, "").unwrap();
        fs::write(&sancov, "1: 0x10\n").unwrap();
        fs::write(&unstable, "1\n1\n2\n").unwrap();

        let output = run(|out| stability(&exe, &sancov, &unstable, &NoSymbols, out));
        assert!(output.contains("Found hits: 2\nNot found hits: 1\n"));
        assert!(output.contains("\nFound 1 matching addresses\n"));
        assert!(output.ends_with("\nAddress resolution results:\n    2 hits - 0x10: ?? at ??:0\n"));

        fs::write(&unstable, "7\n").unwrap();
        let output = run(|out| stability(&exe, &sancov, &unstable, &NoSymbols, out));
        assert!(output.ends_with("No matching addresses found\n"));
    }

    #[test]
    fn test_dedup_summary() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("corpus");
        fs::create_dir_all(&input).unwrap();
        for (stem, hash) in [("a", 1), ("b", 1), ("c", 2)] {
            fs::write(
                input.join(format!("{stem}.metadata")),
                format!(r#"{{"metadata": {{"map": {{"1": [1, {{"hash": {hash}, "pcap": "AQID"}}]}}}}}}"#),
            )
            .unwrap();
        }
        let output = dir.path().join("out");
        let options = DedupOptions {
            pcap_only: true,
            ..DedupOptions::default()
        };
        let report = run(|out| dedup(&input, &output, &options, out));
        assert_eq!(
            report,
            format!(
                "Found 2 unique files out of 3 total\nExtracted 2 unique PCAP files to {}\n",
                output.display()
            )
        );
    }

    #[test]
    fn test_system_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let top = dir.path().join("top.txt");
        fs::write(
            &top,
            "top - 10:00:01 up 3 days,  1 user,  load average: 1.00, 2.00, 3.00\n",
        )
        .unwrap();
        let output = run(|out| system_load(Some(&top), out));
        assert!(output.starts_with("top - load average: 1.00, 2.00, 3.00\n"));
        assert!(output.contains("Tasks: no samples"));
    }
}
