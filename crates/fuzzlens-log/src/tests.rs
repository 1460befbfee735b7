use crate::ir::{EventPayload, LogEvent, Span, TopSection};
use crate::{LogScanner, ScanError, scan_file};
use expect_test::expect;

#[test]
fn test_parse_empty_log() {
    let scanner = LogScanner::new();
    assert!(scanner.parse("").is_empty());
}

#[test]
fn test_scanner_default() {
    let scanner = LogScanner::default();
    assert!(scanner.parse("nothing to see here\n").is_empty());
}

#[test]
fn test_parse_consistency_ratios() {
    let log = "2024-01-01T00:00:00 [calibration] consistency_ratios for input of len 42: 100, 97, 3\n";
    let events = LogScanner::new().parse(log);
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].payload,
        EventPayload::ConsistencyRatios {
            input_len: 42,
            values: vec![100, 97, 3],
        }
    );
}

#[test]
fn test_parse_single_value_ratio() {
    let events = LogScanner::new().parse("consistency_ratios for input of len 1: 5");
    assert_eq!(
        events[0].payload,
        EventPayload::ConsistencyRatios {
            input_len: 1,
            values: vec![5],
        }
    );
}

#[test]
fn test_parse_inconsistent_and_unstable() {
    let log = "\
[WARN] Input inconsistent, giving up
[WARN] after 10 tries, still unstable: 3 edges
";
    let events = LogScanner::new().parse(log);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].payload, EventPayload::InputInconsistent);
    if let EventPayload::StillUnstable { message } = &events[1].payload {
        assert_eq!(message, "[WARN] after 10 tries, still unstable: 3 edges");
    } else {
        panic!("Expected StillUnstable");
    }
}

#[test]
fn test_parse_observer_stats() {
    let log = "Observer correctness stats for input of len 8: both wrong: 1, first wrong/second right: 2, first right/second wrong: 3, both right: 4";
    let events = LogScanner::new().parse(log);
    let EventPayload::ObserverStats(counts) = &events[0].payload else {
        panic!("Expected ObserverStats");
    };
    assert_eq!(counts.input_len, 8);
    assert_eq!(counts.counts(), [1, 2, 3, 4]);
    assert_eq!(counts.total(), 10);
    assert_eq!(counts.ratios(), Some([0.1, 0.2, 0.3, 0.4]));
}

#[test]
fn test_observer_totals_saturate() {
    let log = "Observer correctness stats for input of len 1: both wrong: 18446744073709551615, first wrong/second right: 0, first right/second wrong: 0, both right: 18446744073709551615";
    let events = LogScanner::new().parse(log);
    let EventPayload::ObserverStats(counts) = &events[0].payload else {
        panic!("Expected ObserverStats");
    };
    assert_eq!(counts.total(), u64::MAX);
    assert_eq!(counts.ratios(), Some([0.5, 0.0, 0.0, 0.5]));
}

#[test]
fn test_parse_monitor_line() {
    let log = "[Stats #0] (GLOBAL) run time: 1h-2m-3s, clients: 4, corpus: 120, objectives: 2, executions: 98765, exec/sec: 1.5k, coverage_observer: 12.345%, state-observer: 0.5%";
    let events = LogScanner::new().parse(log);
    let EventPayload::MonitorStatus(sample) = &events[0].payload else {
        panic!("Expected MonitorStatus");
    };
    assert_eq!(sample.run_time, 3723);
    assert_eq!(sample.clients, 4);
    assert_eq!(sample.corpus, 120);
    assert_eq!(sample.objectives, 2);
    assert_eq!(sample.executions, 98765);
    assert_eq!(sample.exec_per_sec, 1500.0);
    assert_eq!(sample.coverage, 12.345);
    assert_eq!(sample.state, 0.5);
}

#[test]
fn test_parse_monitor_line_without_fields() {
    let events = LogScanner::new().parse("[Stats] GLOBAL run time: 0h-0m-1s, clients: 1\n");
    assert!(matches!(
        events[0].payload,
        EventPayload::MonitorUnparsed { .. }
    ));
}

#[test]
fn test_parse_top_batch() {
    let log = "\
top - 10:00:00 up 1 day,  2 users,  load average: 1.50, 2.25, 3.00
Tasks: 300 total,   2 running, 298 sleeping,   0 stopped,   0 zombie
%Cpu(s): 10.0 us,  2.0 sy,  0.0 ni, 88.0 id,  0.0 wa,  0.0 hi,  0.0 si,  0.0 st
MiB Mem :  64000.0 total,  32000.0 free,  16000.0 used,  16000.0 buff/cache
MiB Swap:   2048.0 total,   2048.0 free,      0.0 used.  47000.0 avail Mem
";
    let events = LogScanner::new().parse(log);
    let sections: Vec<TopSection> = events
        .iter()
        .map(|e| match &e.payload {
            EventPayload::TopSnapshot { section, values } => {
                assert_eq!(values.len(), section.arity());
                *section
            }
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(sections, TopSection::ALL.to_vec());
}

#[test]
fn test_line_numbers_and_spans() {
    let log = "a\nInput inconsistent\nb\n";
    let events = LogScanner::new().parse(log);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].line, 2);
    assert_eq!(&log[events[0].span.start..events[0].span.end], "Input inconsistent");
}

#[test]
fn test_event_json_shape() {
    let events = LogScanner::new().parse("Input inconsistent\n");
    let json = serde_json::to_value(&events[0]).unwrap();
    assert_eq!(json["kind"], "InputInconsistent");
    assert_eq!(json["line"], 1);
    assert_eq!(json["span"]["start"], 0);
}

const CRLF_LOG: &str = "boot\r\nInput inconsistent\r\nconsistency_ratios for input of len 4: 8, 6\r\nafter 3 tries, still unstable\r\n";

fn summarize(events: &[LogEvent]) -> String {
    events
        .iter()
        .map(|e| format!("{} {}..{} {:?}\n", e.line, e.span.start, e.span.end, e.payload))
        .collect()
}

#[test]
fn test_crlf_split_between_cr_and_lf() {
    let mut scanner = LogScanner::new();
    let mut events = Vec::new();
    for chunk in [
        "boot\r",
        "\nInput incons",
        "istent\r",
        "\nconsistency_ratios for input of len 4: 8",
        ", 6\r",
        "\nafter 3 tries, still unstable\r\n",
    ] {
        events.extend(scanner.update(chunk));
    }
    events.extend(scanner.finish());

    expect![[r#"
        2 6..24 InputInconsistent
        3 26..69 ConsistencyRatios { input_len: 4, values: [8, 6] }
        4 71..100 StillUnstable { message: "after 3 tries, still unstable" }
    "#]]
    .assert_eq(&summarize(&events));
    assert_eq!(events, LogScanner::new().parse(CRLF_LOG));
}

#[test]
fn test_crlf_byte_by_byte() {
    let mut scanner = LogScanner::new();
    let mut events = Vec::new();
    for byte in CRLF_LOG.as_bytes().chunks(1) {
        events.extend(scanner.update(std::str::from_utf8(byte).unwrap()));
    }
    assert_eq!(scanner.offset(), CRLF_LOG.len());
    events.extend(scanner.finish());

    assert_eq!(events.len(), 3);
    for event in &events {
        let text = &CRLF_LOG[event.span.start..event.span.end];
        assert!(!text.ends_with('\r'), "span of line {} keeps the CR", event.line);
    }
    assert_eq!(
        &CRLF_LOG[events[1].span.start..events[1].span.end],
        "consistency_ratios for input of len 4: 8, 6"
    );
}

#[test]
fn test_finish_strips_trailing_cr() {
    let mut scanner = LogScanner::new();
    assert!(scanner.update("Input inconsistent\r").is_empty());
    let events = scanner.finish();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].span, Span::new(0, 18));
}

#[test]
fn test_scan_file_is_lossy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fuzzer.log");
    let mut bytes = b"\xff\xfe garbage\r\n".to_vec();
    bytes.extend_from_slice(b"Input inconsistent\r\n");
    std::fs::write(&path, bytes).unwrap();

    let events = scan_file(&path).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].line, 2);
    assert_eq!(events[0].payload, EventPayload::InputInconsistent);
}

#[test]
fn test_scan_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = scan_file(&dir.path().join("absent.log")).unwrap_err();
    assert!(matches!(err, ScanError::Io { .. }));
}
