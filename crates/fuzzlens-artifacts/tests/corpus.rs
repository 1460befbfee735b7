use expect_test::expect;
use fuzzlens_artifacts::stability::{ResolvedHit, Symbol};
use fuzzlens_artifacts::{
    dedup, extract_flat_pcaps, ArtifactError, DedupKey, DedupOptions, StabilityReport, Symbolizer,
};
use std::fs;
use std::path::Path;

/// `AQID` decodes to `[1, 2, 3]`, `BAUG` to `[4, 5, 6]`.
fn corpus_entry(dir: &Path, stem: &str, hash: u64, pcap: &str, packets: &str) {
    fs::create_dir_all(dir).unwrap();
    let metadata = format!(
        r#"{{"metadata": {{"map": {{"9": [9, {{"hash": {hash}, "pcap": "{pcap}", "packets": {packets}}}]}}}}}}"#
    );
    fs::write(dir.join(format!("{stem}.metadata")), metadata).unwrap();
    fs::write(dir.join(format!("{stem}.lafl_lock")), "").unwrap();
}

fn sorted_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn dedup_by_hash_numbers_unique_entries() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("corpus");
    let output = tmp.path().join("unique");
    let queue = input.join("queue");
    corpus_entry(&queue, "a", 7, "AQID", "[]");
    corpus_entry(&queue, "b", 7, "BAUG", "[]");
    corpus_entry(&queue, "c", 8, "BAUG", "[]");
    fs::write(queue.join("d.metadata"), r#"{"metadata": {"map": {}}}"#).unwrap();

    let report = dedup(&input, &output, &DedupOptions::default()).unwrap();
    assert_eq!(report.total, 4);
    assert_eq!(report.unique, 2);
    assert_eq!(report.pcaps_written, 2);
    assert_eq!(report.failures, 0);

    let out_queue = output.join("queue");
    assert_eq!(fs::read(out_queue.join("0.pcap")).unwrap(), vec![1, 2, 3]);
    assert_eq!(fs::read(out_queue.join("1.pcap")).unwrap(), vec![4, 5, 6]);
    assert_eq!(
        sorted_names(&out_queue),
        vec!["0.lafl_lock", "0.metadata", "0.pcap", "1.lafl_lock", "1.metadata", "1.pcap"]
    );

    let again = dedup(&input, &output, &DedupOptions::default());
    assert!(matches!(again, Err(ArtifactError::OutputExists(_))));
}

#[test]
fn dedup_by_packets_keeps_names() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("corpus");
    let output = tmp.path().join("unique");
    corpus_entry(&input, "first", 1, "AQID", r#"[[{"secs": 0, "nanos": 1}, "Eth(Arp)"]]"#);
    corpus_entry(&input, "second", 2, "BAUG", r#"[[{"secs": 5, "nanos": 0}, "Eth(Arp)"]]"#);
    corpus_entry(&input, "third", 3, "BAUG", r#"[[{"secs": 0, "nanos": 0}, "Eth(Ipv6)"]]"#);

    let options = DedupOptions {
        key: DedupKey::Packets,
        pcap_only: true,
        no_rename: true,
        jobs: 2,
        ..DedupOptions::default()
    };
    let report = dedup(&input, &output, &options).unwrap();
    assert_eq!(report.unique, 2);
    assert_eq!(report.files_copied, 0);
    assert_eq!(sorted_names(&output), vec!["first.pcap", "third.pcap"]);
}

#[test]
fn dedup_force_replaces_output() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("corpus");
    let output = tmp.path().join("unique");
    corpus_entry(&input, "a", 1, "AQID", "[]");
    fs::create_dir_all(&output).unwrap();
    fs::write(output.join("old.pcap"), "stale").unwrap();

    let options = DedupOptions {
        force: true,
        pcap_only: true,
        ..DedupOptions::default()
    };
    dedup(&input, &output, &options).unwrap();
    assert_eq!(sorted_names(&output), vec!["0.pcap"]);
}

#[test]
fn dedup_copies_only_own_siblings() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("corpus");
    let output = tmp.path().join("unique");
    corpus_entry(&input, "run", 1, "AQID", "[]");
    corpus_entry(&input, "run2", 1, "BAUG", "[]");

    let report = dedup(&input, &output, &DedupOptions::default()).unwrap();
    assert_eq!(report.unique, 1);
    assert_eq!(report.files_copied, 2);
    assert_eq!(sorted_names(&output), vec!["0.lafl_lock", "0.metadata", "0.pcap"]);
    assert_eq!(
        fs::read(output.join("0.metadata")).unwrap(),
        fs::read(input.join("run.metadata")).unwrap()
    );
}

#[test]
fn extract_keeps_dotted_stems_apart() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("exports");
    let output = tmp.path().join("pcaps");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("run.1.metadata"), r#"{"pcap": "AQID"}"#).unwrap();
    fs::write(input.join("run.2.metadata"), r#"{"pcap": "BAUG"}"#).unwrap();

    let report = extract_flat_pcaps(&input, &output, 1).unwrap();
    assert_eq!(report.written, 2);
    assert_eq!(sorted_names(&output), vec!["run.1.pcap", "run.2.pcap"]);
    assert_eq!(fs::read(output.join("run.1.pcap")).unwrap(), vec![1, 2, 3]);
    assert_eq!(fs::read(output.join("run.2.pcap")).unwrap(), vec![4, 5, 6]);
}

#[test]
fn extract_flat_pcaps_counts_failures() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("exports");
    let output = tmp.path().join("pcaps");
    fs::create_dir_all(input.join("nested")).unwrap();
    fs::write(input.join("one.metadata"), r#"{"pcap": "AQID"}"#).unwrap();
    fs::write(input.join("two.metadata"), r#"{"pcap": "BAUG"}"#).unwrap();
    fs::write(input.join("bad.metadata"), r#"{"other": 1}"#).unwrap();
    fs::write(input.join("nested/three.metadata"), r#"{"pcap": "AQID"}"#).unwrap();

    let report = extract_flat_pcaps(&input, &output, 0).unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(sorted_names(&output), vec!["one.pcap", "two.pcap"]);
    assert_eq!(fs::read(output.join("two.pcap")).unwrap(), vec![4, 5, 6]);
}

#[derive(Debug)]
struct FixedSymbolizer;

impl Symbolizer for FixedSymbolizer {
    fn symbolize(&self, _exe: &Path, addrs: &[&str]) -> fuzzlens_artifacts::Result<Vec<Symbol>> {
        Ok(addrs
            .iter()
            .map(|addr| Symbol {
                function: format!("fn_{}", addr.trim_start_matches("0x")),
                location: "net.c:1".to_string(),
            })
            .collect())
    }
}

#[test]
fn stability_report_and_resolution() {
    let tmp = tempfile::tempdir().unwrap();
    let exe = tmp.path().join("zephyr.exe");
    let sancov = tmp.path().join("sanitizer_cov_unique.txt");
    let unstable = tmp.path().join("unstable-coverage.txt");
    fs::write(&exe, "").unwrap();
    fs::write(&sancov, "10: 0xa0\n11: 0xb0\nnoise\n").unwrap();
    fs::write(&unstable, "10\n11\n\n11\n99\n98\n98\n").unwrap();

    let report = StabilityReport::load(&sancov, &unstable).unwrap();
    let rendered = report
        .render_not_found()
        .replace(&unstable.display().to_string(), "unstable-coverage.txt");
    expect![[r#"

        Not Found Offset Statistics:
        Total hits in unstable-coverage.txt: 6
        Found hits: 3
        Not found hits: 3
        Unique not found offsets: 2

        Not found offset frequencies:
            2 hits - offset 98
            1 hits - offset 99
    "#]]
    .assert_eq(&rendered);

    let hits = report.resolve(&exe, &FixedSymbolizer).unwrap();
    let lines: Vec<String> = hits.iter().map(ResolvedHit::render).collect();
    assert_eq!(
        lines,
        vec![
            "    2 hits - 0xb0: fn_b0 at net.c:1",
            "    1 hits - 0xa0: fn_a0 at net.c:1",
        ]
    );
}
