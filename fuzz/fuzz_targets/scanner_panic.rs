#![no_main]
use fuzzlens_log::LogScanner;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    let _ = LogScanner::new().parse(&text);

    // Chunked input takes the buffering path.
    let split = text
        .char_indices()
        .map(|(i, _)| i)
        .nth(text.chars().count() / 2)
        .unwrap_or(0);
    let mut scanner = LogScanner::new();
    let _ = scanner.update(&text[..split]);
    let _ = scanner.update(&text[split..]);
    let _ = scanner.finish();
});
