#![no_main]
use fuzzlens_log::metrics::{flatten_numeric, unwrap_single};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let flat = flatten_numeric(&object);
    for field in &flat.percent {
        assert!(flat.values.contains_key(field));
    }
    let _ = unwrap_single(&object);
});
