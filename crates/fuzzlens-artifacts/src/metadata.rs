//! Testcase metadata files written next to corpus entries.
//!
//! A corpus metadata file keeps its interesting fields under `metadata.map`,
//! where each entry is an array whose second element is a field object:
//!
//! ```json
//! {"metadata": {"map": {"17": [17, {"hash": 42, "pcap": "1MOyoQ==", "packets": []}]}}}
//! ```
//!
//! Packet capture exports use a flat layout instead: `{"pcap": "<base64>"}`.

use crate::error::{ArtifactError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct TestcaseMetadata {
    path: PathBuf,
    map: Map<String, Value>,
}

impl TestcaseMetadata {
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(ArtifactError::io(path))?;
        Self::parse(path, &text)
    }

    /// `path` is only used in error messages.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let map = value
            .get("metadata")
            .and_then(|m| m.get("map"))
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| ArtifactError::MissingField {
                path: path.to_path_buf(),
                field: "metadata.map",
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            map,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Field objects of every `[_, {...}, ..]` entry, in file order.
    fn field_objects(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.map
            .values()
            .filter_map(Value::as_array)
            .filter(|entry| entry.len() > 1)
            .filter_map(|entry| entry[1].as_object())
    }

    /// The first non-empty value of `field`.
    fn first(&self, field: &str) -> Option<&Value> {
        self.field_objects()
            .filter_map(|fields| fields.get(field))
            .find(|value| is_set(value))
    }

    pub fn pcap_base64(&self) -> Option<&str> {
        self.first("pcap").and_then(Value::as_str)
    }

    /// Decoded capture of the first entry that has one.
    pub fn pcap(&self) -> Result<Option<Vec<u8>>> {
        self.pcap_base64()
            .map(|encoded| decode_pcap(&self.path, encoded))
            .transpose()
    }

    /// Packet hash recorded by the fuzzer, as an integer or numeric string.
    ///
    /// A zero hash is treated as missing.
    pub fn hash(&self) -> Option<u64> {
        let hash = match self.first("hash")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        hash.filter(|&h| h != 0)
    }

    /// SHA-256 over the packet descriptions, ignoring capture timestamps.
    pub fn packets_digest(&self) -> Option<String> {
        let packets = self.first("packets")?.as_array()?;
        let mut hasher = Sha256::new();
        for packet in packets {
            let description = match packet.as_array() {
                Some(pair) if pair.len() > 1 => &pair[1],
                _ => packet,
            };
            hasher.update(description.to_string().as_bytes());
            hasher.update(b"\n");
        }
        Some(hex::encode(hasher.finalize()))
    }
}

/// Truthiness of a metadata value: empty strings, lists and zero count as unset.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

pub fn decode_pcap(path: &Path, encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|source| ArtifactError::Base64 {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads the top-level `pcap` of a flat export.
pub fn read_flat_pcap(path: &Path) -> Result<Vec<u8>> {
    let text = std::fs::read_to_string(path).map_err(ArtifactError::io(path))?;
    let value: Value = serde_json::from_str(&text).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let encoded = value
        .get("pcap")
        .and_then(Value::as_str)
        .ok_or_else(|| ArtifactError::MissingField {
            path: path.to_path_buf(),
            field: "pcap",
        })?;
    decode_pcap(path, encoded)
}
