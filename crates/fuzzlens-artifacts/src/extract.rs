//! Flat pcap export: `<input>/*.metadata` with a top-level `pcap` field.

use crate::error::{ArtifactError, Result};
use crate::metadata::read_flat_pcap;
use crate::pool::parallel_map;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub total: usize,
    pub written: usize,
    pub failed: usize,
}

/// Metadata files directly inside `dir`, sorted.
pub fn flat_metadata_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.metadata", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(err) => log::warn!("Skipping {}: {}", err.path().display(), err.error()),
        }
    }
    files.sort();
    Ok(files)
}

fn extract_one(metadata: &Path, output: &Path) -> Result<PathBuf> {
    let pcap = read_flat_pcap(metadata)?;
    let stem = metadata.file_stem().unwrap_or(metadata.as_os_str());
    let target = output.join(format!("{}.pcap", stem.to_string_lossy()));
    fs::write(&target, pcap).map_err(ArtifactError::io(&target))?;
    Ok(target)
}

/// Writes `<output>/<stem>.pcap` for every metadata file in `input`.
pub fn extract_flat_pcaps(input: &Path, output: &Path, jobs: usize) -> Result<ExtractReport> {
    fs::create_dir_all(output).map_err(ArtifactError::io(output))?;
    let files = flat_metadata_files(input)?;
    log::info!("Extracting {} pcaps from {}", files.len(), input.display());

    let results = parallel_map(&files, jobs, |metadata| extract_one(metadata, output));
    let mut report = ExtractReport {
        total: files.len(),
        ..ExtractReport::default()
    };
    for (metadata, result) in files.iter().zip(results) {
        match result {
            Ok(target) => {
                log::debug!("{} -> {}", metadata.display(), target.display());
                report.written += 1;
            }
            Err(err) => {
                log::error!("Error processing {}: {err}", metadata.display());
                report.failed += 1;
            }
        }
    }
    Ok(report)
}
