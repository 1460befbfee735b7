//! Corpus deduplication.
//!
//! Every `.metadata` file under the input tree gets a fingerprint. The first
//! file of each fingerprint is kept, its pcap is decoded into the output tree
//! and, unless only pcaps are wanted, its sibling files are copied along.

use crate::error::{ArtifactError, Result};
use crate::metadata::TestcaseMetadata;
use crate::pool::parallel_map;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What makes two corpus entries duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupKey {
    /// The packet hash recorded by the fuzzer.
    #[default]
    Hash,
    /// The sequence of packet descriptions, timestamps ignored.
    Packets,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    Hash(u64),
    Packets(String),
}

#[derive(Debug, Clone, Default)]
pub struct DedupOptions {
    pub key: DedupKey,
    /// Remove an existing output directory instead of refusing.
    pub force: bool,
    pub pcap_only: bool,
    /// Keep original file names instead of numbering unique entries.
    pub no_rename: bool,
    /// Worker count, `0` for the machine default.
    pub jobs: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupReport {
    pub total: usize,
    pub unique: usize,
    pub pcaps_written: usize,
    pub files_copied: usize,
    pub failures: usize,
}

/// All `*.metadata` files below `root`, sorted by path.
pub fn find_metadata_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("Skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().is_some_and(|ext| ext == "metadata"))
        .collect();
    files.sort();
    files
}

pub fn fingerprint(path: &Path, key: DedupKey) -> Result<Option<Fingerprint>> {
    let meta = TestcaseMetadata::read(path)?;
    Ok(match key {
        DedupKey::Hash => meta.hash().map(Fingerprint::Hash),
        DedupKey::Packets => meta.packets_digest().map(Fingerprint::Packets),
    })
}

/// The first file of each fingerprint, in input order.
///
/// Files that cannot be read or carry no fingerprint are dropped.
pub fn select_unique(files: &[PathBuf], key: DedupKey, jobs: usize) -> Vec<PathBuf> {
    let prints = parallel_map(files, jobs, |path| fingerprint(path, key));
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for (path, print) in files.iter().zip(prints) {
        match print {
            Ok(Some(print)) => {
                if seen.insert(print) {
                    unique.push(path.clone());
                }
            }
            Ok(None) => log::warn!("No {key:?} fingerprint in {}", path.display()),
            Err(err) => log::warn!("Error processing {}: {err}", path.display()),
        }
    }
    unique
}

/// Checks the input and (re)creates an empty output directory.
pub fn prepare_output(input: &Path, output: &Path, force: bool) -> Result<()> {
    if !input.is_dir() {
        return Err(ArtifactError::InputMissing(input.to_path_buf()));
    }
    if output.is_dir() {
        if !force {
            return Err(ArtifactError::OutputExists(output.to_path_buf()));
        }
        log::info!("Removing existing output directory {}", output.display());
        fs::remove_dir_all(output).map_err(ArtifactError::io(output))?;
    }
    fs::create_dir_all(output).map_err(ArtifactError::io(output))
}

#[derive(Debug, Default)]
struct Exported {
    pcap: bool,
    copied: usize,
}

/// Where the unique entry `metadata` lands below `output`.
fn target_dir(input: &Path, output: &Path, metadata: &Path) -> PathBuf {
    let parent = metadata.parent().unwrap_or(input);
    match parent.strip_prefix(input) {
        Ok(rel) => output.join(rel),
        Err(_) => output.to_path_buf(),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn export_pcap(metadata: &Path, dir: &Path, name: &str) -> Result<bool> {
    let Some(pcap) = TestcaseMetadata::read(metadata)?.pcap()? else {
        log::debug!("No pcap in {}", metadata.display());
        return Ok(false);
    };
    fs::create_dir_all(dir).map_err(ArtifactError::io(dir))?;
    let target = dir.join(format!("{name}.pcap"));
    fs::write(&target, pcap).map_err(ArtifactError::io(&target))?;
    Ok(true)
}

/// Copies every `<stem>.*` file next to `metadata` into `dir`.
fn copy_siblings(metadata: &Path, dir: &Path, index: usize, no_rename: bool) -> Result<usize> {
    let parent = metadata.parent().unwrap_or(Path::new("."));
    let pattern = format!(
        "{}/{}.*",
        glob::Pattern::escape(&parent.to_string_lossy()),
        glob::Pattern::escape(&file_stem(metadata))
    );
    fs::create_dir_all(dir).map_err(ArtifactError::io(dir))?;

    let mut copied = 0;
    for source in glob::glob(&pattern)? {
        let source = match source {
            Ok(source) => source,
            Err(err) => {
                log::warn!("Skipping {}: {}", err.path().display(), err.error());
                continue;
            }
        };
        if !source.is_file() {
            continue;
        }
        let name = if no_rename {
            source.file_name().map(PathBuf::from).unwrap_or_default()
        } else {
            let suffix = source
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            PathBuf::from(format!("{index}{suffix}"))
        };
        let target = dir.join(name);
        fs::copy(&source, &target).map_err(ArtifactError::io(&source))?;
        copied += 1;
    }
    Ok(copied)
}

fn export(
    input: &Path,
    output: &Path,
    index: usize,
    metadata: &Path,
    options: &DedupOptions,
) -> Result<Exported> {
    let dir = target_dir(input, output, metadata);
    let name = if options.no_rename {
        file_stem(metadata)
    } else {
        index.to_string()
    };
    let pcap = export_pcap(metadata, &dir, &name)?;
    let copied = if options.pcap_only {
        0
    } else {
        copy_siblings(metadata, &dir, index, options.no_rename)?
    };
    Ok(Exported { pcap, copied })
}

/// Deduplicates the corpus under `input` into `output`.
pub fn dedup(input: &Path, output: &Path, options: &DedupOptions) -> Result<DedupReport> {
    prepare_output(input, output, options.force)?;
    let files = find_metadata_files(input);
    log::info!("Fingerprinting {} metadata files", files.len());
    let unique = select_unique(&files, options.key, options.jobs);

    let indexed: Vec<(usize, &PathBuf)> = unique.iter().enumerate().collect();
    let results = parallel_map(&indexed, options.jobs, |&(index, metadata)| {
        export(input, output, index, metadata, options)
    });

    let mut report = DedupReport {
        total: files.len(),
        unique: unique.len(),
        ..DedupReport::default()
    };
    for ((_, metadata), result) in indexed.iter().zip(results) {
        match result {
            Ok(exported) => {
                report.pcaps_written += usize::from(exported.pcap);
                report.files_copied += exported.copied;
            }
            Err(err) => {
                log::error!("Error processing {}: {err}", metadata.display());
                report.failures += 1;
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_dir_keeps_relative_parent() {
        let input = Path::new("/corpus");
        let output = Path::new("/out");
        assert_eq!(
            target_dir(input, output, Path::new("/corpus/a/b/x.metadata")),
            PathBuf::from("/out/a/b")
        );
        assert_eq!(
            target_dir(input, output, Path::new("/corpus/x.metadata")),
            PathBuf::from("/out")
        );
        assert_eq!(
            target_dir(input, output, Path::new("/elsewhere/x.metadata")),
            PathBuf::from("/out")
        );
    }

    #[test]
    fn test_prepare_output_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");

        assert!(matches!(
            prepare_output(&input, &output, false),
            Err(ArtifactError::InputMissing(_))
        ));

        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("stale"), "x").unwrap();
        assert!(matches!(
            prepare_output(&input, &output, false),
            Err(ArtifactError::OutputExists(_))
        ));

        prepare_output(&input, &output, true).unwrap();
        assert!(output.is_dir());
        assert!(!output.join("stale").exists());
    }
}
