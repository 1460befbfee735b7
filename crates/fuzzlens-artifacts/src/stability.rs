//! Unstable coverage symbolization.
//!
//! The fuzzer dumps the offsets of edges whose coverage flickered between
//! runs. `sanitizer_cov` maps those offsets to code addresses, which are then
//! resolved to functions and source locations.

use crate::error::{ArtifactError, Result};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Parses `offset: addr` lines. Lines that do not split into exactly two
/// parts are ignored, later duplicates win.
pub fn parse_offset_map(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.trim().split(": ").collect();
            match parts.as_slice() {
                [offset, addr] => Some((offset.to_string(), addr.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Occurrence counter that remembers first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitCounter {
    order: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl HitCounter {
    pub fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.order[i].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.order.len());
                self.order.push((key.to_string(), 1));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.order.iter().map(|(_, c)| c).sum()
    }

    pub fn unique(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries by count, descending. Ties keep first-seen order.
    pub fn most_common(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> =
            self.order.iter().map(|(k, c)| (k.as_str(), *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilityReport {
    source: PathBuf,
    /// Hits per code address.
    pub found: HitCounter,
    /// Hits per offset missing from the map.
    pub not_found: HitCounter,
}

impl StabilityReport {
    /// Counts the offsets listed in `unstable`, one per line.
    pub fn build(offsets: &HashMap<String, String>, unstable: &str, source: &Path) -> Self {
        let mut found = HitCounter::default();
        let mut not_found = HitCounter::default();
        for offset in unstable.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match offsets.get(offset) {
                Some(addr) => found.add(addr),
                None => not_found.add(offset),
            }
        }
        Self {
            source: source.to_path_buf(),
            found,
            not_found,
        }
    }

    pub fn load(sanitizer_cov: &Path, unstable: &Path) -> Result<Self> {
        let map = std::fs::read_to_string(sanitizer_cov).map_err(ArtifactError::io(sanitizer_cov))?;
        let offsets = parse_offset_map(&map);
        log::debug!("{} offsets in {}", offsets.len(), sanitizer_cov.display());
        let text = std::fs::read_to_string(unstable).map_err(ArtifactError::io(unstable))?;
        Ok(Self::build(&offsets, &text, unstable))
    }

    pub fn render_not_found(&self) -> String {
        let mut out = String::new();
        let found = self.found.total();
        let missing = self.not_found.total();
        let _ = writeln!(out, "\nNot Found Offset Statistics:");
        let _ = writeln!(
            out,
            "Total hits in {}: {}",
            self.source.display(),
            found + missing
        );
        let _ = writeln!(out, "Found hits: {found}");
        let _ = writeln!(out, "Not found hits: {missing}");
        let _ = writeln!(out, "Unique not found offsets: {}", self.not_found.unique());
        let _ = writeln!(out, "\nNot found offset frequencies:");
        for (offset, count) in self.not_found.most_common() {
            let _ = writeln!(out, "{count:5} hits - offset {offset}");
        }
        out
    }

    /// Resolves every found address, most frequent first.
    pub fn resolve(&self, exe: &Path, symbolizer: &dyn Symbolizer) -> Result<Vec<ResolvedHit>> {
        check_executable(exe)?;
        let hits = self.found.most_common();
        let addrs: Vec<&str> = hits.iter().map(|(addr, _)| *addr).collect();
        let symbols = symbolizer.symbolize(exe, &addrs)?;
        if symbols.len() < hits.len() {
            log::warn!(
                "Symbolizer returned {} results for {} addresses",
                symbols.len(),
                hits.len()
            );
        }
        Ok(hits
            .into_iter()
            .zip(symbols)
            .map(|((addr, count), symbol)| ResolvedHit {
                addr: addr.to_string(),
                count,
                symbol,
            })
            .collect())
    }
}

pub fn check_executable(exe: &Path) -> Result<()> {
    if exe.exists() {
        Ok(())
    } else {
        Err(ArtifactError::ExecutableMissing(exe.to_path_buf()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub function: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHit {
    pub addr: String,
    pub count: usize,
    pub symbol: Symbol,
}

impl ResolvedHit {
    pub fn render(&self) -> String {
        format!(
            "{:5} hits - {}: {} at {}",
            self.count, self.addr, self.symbol.function, self.symbol.location
        )
    }
}

/// Resolves code addresses of an executable to symbols.
pub trait Symbolizer: Send + Sync + std::fmt::Debug {
    /// One symbol per address, in the same order.
    fn symbolize(&self, exe: &Path, addrs: &[&str]) -> Result<Vec<Symbol>>;
}

/// Runs binutils `addr2line` with function names and demangling.
#[derive(Debug, Clone)]
pub struct Addr2Line {
    program: PathBuf,
}

impl Default for Addr2Line {
    fn default() -> Self {
        Self {
            program: PathBuf::from("addr2line"),
        }
    }
}

impl Addr2Line {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Symbolizer for Addr2Line {
    fn symbolize(&self, exe: &Path, addrs: &[&str]) -> Result<Vec<Symbol>> {
        let output = Command::new(&self.program)
            .arg("-e")
            .arg(exe)
            .args(["-f", "-C"])
            .args(addrs)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ArtifactError::Symbolizer(e.to_string()))?;
        if !output.status.success() {
            return Err(ArtifactError::Symbolizer(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(parse_addr2line(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// `addr2line -f` prints a function line followed by a location line.
pub fn parse_addr2line(output: &str) -> Vec<Symbol> {
    let lines: Vec<&str> = output.trim().lines().collect();
    lines
        .chunks_exact(2)
        .map(|pair| Symbol {
            function: pair[0].trim_end().to_string(),
            location: pair[1].trim_end().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset_map() {
        let map = parse_offset_map("0x10: 0x401000\nbroken line\n0x20: 0x401010\na: b: c\n");
        assert_eq!(map.len(), 2);
        assert_eq!(map["0x10"], "0x401000");
        assert_eq!(map["0x20"], "0x401010");
    }

    #[test]
    fn test_most_common_is_stable() {
        let mut counter = HitCounter::default();
        for key in ["b", "a", "b", "c", "a", "d"] {
            counter.add(key);
        }
        assert_eq!(counter.total(), 6);
        assert_eq!(counter.unique(), 4);
        assert_eq!(
            counter.most_common(),
            vec![("b", 2), ("a", 2), ("c", 1), ("d", 1)]
        );
    }

    #[test]
    fn test_parse_addr2line_pairs_lines() {
        let symbols = parse_addr2line("net_rx\n/src/net.c:42\nip_input\n/src/ip.c:7\ndangling\n");
        assert_eq!(
            symbols,
            vec![
                Symbol {
                    function: "net_rx".into(),
                    location: "/src/net.c:42".into()
                },
                Symbol {
                    function: "ip_input".into(),
                    location: "/src/ip.c:7".into()
                },
            ]
        );
    }

    #[test]
    fn test_missing_executable() {
        let report = StabilityReport::build(&HashMap::new(), "", Path::new("u.txt"));
        let err = report
            .resolve(Path::new("/nonexistent/zephyr.exe"), &Addr2Line::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "/nonexistent/zephyr.exe not found");
    }

    #[test]
    fn test_render_hit() {
        let hit = ResolvedHit {
            addr: "0x401000".into(),
            count: 12,
            symbol: Symbol {
                function: "net_rx".into(),
                location: "net.c:42".into(),
            },
        };
        assert_eq!(hit.render(), "   12 hits - 0x401000: net_rx at net.c:42");
    }
}
