//! Averages over a batch of `top` snapshots.

use fuzzlens_log::ir::{EventPayload, LogEvent, TopSection};
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    sums: BTreeMap<TopSection, (Vec<f64>, usize)>,
}

impl LoadReport {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a LogEvent>) -> Self {
        let mut report = Self::default();
        for event in events {
            if let EventPayload::TopSnapshot { section, values } = &event.payload {
                report.add(*section, values);
            }
        }
        report
    }

    fn add(&mut self, section: TopSection, values: &[f64]) {
        if values.len() != section.arity() {
            log::warn!(
                "Skipping {} line with {} columns",
                section.label(),
                values.len()
            );
            return;
        }
        let (sum, n) = self
            .sums
            .entry(section)
            .or_insert_with(|| (vec![0.0; section.arity()], 0));
        for (acc, v) in sum.iter_mut().zip(values) {
            *acc += v;
        }
        *n += 1;
    }

    pub fn samples(&self, section: TopSection) -> usize {
        self.sums.get(&section).map_or(0, |(_, n)| *n)
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Column means for `section`, or `None` without samples.
    pub fn averages(&self, section: TopSection) -> Option<Vec<f64>> {
        let (sum, n) = self.sums.get(&section)?;
        Some(sum.iter().map(|s| s / *n as f64).collect())
    }

    /// A `top`-like header with averaged values.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in TopSection::ALL {
            let Some(a) = self.averages(section) else {
                let _ = writeln!(out, "{}: no samples", section.label());
                continue;
            };
            let _ = match section {
                TopSection::LoadAverage => writeln!(
                    out,
                    "top - load average: {:.2}, {:.2}, {:.2}",
                    a[0], a[1], a[2]
                ),
                TopSection::Tasks => writeln!(
                    out,
                    "Tasks: {:.0} total, {:.0} running, {:.0} sleeping, {:.0} stopped, {:.0} zombie",
                    a[0], a[1], a[2], a[3], a[4]
                ),
                TopSection::Cpu => writeln!(
                    out,
                    "%Cpu(s): {:.1} us, {:.1} sy, {:.1} ni, {:.1} id, {:.1} wa, {:.1} hi, {:.1} si, {:.1} st",
                    a[0], a[1], a[2], a[3], a[4], a[5], a[6], a[7]
                ),
                TopSection::Memory => writeln!(
                    out,
                    "MiB Mem : {:.1} total, {:.1} free, {:.1} used, {:.1} buff/cache",
                    a[0], a[1], a[2], a[3]
                ),
                TopSection::Swap => writeln!(
                    out,
                    "MiB Swap: {:.1} total, {:.1} free, {:.1} used, {:.1} avail Mem",
                    a[0], a[1], a[2], a[3]
                ),
            };
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzlens_log::LogScanner;

    #[test]
    fn test_averages() {
        let log = "\
top - 10:00:01 up 1 day,  2 users,  load average: 1.00, 2.00, 3.00
top - 10:00:02 up 1 day,  2 users,  load average: 2.00, 3.00, 4.00
";
        let report = LoadReport::from_events(&LogScanner::new().parse(log));
        assert_eq!(report.samples(TopSection::LoadAverage), 2);
        assert_eq!(
            report.averages(TopSection::LoadAverage),
            Some(vec![1.5, 2.5, 3.5])
        );
        assert_eq!(report.averages(TopSection::Cpu), None);
    }

    #[test]
    fn test_empty_report() {
        let report = LoadReport::default();
        assert!(report.is_empty());
        assert!(report.render().contains("MiB Swap: no samples"));
    }
}
