use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One recognized line of fuzzer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub span: Span,
    /// 1-based line number in the scanned stream.
    pub line: usize,
    #[serde(flatten)]
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum EventPayload {
    ConsistencyRatios {
        input_len: u32,
        values: Vec<u64>,
    },
    InputInconsistent,
    StillUnstable {
        message: String,
    },
    ObserverStats(ObserverCounts),
    MonitorStatus(MonitorSample),
    MonitorUnparsed {
        text: String,
    },
    TopSnapshot {
        section: TopSection,
        values: Vec<f64>,
    },
}

/// Agreement counts between the coverage observer (first) and the state
/// observer (second) for one calibrated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverCounts {
    pub input_len: u32,
    pub both_wrong: u64,
    pub first_wrong_second_right: u64,
    pub first_right_second_wrong: u64,
    pub both_right: u64,
}

impl ObserverCounts {
    pub fn counts(&self) -> [u64; 4] {
        [
            self.both_wrong,
            self.first_wrong_second_right,
            self.first_right_second_wrong,
            self.both_right,
        ]
    }

    /// Saturates at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.counts().iter().fold(0u64, |acc, &c| acc.saturating_add(c))
    }

    /// Each count divided by the total, or `None` when nothing was counted.
    pub fn ratios(&self) -> Option<[f64; 4]> {
        let counts = self.counts();
        let total: f64 = counts.iter().map(|&c| c as f64).sum();
        if total == 0.0 {
            return None;
        }
        Some(counts.map(|c| c as f64 / total))
    }
}

/// A `GLOBAL` status line of the multi-monitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorSample {
    /// Seconds since the campaign started.
    pub run_time: u64,
    pub clients: u64,
    pub corpus: u64,
    pub objectives: u64,
    pub executions: u64,
    pub exec_per_sec: f64,
    /// Percent.
    pub coverage: f64,
    /// Percent.
    pub state: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TopSection {
    LoadAverage,
    Tasks,
    Cpu,
    Memory,
    Swap,
}

impl TopSection {
    pub const ALL: [TopSection; 5] = [
        TopSection::LoadAverage,
        TopSection::Tasks,
        TopSection::Cpu,
        TopSection::Memory,
        TopSection::Swap,
    ];

    /// Number of numeric columns the section carries.
    pub fn arity(self) -> usize {
        match self {
            TopSection::LoadAverage => 3,
            TopSection::Tasks => 5,
            TopSection::Cpu => 8,
            TopSection::Memory | TopSection::Swap => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TopSection::LoadAverage => "load average",
            TopSection::Tasks => "Tasks",
            TopSection::Cpu => "%Cpu(s)",
            TopSection::Memory => "MiB Mem",
            TopSection::Swap => "MiB Swap",
        }
    }
}
