//! Multi-monitor `GLOBAL` status lines as time series.

use crate::series::{Panel, Series, TickFormat};
use fuzzlens_log::ir::{EventPayload, LogEvent, MonitorSample};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorLog {
    pub samples: Vec<MonitorSample>,
    /// `GLOBAL` lines that did not carry every expected field.
    pub unparsed: Vec<String>,
}

const COLUMNS: [(&str, TickFormat); 7] = [
    ("Clients [count]", TickFormat::Plain),
    ("Corpus [count]", TickFormat::Plain),
    ("Objectives [count]", TickFormat::Plain),
    ("Executions [count]", TickFormat::Plain),
    ("Executions/s [1/s]", TickFormat::Fixed3),
    ("Coverage [%]", TickFormat::Fixed3),
    ("State [%]", TickFormat::Fixed3),
];

fn column_value(sample: &MonitorSample, column: usize) -> f64 {
    match column {
        0 => sample.clients as f64,
        1 => sample.corpus as f64,
        2 => sample.objectives as f64,
        3 => sample.executions as f64,
        4 => sample.exec_per_sec,
        5 => sample.coverage,
        _ => sample.state,
    }
}

impl MonitorLog {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a LogEvent>) -> Self {
        let mut log = Self::default();
        for event in events {
            match &event.payload {
                EventPayload::MonitorStatus(sample) => log.samples.push(*sample),
                EventPayload::MonitorUnparsed { text } => log.unparsed.push(text.clone()),
                _ => {}
            }
        }
        log
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.run_time as f64).collect()
    }

    /// One single-line panel per monitored quantity.
    pub fn panels(&self) -> Vec<Panel> {
        COLUMNS
            .iter()
            .enumerate()
            .map(|(column, &(ylabel, tick_format))| Panel {
                ylabel: ylabel.to_string(),
                series: vec![Series::new(
                    ylabel,
                    self.samples
                        .iter()
                        .map(|s| (s.run_time as f64, column_value(s, column)))
                        .collect(),
                )],
                tick_format,
            })
            .collect()
    }
}
