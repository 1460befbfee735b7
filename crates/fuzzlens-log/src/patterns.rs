//! Line classification for fuzzer and `top` output.

use crate::ir::{EventPayload, MonitorSample, ObserverCounts, TopSection};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CONSISTENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"consistency_ratios for input of len (\d+):\s+([\d,\s]+)").expect("valid regex")
});

static OBSERVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"Observer correctness stats for input of len (\d+): ",
        r"both wrong: (\d+), ",
        r"first wrong/second right: (\d+), ",
        r"first right/second wrong: (\d+), ",
        r"both right: (\d+)"
    ))
    .expect("valid regex")
});

static MONITOR: Lazy<Regex> = Lazy::new(|| {
    let parts = [
        r"GLOBAL",
        r"run time:\s*(\d+)h-(\d+)m-(\d+)s",
        r"clients:\s*(\d+)",
        r"corpus:\s*(\d+)",
        r"objectives:\s*(\d+)",
        r"executions:\s*(\d+)",
        r"exec/sec:\s*([\d.]+k?)",
        r"coverage_observer:\s*([\d.]+)%",
        r"state-observer:\s*([\d.]+)%",
    ];
    Regex::new(&parts.join(".*")).expect("valid regex")
});

static TOP_LOAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"load average:\s*([\d.]+),\s*([\d.]+),\s*([\d.]+)").expect("valid regex")
});

static TOP_TASKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Tasks:\s*(\d+)\s+total,\s*(\d+)\s+running,\s*(\d+)\s+sleeping,\s*(\d+)\s+stopped,\s*(\d+)\s+zombie",
    )
    .expect("valid regex")
});

static TOP_CPU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"%Cpu\(s\):\s*([\d.]+)\s*us,\s*([\d.]+)\s*sy,\s*([\d.]+)\s*ni,\s*([\d.]+)\s*id,\s*([\d.]+)\s*wa,\s*([\d.]+)\s*hi,\s*([\d.]+)\s*si,\s*([\d.]+)\s*st",
    )
    .expect("valid regex")
});

static TOP_MEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"MiB Mem\s*:\s*([\d.]+)\s*total,\s*([\d.]+)\s*free,\s*([\d.]+)\s*used,\s*([\d.]+)\s*buff/cache",
    )
    .expect("valid regex")
});

static TOP_SWAP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"MiB Swap:\s*([\d.]+)\s*total,\s*([\d.]+)\s*free,\s*([\d.]+)\s*used\.\s*([\d.]+)\s*avail Mem",
    )
    .expect("valid regex")
});

/// Classifies a single line (without its line terminator).
///
/// Returns `None` for lines that carry no telemetry.
pub fn classify(line: &str) -> Option<EventPayload> {
    if line.contains("consistency_ratios") {
        if let Some(caps) = CONSISTENCY.captures(line) {
            return consistency(&caps, line);
        }
    }
    if line.contains("Input inconsistent") {
        return Some(EventPayload::InputInconsistent);
    }
    if line.contains("tries, still unstable") {
        return Some(EventPayload::StillUnstable {
            message: line.to_string(),
        });
    }
    if line.contains("Observer correctness stats") {
        if let Some(caps) = OBSERVER.captures(line) {
            return observer(&caps);
        }
    }
    if line.contains("GLOBAL") {
        let sample = MONITOR.captures(line).and_then(|caps| monitor(&caps));
        return Some(match sample {
            Some(sample) => EventPayload::MonitorStatus(sample),
            None => EventPayload::MonitorUnparsed {
                text: line.to_string(),
            },
        });
    }
    top(line)
}

fn consistency(caps: &Captures<'_>, line: &str) -> Option<EventPayload> {
    let input_len = match caps[1].parse::<u32>() {
        Ok(len) => len,
        Err(e) => {
            log::warn!("Ignoring consistency line with bad input length: {}", e);
            return None;
        }
    };
    let mut values = Vec::new();
    for field in caps[2].split(',') {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        match field.parse::<u64>() {
            Ok(v) => values.push(v),
            Err(e) => {
                log::warn!("Ignoring consistency value {:?}: {}", field, e);
            }
        }
    }
    if values.is_empty() {
        log::warn!("Consistency line without values: {}", line);
        return None;
    }
    Some(EventPayload::ConsistencyRatios { input_len, values })
}

fn observer(caps: &Captures<'_>) -> Option<EventPayload> {
    Some(EventPayload::ObserverStats(ObserverCounts {
        input_len: caps[1].parse().ok()?,
        both_wrong: caps[2].parse().ok()?,
        first_wrong_second_right: caps[3].parse().ok()?,
        first_right_second_wrong: caps[4].parse().ok()?,
        both_right: caps[5].parse().ok()?,
    }))
}

fn monitor(caps: &Captures<'_>) -> Option<MonitorSample> {
    let hours: u64 = caps[1].parse().ok()?;
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = caps[3].parse().ok()?;
    Some(MonitorSample {
        run_time: hours * 3600 + minutes * 60 + seconds,
        clients: caps[4].parse().ok()?,
        corpus: caps[5].parse().ok()?,
        objectives: caps[6].parse().ok()?,
        executions: caps[7].parse().ok()?,
        exec_per_sec: parse_rate(&caps[8])?,
        coverage: caps[9].parse().ok()?,
        state: caps[10].parse().ok()?,
    })
}

/// Parses `exec/sec` values such as `512.3` or `1.2k`.
pub fn parse_rate(text: &str) -> Option<f64> {
    match text.strip_suffix('k') {
        Some(thousands) => thousands.parse::<f64>().ok().map(|v| v * 1000.0),
        None => text.parse().ok(),
    }
}

fn top(line: &str) -> Option<EventPayload> {
    let table: [(TopSection, &Lazy<Regex>, &str); 5] = [
        (TopSection::LoadAverage, &TOP_LOAD, "load average:"),
        (TopSection::Tasks, &TOP_TASKS, "Tasks:"),
        (TopSection::Cpu, &TOP_CPU, "%Cpu(s):"),
        (TopSection::Memory, &TOP_MEM, "MiB Mem"),
        (TopSection::Swap, &TOP_SWAP, "MiB Swap:"),
    ];
    for (section, regex, marker) in table {
        if !line.contains(marker) {
            continue;
        }
        if let Some(caps) = regex.captures(line) {
            let values: Option<Vec<f64>> = caps
                .iter()
                .skip(1)
                .map(|m| m.and_then(|m| m.as_str().parse().ok()))
                .collect();
            if let Some(values) = values {
                return Some(EventPayload::TopSnapshot { section, values });
            }
        }
    }
    None
}
