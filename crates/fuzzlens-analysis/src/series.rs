//! Chart-ready series shared by the time-series views.

/// How tick values on a value axis are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFormat {
    /// Shortest representation.
    Plain,
    /// Truncated to an integer.
    Integer,
    /// Three decimals.
    Fixed3,
    /// As many decimals as the magnitude needs, for log axes.
    LogDecimals,
}

impl TickFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            TickFormat::Plain => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", value as i64)
                } else {
                    format!("{}", value)
                }
            }
            TickFormat::Integer => format!("{}", value.trunc() as i64),
            TickFormat::Fixed3 => format!("{:.3}", value),
            TickFormat::LogDecimals => {
                if value == 0.0 {
                    return "0".to_string();
                }
                let decimals = (-value.log10() - 1e-9).ceil().max(0.0) as usize;
                format!("{:.*}", decimals, value)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    pub fn max_x(&self) -> Option<f64> {
        self.points.iter().map(|p| p.0).reduce(f64::max)
    }
}

/// One chart in a grid: a y label and one or more lines over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub ylabel: String,
    pub series: Vec<Series>,
    pub tick_format: TickFormat,
}

impl Panel {
    /// Bounding box over every point, or `None` when the panel is empty.
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut points = self.series.iter().flat_map(|s| s.points.iter());
        let &(x, y) = points.next()?;
        let init = ((x, x), (y, y));
        Some(points.fold(init, |((x0, x1), (y0, y1)), &(x, y)| {
            ((x0.min(x), x1.max(x)), (y0.min(y), y1.max(y)))
        }))
    }
}

/// Rows and columns of a near-square grid for `n` panels.
pub fn grid_dims(n: usize) -> (usize, usize) {
    if n == 0 {
        return (1, 1);
    }
    let rows = (n as f64).sqrt().ceil() as usize;
    let cols = n.div_ceil(rows);
    (rows, cols)
}

const HALF_HOUR: f64 = 1800.0;
const LONG_RUN: f64 = 6.0 * 3600.0;

/// Time axis in seconds, labelled in hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub max: f64,
    /// Seconds between major ticks.
    pub interval: f64,
    /// Decimals of the hour labels.
    pub decimals: usize,
}

impl TimeAxis {
    /// Half-hour ticks for short runs; about ten ticks on half-hour boundaries
    /// for runs longer than six hours.
    pub fn for_times(times: &[f64]) -> Self {
        let max = times.iter().copied().fold(0.0, f64::max);
        if max > LONG_RUN {
            let interval = ((max / 10.0 / HALF_HOUR).floor() * HALF_HOUR).max(HALF_HOUR);
            Self {
                max,
                interval,
                decimals: 0,
            }
        } else {
            Self {
                max,
                interval: HALF_HOUR,
                decimals: 1,
            }
        }
    }

    pub fn ticks(&self) -> Vec<f64> {
        let count = (self.max / self.interval).floor() as usize;
        (0..=count).map(|i| i as f64 * self.interval).collect()
    }

    pub fn label(&self, seconds: f64) -> String {
        format!("{:.*}", self.decimals, seconds / 3600.0)
    }
}
