use crate::ir::{LogEvent, Span};
use crate::patterns::classify;

/// A streaming scanner for fuzzer logs.
///
/// `LogScanner` accepts log output incrementally or as a whole and emits one
/// [`LogEvent`] per recognized line. Partial lines are buffered until their
/// terminator arrives, so chunk boundaries never split a record.
pub struct LogScanner {
    events: Vec<LogEvent>,
    buffer: String,
    global_offset: usize,
    line_number: usize,
}

impl Default for LogScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LogScanner {
    /// Creates a new, empty `LogScanner`.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            buffer: String::new(),
            global_offset: 0,
            line_number: 0,
        }
    }

    /// Appends input to the internal buffer and scans every complete line.
    ///
    /// # Returns
    ///
    /// The events recognized in lines completed by this chunk.
    pub fn update(&mut self, input: &str) -> Vec<LogEvent> {
        self.buffer.push_str(input);
        self.process_buffer()
    }

    /// Scans whatever remains in the buffer as the final line.
    pub fn finish(mut self) -> Vec<LogEvent> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let start = self.global_offset;
            self.global_offset += rest.len();
            self.scan_line(&rest, start);
        }
        std::mem::take(&mut self.events)
    }

    /// Scans a complete input in one go.
    pub fn parse(mut self, input: &str) -> Vec<LogEvent> {
        let mut events = self.update(input);
        events.extend(self.finish());
        events
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.global_offset
    }

    fn process_buffer(&mut self) -> Vec<LogEvent> {
        let Some(last_nl) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let process_len = last_nl + 1;
        let chunk: String = self.buffer.drain(..process_len).collect();

        let mut line_start = self.global_offset;
        for raw in chunk.split_inclusive('\n') {
            self.scan_line(raw, line_start);
            line_start += raw.len();
        }
        self.global_offset += process_len;

        std::mem::take(&mut self.events)
    }

    fn scan_line(&mut self, raw: &str, start: usize) {
        self.line_number += 1;
        let text = raw.strip_suffix('\n').unwrap_or(raw);
        let text = text.strip_suffix('\r').unwrap_or(text);
        if let Some(payload) = classify(text) {
            self.events.push(LogEvent {
                span: Span::new(start, start + text.len()),
                line: self.line_number,
                payload,
            });
        }
    }
}
