use std::collections::VecDeque;
use std::io::BufRead;

const ARTIFICIAL_SAMPLES: usize = 20;

/// Whitespace/newline-delimited tokens read from any buffered reader.
///
/// Ends at EOF, or on the first read error (logged).
pub struct TokenSource<R> {
    reader: R,
    pending: VecDeque<String>,
    line: String,
    done: bool,
}

impl<R: BufRead> TokenSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
            line: String::new(),
            done: false,
        }
    }
}

impl TokenSource<std::io::BufReader<std::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(std::io::BufReader::new(std::io::stdin()))
    }
}

impl<R: BufRead> Iterator for TokenSource<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.pending.is_empty() {
            if self.done {
                return None;
            }

            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => self.done = true,
                Ok(_) => self
                    .pending
                    .extend(self.line.split_whitespace().map(str::to_string)),
                Err(e) => {
                    log::warn!("input read failed, ending ingest: {e}");
                    self.done = true;
                }
            }
        }

        self.pending.pop_front()
    }
}

/// Synthetic ramp `1.0, 1.1, ... 2.9` for running without a sensor.
pub struct ArtificialSource {
    next: usize,
}

impl ArtificialSource {
    pub fn new() -> Self {
        Self { next: 0 }
    }
}

impl Default for ArtificialSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for ArtificialSource {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.next >= ARTIFICIAL_SAMPLES {
            return None;
        }
        let value = 1.0 + self.next as f32 / 10.0;
        self.next += 1;
        Some(value.to_string())
    }
}
