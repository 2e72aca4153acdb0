//! Line assembly for the serial command stream.
//!
//! Bytes are accumulated until a `\n` terminator; the completed line is
//! trimmed and handed out as an owned, fixed-capacity string.

use embedded_io::{Read, ReadReady};
use heapless::{String, Vec};

/// Line terminator byte
pub const LINE_TERMINATOR: u8 = b'\n';

/// Maximum line length in bytes (excluding the terminator)
pub const MAX_LINE_LEN: usize = 64;

/// A complete, trimmed input line
pub type Line = String<MAX_LINE_LEN>;

/// Incremental line reader
///
/// Lines longer than [`MAX_LINE_LEN`] are truncated: the first
/// `MAX_LINE_LEN` bytes are kept, the rest up to the terminator is dropped,
/// and the truncated line is yielded at the terminator. Invalid UTF-8
/// sequences are replaced with U+FFFD, so a line that had any
/// non-whitespace byte on the wire is never yielded empty.
#[derive(Debug, Clone)]
pub struct LineReader {
    state: ReadState,
    buffer: Vec<u8, MAX_LINE_LEN>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// Collecting bytes of the current line
    Accumulating,
    /// Buffer is full, skipping to the next terminator
    Truncating,
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReader {
    /// Create a new line reader
    pub fn new() -> Self {
        Self {
            state: ReadState::Accumulating,
            buffer: Vec::new(),
        }
    }

    /// Drop any partially received line
    pub fn reset(&mut self) {
        self.state = ReadState::Accumulating;
        self.buffer.clear();
    }

    /// Number of bytes buffered for the line in progress
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte to the reader
    ///
    /// Returns `Some(line)` when the byte completes a line.
    pub fn feed(&mut self, byte: u8) -> Option<Line> {
        if byte == LINE_TERMINATOR {
            let line = Self::finish(&self.buffer);
            self.reset();
            return Some(line);
        }

        if self.state == ReadState::Accumulating && self.buffer.push(byte).is_err() {
            self.state = ReadState::Truncating;
        }
        None
    }

    /// Poll the transport for a complete line without blocking
    ///
    /// Reads only while the transport reports data ready and stops at the
    /// first terminator, so bytes of later lines stay queued in the
    /// transport. Returns `Ok(None)` when no line is complete yet.
    pub fn poll<R: Read + ReadReady>(&mut self, rx: &mut R) -> Result<Option<Line>, R::Error> {
        let mut byte = [0u8; 1];
        while rx.read_ready()? {
            if rx.read(&mut byte)? == 0 {
                break;
            }
            if let Some(line) = self.feed(byte[0]) {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    fn finish(bytes: &[u8]) -> Line {
        // Replacement characters are 3 bytes wide, so decoding may hit the
        // capacity before the input runs out; the tail is dropped.
        let mut decoded = Line::new();
        'decode: for chunk in bytes.utf8_chunks() {
            for c in chunk.valid().chars() {
                if decoded.push(c).is_err() {
                    break 'decode;
                }
            }
            if !chunk.invalid().is_empty() && decoded.push(char::REPLACEMENT_CHARACTER).is_err() {
                break;
            }
        }

        let mut line = Line::new();
        // Cannot overflow: both strings share a capacity
        let _ = line.push_str(decoded.trim());
        line
    }
}
