//! Incremental decoder for the chat event stream
//!
//! Turns an append-only byte feed into complete lines and then into
//! fragments. Nothing is lost across read boundaries: the unterminated tail
//! of each read, including half of a multi-byte character, is carried over
//! to the next one.

use super::sse::{parse_frame, Frame};
use tracing::{trace, warn};

/// One unit of newly available bot text
pub type Fragment = String;

/// Counters collected while decoding one stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Complete lines handed to classification
    pub lines: usize,
    /// Fragments produced
    pub fragments: usize,
    /// Data frames whose payload failed to parse
    pub malformed: usize,
    /// `done` sentinels seen
    pub sentinels: usize,
}

/// Per-session stream decoder.
///
/// Owns the buffer for exactly one stream; never share an instance between
/// requests.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Bytes of an incomplete UTF-8 sequence left over from the last chunk
    carry: Vec<u8>,
    /// Decoded text after the last newline seen
    buffer: String,
    stats: DecodeStats,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, in order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.decode_utf8(bytes);

        let (lines, rest) = split_complete_lines(&self.buffer);
        let lines: Vec<String> = lines.into_iter().map(str::to_string).collect();
        self.buffer = rest.to_string();
        lines
    }

    /// Drain whatever is left once the transport reports end of stream.
    ///
    /// The final line does not need a trailing newline.
    pub fn flush(&mut self) -> Vec<String> {
        if !self.carry.is_empty() {
            // Truncated multi-byte sequence at EOF
            self.carry.clear();
            self.buffer.push(char::REPLACEMENT_CHARACTER);
        }

        let rest = std::mem::take(&mut self.buffer);
        if rest.is_empty() {
            return Vec::new();
        }
        rest.split('\n').map(str::to_string).collect()
    }

    /// Feed a chunk and classify the completed lines into fragments.
    pub fn decode_chunk(&mut self, bytes: &[u8]) -> Vec<Fragment> {
        let lines = self.feed(bytes);
        self.fragments_from(lines)
    }

    /// Flush the buffer and classify the remaining lines into fragments.
    pub fn finish(&mut self) -> Vec<Fragment> {
        let lines = self.flush();
        self.fragments_from(lines)
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Number of bytes/chars currently held back waiting for more input
    pub fn pending_len(&self) -> usize {
        self.carry.len() + self.buffer.len()
    }

    fn fragments_from(&mut self, lines: Vec<String>) -> Vec<Fragment> {
        let mut fragments = Vec::new();

        for line in lines {
            self.stats.lines += 1;
            match parse_frame(&line) {
                Frame::Content(text) => {
                    self.stats.fragments += 1;
                    fragments.push(text);
                }
                Frame::Done => {
                    trace!("done sentinel received");
                    self.stats.sentinels += 1;
                }
                Frame::Malformed(reason) => {
                    self.stats.malformed += 1;
                    warn!(line = %line.trim(), "Failed to parse SSE data: {}", reason);
                }
                Frame::Ignored => {}
            }
        }

        fragments
    }

    /// Lossy, stateful UTF-8 decode of `bytes` onto the text buffer.
    fn decode_utf8(&mut self, bytes: &[u8]) {
        let mut data = std::mem::take(&mut self.carry);
        data.extend_from_slice(bytes);

        let mut rest = &data[..];
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this prefix decodes
                    if let Ok(text) = std::str::from_utf8(valid) {
                        self.buffer.push_str(text);
                    }

                    match e.error_len() {
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Sequence may complete with the next chunk
                            self.carry = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// Split `text` into its newline-terminated lines and the unterminated rest.
pub fn split_complete_lines(text: &str) -> (Vec<&str>, &str) {
    match text.rfind('\n') {
        Some(pos) => (text[..pos].split('\n').collect(), &text[pos + 1..]),
        None => (Vec::new(), text),
    }
}
