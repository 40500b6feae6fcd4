//! Server-Sent Events (SSE) frame classification for the widget chat stream
//!
//! Each line of the stream is either a data frame:
//! `data: {"content":"..."}` / `data: {"done":true}`
//! or something we skip (blank keep-alives, `: comments`, `event:` lines).

use serde_json::Value;

/// Literal prefix that marks a data frame
pub const DATA_PREFIX: &str = "data: ";

/// Classification of a single line of the wire stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A data frame carrying new bot text
    Content(String),
    /// A data frame with `done: true`; carries no text
    Done,
    /// A data frame whose payload is not valid JSON
    Malformed(String),
    /// Anything that is not a data frame, or a data frame with nothing to emit
    Ignored,
}

/// Classify and decode one line of the stream.
///
/// Never fails: a bad payload becomes [`Frame::Malformed`] so the caller can
/// report it and move on to the next line.
pub fn parse_frame(line: &str) -> Frame {
    let line = line.trim();

    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return Frame::Ignored;
    };

    let json: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return Frame::Malformed(format!("JSON parse error: {}", e)),
    };

    // `done` wins over any content carried in the same payload
    if json["done"].as_bool() == Some(true) {
        return Frame::Done;
    }

    match json["content"].as_str() {
        Some(content) if !content.is_empty() => Frame::Content(content.to_string()),
        _ => Frame::Ignored,
    }
}
