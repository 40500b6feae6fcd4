//! Line input for the chat shell
//!
//! A line ending in `\` continues on the next one, so multi-line questions
//! can be typed without a dedicated editor.

use crossterm::style::{Color, Stylize};
use std::io::{self, BufRead, Write};

const CONTINUATION: char = '\\';

/// Reads messages from stdin and remembers what was sent
pub struct PromptHandler {
    history: Vec<String>,
}

impl PromptHandler {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
        }
    }

    /// Show the prompt and read one message. `None` on EOF (Ctrl+D).
    pub fn read_line(&mut self, prompt_color: Color) -> Option<String> {
        print!("{} ", ">".with(prompt_color));
        io::stdout().flush().ok()?;

        let stdin = io::stdin();
        let mut lock = stdin.lock();
        self.read_message(&mut lock, || {
            print!("{} ", ".".with(prompt_color));
            let _ = io::stdout().flush();
        })
    }

    /// Read one message from `reader`, following continuation lines.
    fn read_message<R: BufRead>(&mut self, reader: &mut R, mut on_continue: impl FnMut()) -> Option<String> {
        let mut message = String::new();

        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) if message.is_empty() => return None,
                Ok(0) => break,
                Ok(_) => {}
                Err(_) => return None,
            }

            let line = line.trim_end_matches(['\r', '\n']);
            match line.strip_suffix(CONTINUATION) {
                Some(head) => {
                    message.push_str(head);
                    message.push('\n');
                    on_continue();
                }
                None => {
                    message.push_str(line);
                    break;
                }
            }
        }

        let message = message.trim().to_string();
        self.remember(&message);
        Some(message)
    }

    fn remember(&mut self, message: &str) {
        if message.is_empty() || self.history.last().map(String::as_str) == Some(message) {
            return;
        }
        self.history.push(message.to_string());
    }

    /// Number of distinct consecutive inputs so far
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for PromptHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_continuation_lines_join() {
        let mut handler = PromptHandler::new();
        let mut input = Cursor::new("first \\\nsecond\nthird\n");
        let mut continued = 0;

        let message = handler.read_message(&mut input, || continued += 1);
        assert_eq!(message.as_deref(), Some("first \nsecond"));
        assert_eq!(continued, 1);

        let message = handler.read_message(&mut input, || {});
        assert_eq!(message.as_deref(), Some("third"));
        assert_eq!(handler.history_len(), 2);
    }

    #[test]
    fn test_eof_and_repeats() {
        let mut handler = PromptHandler::new();
        let mut input = Cursor::new("hi\r\nhi\n\n");

        assert_eq!(handler.read_message(&mut input, || {}).as_deref(), Some("hi"));
        assert_eq!(handler.read_message(&mut input, || {}).as_deref(), Some("hi"));
        assert_eq!(handler.read_message(&mut input, || {}).as_deref(), Some(""));
        assert_eq!(handler.read_message(&mut input, || {}), None);
        assert_eq!(handler.history_len(), 1);
    }

    #[test]
    fn test_eof_during_continuation_keeps_text() {
        let mut handler = PromptHandler::new();
        let mut input = Cursor::new("dangling \\\n");
        assert_eq!(handler.read_message(&mut input, || {}).as_deref(), Some("dangling"));
    }
}
