//! Typing indicator for the chat shell

use indicatif::{ProgressBar, ProgressStyle};

/// A spinner shown until the first fragment of a reply arrives
pub struct TypingIndicator {
    bar: ProgressBar,
    active: bool,
}

impl TypingIndicator {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["   ", ".  ", ".. ", "...", "   "]);
        bar.set_style(style);
        Self { bar, active: false }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
        self.bar.enable_steady_tick(std::time::Duration::from_millis(200));
        self.active = true;
    }

    /// Stop and clear the spinner
    pub fn stop(&mut self) {
        if self.active {
            self.bar.finish_and_clear();
            self.active = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for TypingIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TypingIndicator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_is_idempotent() {
        let mut indicator = TypingIndicator::new();
        indicator.start("typing");
        assert!(indicator.is_active());
        indicator.stop();
        indicator.stop();
        assert!(!indicator.is_active());
    }
}
