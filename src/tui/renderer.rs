//! Terminal output for the chat shell

use crossterm::style::{Color, Stylize};
use std::io::{self, Write};

use super::theme::Theme;
use crate::api::ChatResponse;

/// Prints each kind of shell line in its theme color
pub struct TerminalRenderer {
    theme: Theme,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::with_theme(Theme::from_env())
    }

    pub fn with_theme(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn render_banner(&self, version: &str, base_url: &str, widget_id: &str) {
        let muted = self.theme.muted;
        println!();
        println!("{}", "  SupportBot Chat".with(self.theme.banner));
        println!("  {}", format!("v{}", version).with(muted));
        println!("  {}", format!("{} (widget {})", base_url, widget_id).with(muted));
        println!("  {}", "Type /help for commands, /quit to exit".with(muted));
        println!();
    }

    /// Append streamed bot text to the current line
    pub fn render_delta(&self, text: &str) {
        print!("{}", text.with(self.theme.bot));
        let _ = io::stdout().flush();
    }

    /// A complete answer, followed by its sources and confidence
    pub fn render_answer(&self, response: &ChatResponse) {
        self.render_bot_line(&response.response);
        let mut details = format!("confidence {:.2}", response.confidence);
        if response.has_sources() {
            details = format!("sources: {} | {}", response.sources.join(", "), details);
        }
        println!("  {}", details.with(self.theme.muted));
    }

    pub fn render_bot_line(&self, text: &str) {
        println!("{}", text.with(self.theme.bot));
    }

    pub fn render_user_line(&self, text: &str) {
        println!("{} {}", ">".with(self.theme.user), text);
    }

    pub fn render_system(&self, text: &str) {
        println!("{}", text.with(self.theme.notice));
    }

    pub fn render_info(&self, text: &str) {
        println!("{}", text.with(self.theme.muted));
    }

    pub fn render_success(&self, text: &str) {
        println!("{}", text.with(self.theme.confirm));
    }

    /// Errors go to stderr so piped replies stay clean
    pub fn render_error(&self, text: &str) {
        eprintln!("{}", text.with(self.theme.failure));
    }

    pub fn prompt_color(&self) -> Color {
        self.theme.user
    }

    pub fn command_color(&self) -> Color {
        self.theme.command
    }

    pub fn dim_color(&self) -> Color {
        self.theme.muted
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}
