//! Colors for the chat shell

use crossterm::style::Color;

/// One color per kind of line the shell prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub user: Color,
    /// Streamed and complete bot replies
    pub bot: Color,
    pub notice: Color,
    pub failure: Color,
    /// Secondary info: sources, hints, banner details
    pub muted: Color,
    pub confirm: Color,
    pub banner: Color,
    pub command: Color,
}

impl Theme {
    /// Colored theme unless `NO_COLOR` is set (https://no-color.org)
    pub fn from_env() -> Self {
        match std::env::var_os("NO_COLOR") {
            Some(value) if !value.is_empty() => Self::plain(),
            _ => Self::default(),
        }
    }

    /// Terminal default color everywhere
    pub fn plain() -> Self {
        Self {
            user: Color::Reset,
            bot: Color::Reset,
            notice: Color::Reset,
            failure: Color::Reset,
            muted: Color::Reset,
            confirm: Color::Reset,
            banner: Color::Reset,
            command: Color::Reset,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            user: Color::Cyan,
            bot: Color::White,
            notice: Color::DarkYellow,
            failure: Color::Red,
            muted: Color::DarkGrey,
            confirm: Color::Green,
            banner: Color::Magenta,
            command: Color::Yellow,
        }
    }
}
