//! Slash command parsing and definitions

use crossterm::style::Stylize;

/// Available slash commands
#[derive(Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    Clear,
    History,
    /// Show or set the pacing delay in milliseconds
    Delay(Option<String>),
    /// Ask without streaming
    Ask(String),
}

/// Parse a slash command from user input.
/// Returns None if the input is not a slash command.
pub fn parse_command(input: &str) -> Option<SlashCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    let (cmd, rest) = match input.split_once(' ') {
        Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
        None => (input.to_lowercase(), ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(SlashCommand::Help),
        "/quit" | "/q" | "/exit" => Some(SlashCommand::Quit),
        "/clear" | "/cls" => Some(SlashCommand::Clear),
        "/history" => Some(SlashCommand::History),
        "/delay" => Some(SlashCommand::Delay(arg)),
        "/ask" => arg.map(SlashCommand::Ask).or(Some(SlashCommand::Help)),
        _ => None,
    }
}

/// Render help text for all slash commands
pub fn render_help(renderer: &super::renderer::TerminalRenderer) {
    let cmd_color = renderer.command_color();
    let dim_color = renderer.dim_color();

    println!();
    renderer.render_system("Available commands:");
    println!();

    let commands = [
        ("/help", "Show this help message"),
        ("/quit", "Exit the chat"),
        ("/clear", "Start a new conversation"),
        ("/history", "Show the conversation so far"),
        ("/delay [ms]", "Show or change the typing delay"),
        ("/ask <question>", "Ask without streaming (shows sources)"),
    ];

    for (cmd, desc) in &commands {
        println!("  {:<20} {}", cmd.with(cmd_color), desc.with(dim_color));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse_command("hello there"), None);
    }

    #[test]
    fn test_basic_commands() {
        assert_eq!(parse_command("/q"), Some(SlashCommand::Quit));
        assert_eq!(parse_command("  /HELP "), Some(SlashCommand::Help));
        assert_eq!(parse_command("/history"), Some(SlashCommand::History));
        assert_eq!(parse_command("/nope"), None);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(parse_command("/delay"), Some(SlashCommand::Delay(None)));
        assert_eq!(
            parse_command("/delay 20"),
            Some(SlashCommand::Delay(Some("20".to_string())))
        );
        assert_eq!(
            parse_command("/ask what are your hours?"),
            Some(SlashCommand::Ask("what are your hours?".to_string()))
        );
        assert_eq!(parse_command("/ask"), Some(SlashCommand::Help));
    }
}
