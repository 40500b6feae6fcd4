//! Interactive chat shell
//!
//! Streams bot replies into the terminal the way the web widget shows them:
//! a typing indicator until the first fragment, then paced text.

pub mod commands;
pub mod prompt;
pub mod renderer;
pub mod spinner;
pub mod theme;

use crate::api::{ChatClient, SendOptions};
use crate::config::Config;
use crate::conversation::{Conversation, Sender, SubmitOutcome, ERROR_REPLY};

use commands::{parse_command, render_help, SlashCommand};
use prompt::PromptHandler;
use renderer::TerminalRenderer;
use spinner::TypingIndicator;

use anyhow::Result;
use tracing::debug;

/// Interactive shell bound to one widget
pub struct ChatShell {
    client: ChatClient,
    renderer: TerminalRenderer,
    prompt_handler: PromptHandler,
    conversation: Conversation,
    delay_ms: u64,
}

enum CommandResult {
    Continue,
    Quit,
}

impl ChatShell {
    pub fn new(config: &Config) -> Result<Self> {
        let client = ChatClient::new(config.widget.clone())?;

        Ok(Self {
            client,
            renderer: TerminalRenderer::new(),
            prompt_handler: PromptHandler::new(),
            conversation: Conversation::new(),
            delay_ms: config.widget.delay_ms,
        })
    }

    /// Run the shell until `/quit` or EOF
    pub async fn run(&mut self) -> Result<()> {
        let settings = self.client.settings();
        self.renderer.render_banner(
            env!("CARGO_PKG_VERSION"),
            &settings.base_url,
            &settings.widget_id,
        );

        loop {
            let input = match self.prompt_handler.read_line(self.renderer.prompt_color()) {
                Some(input) => input,
                None => break,
            };

            if input.is_empty() {
                continue;
            }

            if let Some(cmd) = parse_command(&input) {
                match self.handle_command(cmd).await {
                    CommandResult::Continue => continue,
                    CommandResult::Quit => break,
                }
            } else {
                self.process_message(&input).await;
            }
        }

        debug!(inputs = self.prompt_handler.history_len(), "chat shell closed");
        Ok(())
    }

    async fn handle_command(&mut self, cmd: SlashCommand) -> CommandResult {
        match cmd {
            SlashCommand::Help => render_help(&self.renderer),
            SlashCommand::Quit => return CommandResult::Quit,
            SlashCommand::Clear => {
                self.conversation = Conversation::new();
                self.renderer.render_success("Conversation cleared.");
            }
            SlashCommand::History => self.render_history(),
            SlashCommand::Delay(None) => {
                self.renderer
                    .render_info(&format!("Typing delay: {} ms", self.delay_ms));
            }
            SlashCommand::Delay(Some(value)) => match value.parse::<u64>() {
                Ok(ms) => {
                    self.delay_ms = ms;
                    self.renderer
                        .render_success(&format!("Typing delay set to {} ms", ms));
                }
                Err(_) => self
                    .renderer
                    .render_error(&format!("Not a number of milliseconds: {}", value)),
            },
            SlashCommand::Ask(question) => {
                let mut indicator = TypingIndicator::new();
                indicator.start("thinking");
                let result = self.client.send_once(&question).await;
                indicator.stop();

                match result {
                    Ok(response) => self.renderer.render_answer(&response),
                    Err(err) => {
                        self.renderer.render_bot_line(ERROR_REPLY);
                        self.renderer.render_error(&format!("({})", err));
                    }
                }
            }
        }
        CommandResult::Continue
    }

    /// Stream one reply into the terminal and the transcript
    async fn process_message(&mut self, input: &str) {
        let mut indicator = TypingIndicator::new();
        indicator.start("typing");

        let renderer = &self.renderer;
        let mut printed = 0;
        let options = SendOptions::new().with_delay_ms(self.delay_ms);

        let outcome = self
            .conversation
            .submit(&self.client, input, options, |text| {
                indicator.stop();
                renderer.render_delta(&text[printed..]);
                printed = text.len();
            })
            .await;
        indicator.stop();

        if printed > 0 {
            println!();
        }

        match outcome {
            SubmitOutcome::Answered if printed == 0 => {
                self.renderer.render_info("(no reply)");
            }
            SubmitOutcome::Answered | SubmitOutcome::Ignored => {}
            SubmitOutcome::Failed(err) => {
                self.renderer.render_bot_line(ERROR_REPLY);
                self.renderer.render_error(&format!("({})", err));
            }
        }
    }

    fn render_history(&self) {
        if self.conversation.turns().is_empty() {
            self.renderer.render_info("No messages yet.");
            return;
        }

        for turn in self.conversation.turns() {
            match turn.sender {
                Sender::User => self.renderer.render_user_line(&turn.text),
                Sender::Bot => self.renderer.render_bot_line(&turn.text),
            }
        }
    }
}
