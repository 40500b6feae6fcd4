//! SupportBot CLI - chat with a hosted support bot and manage its dashboard

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use supportbot_client::{
    api::{AskRequest, ChatClient, SendOptions},
    config::Config,
    dashboard::{BotConfigUpdate, DashboardClient},
    tui::ChatShell,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "supportbot")]
#[command(about = "Chat with a SupportBot widget and manage its dashboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (overridden by RUST_LOG)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat with streamed replies
    Chat,

    /// Send one message and stream the reply to stdout
    Send {
        /// Message text
        message: String,

        /// Pause before each fragment, in milliseconds (default: from config)
        #[arg(short, long)]
        delay: Option<u64>,
    },

    /// Send one message and print the complete reply
    Ask {
        /// Message text
        message: String,

        /// Use the API-key authenticated endpoint instead of the widget
        #[arg(long)]
        keyed: bool,

        /// Extra context for the keyed endpoint
        #[arg(long, requires = "keyed")]
        context: Option<String>,
    },

    /// Show or change the bot's LLM configuration
    #[command(subcommand)]
    BotConfig(BotConfigCommands),

    /// Manage indexed documents
    #[command(subcommand)]
    Documents(DocumentCommands),

    /// Manage local configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum BotConfigCommands {
    /// Show provider and model
    Get,

    /// Set provider, model and API key
    Set {
        #[arg(long)]
        provider: String,

        #[arg(long)]
        model: String,

        #[arg(long)]
        api_key: String,
    },
}

#[derive(Subcommand)]
enum DocumentCommands {
    /// List indexed documents
    List,

    /// Upload a document for ingestion
    Upload {
        /// File to upload
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., widget.widget_id, dashboard.base_url)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout is reserved for bot output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    match cli.command {
        Commands::Chat => {
            let config = load_valid(&config_path)?;
            ChatShell::new(&config)?.run().await?;
        }
        Commands::Send { message, delay } => {
            run_send(&config_path, &message, delay).await?;
        }
        Commands::Ask {
            message,
            keyed,
            context,
        } => {
            run_ask(&config_path, message, keyed, context).await?;
        }
        Commands::BotConfig(cmd) => {
            run_bot_config(&config_path, cmd).await?;
        }
        Commands::Documents(cmd) => {
            run_documents(&config_path, cmd).await?;
        }
        Commands::Config(cmd) => {
            run_config_command(&config_path, cmd)?;
        }
    }

    Ok(())
}

fn load_valid(path: &PathBuf) -> Result<Config> {
    let config = Config::load_from(path.clone())?;
    config.validate()?;
    Ok(config)
}

async fn run_send(path: &PathBuf, message: &str, delay: Option<u64>) -> Result<()> {
    let config = load_valid(path)?;
    let client = ChatClient::new(config.widget.clone())?;

    let options = match delay {
        Some(ms) => SendOptions::new().with_delay_ms(ms),
        None => client.default_options(),
    };

    info!("Streaming reply from {}", client.stream_url());
    let mut stdout = std::io::stdout();
    client
        .send(
            message,
            |fragment| {
                let _ = write!(stdout, "{}", fragment);
                let _ = stdout.flush();
            },
            options,
        )
        .await?;
    println!();

    Ok(())
}

async fn run_ask(path: &PathBuf, message: String, keyed: bool, context: Option<String>) -> Result<()> {
    let config = Config::load_from(path.clone())?;

    let response = if keyed {
        let settings = config.dashboard.clone();
        if settings.api_key.is_none() {
            anyhow::bail!("No API key configured. Set SUPPORTBOT_API_KEY or dashboard.api_key");
        }

        let mut request = AskRequest::new(message);
        if let Some(context) = context {
            request = request.with_context(context);
        }
        DashboardClient::new(settings)?.ask(&request).await?
    } else {
        config.validate()?;
        ChatClient::new(config.widget.clone())?
            .send_once(&message)
            .await?
    };

    println!("{}", response.response);
    if response.has_sources() {
        println!("\n--- Sources ---");
        for source in &response.sources {
            println!("  {}", source);
        }
    }
    println!("Confidence: {:.2}", response.confidence);

    Ok(())
}

async fn run_bot_config(path: &PathBuf, cmd: BotConfigCommands) -> Result<()> {
    let config = Config::load_from(path.clone())?;
    let client = DashboardClient::new(config.dashboard.clone())?;

    match cmd {
        BotConfigCommands::Get => {
            let envelope = client.fetch_bot_config().await?;
            let data = envelope.data;
            println!("Provider: {}", data.provider.as_deref().unwrap_or("(not set)"));
            println!("Model: {}", data.model.as_deref().unwrap_or("(not set)"));
            println!("API key: {}", if data.has_api_key { "set" } else { "not set" });
        }
        BotConfigCommands::Set {
            provider,
            model,
            api_key,
        } => {
            let update = BotConfigUpdate {
                provider,
                api_key,
                model,
            };
            let result = client.update_bot_config(&update).await?;
            println!("{}", result.message);
        }
    }

    Ok(())
}

async fn run_documents(path: &PathBuf, cmd: DocumentCommands) -> Result<()> {
    let config = Config::load_from(path.clone())?;
    let client = DashboardClient::new(config.dashboard.clone())?;

    match cmd {
        DocumentCommands::List => {
            let list = client.list_documents().await?;
            if list.items.is_empty() {
                println!("No documents indexed.");
            }
            for doc in &list.items {
                println!("{}  {}  {}", doc.document_id, doc.created_at, doc.source);
            }
        }
        DocumentCommands::Upload { path } => {
            info!("Uploading {}", path.display());
            let result = client.upload_document(&path).await?;
            println!("{}", result.message);
            if let Some(id) = result.document_id {
                println!("Document ID: {}", id);
            }
            if let Some(chunks) = result.chunks_created {
                println!("Chunks created: {}", chunks);
            }
        }
    }

    Ok(())
}

fn run_config_command(path: &PathBuf, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => config_init(path, force)?,
        ConfigCommands::Show => config_show(path)?,
        ConfigCommands::Set { key, value } => config_set(path, &key, &value)?,
        ConfigCommands::Path => config_path(path),
        ConfigCommands::Validate => config_validate(path)?,
    }
    Ok(())
}

fn config_init(path: &PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Configuration file already exists at: {}", path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().save_to(path.clone())?;

    println!("Configuration file created at: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  supportbot config set widget.widget_id <your-widget-id>");
    println!("  supportbot config set widget.base_url https://api.example.com");
    println!();
    println!("Or set environment variables:");
    println!("  export SUPPORTBOT_WIDGET_ID=your_widget_id");
    println!("  export SUPPORTBOT_BASE_URL=https://api.example.com");

    Ok(())
}

fn config_show(path: &PathBuf) -> Result<()> {
    let mut config = Config::load_from(path.clone())?;

    // Mask API key in display
    if config.dashboard.api_key.is_some() {
        config.dashboard.api_key = Some("***".to_string());
    }
    println!("{}", toml::to_string_pretty(&config)?);

    println!("--- Environment Variables ---");
    for var in [
        "SUPPORTBOT_BASE_URL",
        "SUPPORTBOT_WIDGET_ID",
        "SUPPORTBOT_DELAY_MS",
        "SUPPORTBOT_DASHBOARD_URL",
        "SUPPORTBOT_API_KEY",
    ] {
        let state = if std::env::var(var).is_ok() { "set" } else { "not set" };
        println!("{}: {}", var, state);
    }

    Ok(())
}

fn config_set(path: &PathBuf, key: &str, value: &str) -> Result<()> {
    // Read the file only, so env overrides are not persisted
    let mut config: Config = if path.exists() {
        toml::from_str(&std::fs::read_to_string(path)?)?
    } else {
        Config::default()
    };

    let Some((section, field)) = key.split_once('.') else {
        println!("Invalid key format. Use: section.key (e.g., widget.widget_id)");
        return Ok(());
    };

    match (section, field) {
        ("widget", "base_url") => config.widget.base_url = value.to_string(),
        ("widget", "widget_id") => config.widget.widget_id = value.to_string(),
        ("widget", "delay_ms") => config.widget.delay_ms = value.parse()?,
        ("widget", "connect_timeout_secs") => config.widget.connect_timeout_secs = value.parse()?,
        ("widget", "request_timeout_secs") => {
            config.widget.request_timeout_secs = Some(value.parse()?)
        }
        ("dashboard", "base_url") => config.dashboard.base_url = value.to_string(),
        ("dashboard", "api_key") => config.dashboard.api_key = Some(value.to_string()),
        ("dashboard", "timeout_secs") => config.dashboard.timeout_secs = value.parse()?,
        _ => {
            println!("Unknown key: {}", key);
            println!("Available: widget.{{base_url, widget_id, delay_ms, connect_timeout_secs, request_timeout_secs}}, dashboard.{{base_url, api_key, timeout_secs}}");
            return Ok(());
        }
    }

    config.save_to(path.clone())?;
    println!("Set {} = {}", key, if field == "api_key" { "***" } else { value });

    Ok(())
}

fn config_path(path: &PathBuf) {
    println!("{}", path.display());

    if path.exists() {
        println!("(file exists)");
    } else {
        println!("(file does not exist - run 'config init' to create)");
    }
}

fn config_validate(path: &PathBuf) -> Result<()> {
    let config = Config::load_from(path.clone())?;

    match config.validate() {
        Ok(()) => {
            println!("Configuration is valid!");
            println!();
            println!("Widget: {} (id {})", config.widget.base_url, config.widget.widget_id);
            println!("Typing delay: {} ms", config.widget.delay_ms);
            println!(
                "Dashboard: {} (API key {})",
                config.dashboard.base_url,
                if config.api_key().is_some() { "set" } else { "not set" }
            );
        }
        Err(e) => {
            println!("Configuration validation failed:");
            println!("  {}", e);
            println!();
            println!("To fix, either:");
            println!("  1. supportbot config set widget.widget_id <id>");
            println!("  2. export SUPPORTBOT_WIDGET_ID=<id>");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["supportbot", "chat", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Commands::Chat));

        let cli = Cli::try_parse_from(["supportbot", "--log-level", "trace", "config", "path"]).unwrap();
        assert_eq!(cli.log_level, "trace");

        let cli = Cli::try_parse_from(["supportbot", "send", "hi"]).unwrap();
        assert_eq!(cli.log_level, "warn");
    }
}
