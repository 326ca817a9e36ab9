//! Perspicacity - terminal client for the Perspicacity answer service
//!
//! Ask questions in search or research mode and read streamed, cited answers:
//! - Word-by-word answer reveal with inline citation links
//! - Sources, articles, books and research steps as tabs
//! - Edit earlier questions and regenerate answers in either mode

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use perspicacity_core::{paths, ClientConfig, Conversation, CredentialKey, CredentialStore, HttpTransport};

mod tui;

/// Perspicacity - cited answers in your terminal
#[derive(Parser)]
#[command(name = "perspicacity")]
#[command(about = "Terminal client for the Perspicacity answer service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the service origin from config.toml
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session (default)
    Chat,

    /// Configure the Gemini and Google API keys
    Auth,

    /// Print the effective configuration
    Config,
}

/// Restore terminal state - called on panic or unexpected exit
fn restore_terminal() {
    use crossterm::{
        event::DisableMouseCapture,
        execute,
        terminal::{disable_raw_mode, LeaveAlternateScreen},
    };
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

/// Log to a file; stdout belongs to the TUI
fn init_logging() {
    let log_dir = paths::logs_dir();
    std::fs::create_dir_all(&log_dir).ok();

    let Ok(log_file) = std::fs::File::create(log_dir.join("perspicacity.log")) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
}

/// Prompt for both keys on stdin. Empty input keeps the stored value.
fn run_auth() -> Result<()> {
    let mut store = CredentialStore::load().context("failed to read credentials")?;
    let stdin = io::stdin();

    println!("Authentication");
    println!();
    println!("Keys are stored in {}", paths::credentials_file().display());
    println!("Press Enter to keep the current value.");
    println!();

    for key in CredentialKey::ALL {
        let state = if store.get(key).is_some() {
            "configured"
        } else {
            "missing"
        };
        print!("{} API key [{}]: ", key.display_name(), state);
        io::stdout().flush()?;

        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        let value = line.trim();
        if !value.is_empty() {
            store.set(key, value);
        }
    }

    store.save().context("failed to save credentials")?;
    match store.first_missing() {
        None => println!("\n✓ Both keys saved"),
        Some(key) => println!("\n⚠ {} API key is still missing", key.display_name()),
    }
    Ok(())
}

fn print_config(config: &ClientConfig) -> Result<()> {
    println!("# {}", paths::config_file().display());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up panic hook to restore terminal state
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    init_logging();

    let cli = Cli::parse();

    let mut config = ClientConfig::load().context("failed to read config.toml")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    tracing::info!("Using answer service at {}", config.base_url);

    match cli.command {
        Some(Commands::Auth) => run_auth()?,
        Some(Commands::Config) => print_config(&config)?,
        Some(Commands::Chat) | None => {
            let credentials = CredentialStore::load().context("failed to read credentials")?;
            let transport = Arc::new(HttpTransport::new(config.clone()));
            let conversation = Conversation::new(&config, transport, credentials);
            let mut app = tui::App::new(conversation);
            app.run().await?;
        }
    }

    Ok(())
}
