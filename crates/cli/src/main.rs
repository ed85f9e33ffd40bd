//! Agentic Chat CLI - talk to the shopping assistant from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Ask a question using settings from the environment / .env
//! agentic-chat ask "show me blue mugs"
//!
//! # Same, with a JSON host configuration and HTML output
//! agentic-chat --config widget.json ask --html "what's in my cart?"
//!
//! # Fetch and print the current context token
//! agentic-chat token
//! ```
//!
//! # Commands
//!
//! - `ask` - Send one message and print the replies
//! - `token` - Fetch the shopper's context token
//!
//! # Environment Variables
//!
//! - `AGENTIC_CHAT_*` - Widget settings when `--config` is not given
//! - `SENTRY_DSN` - Enables error reporting when set
//! - `SENTRY_ENVIRONMENT` - Environment tag for Sentry events

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use agentic_chat_widget::HostConfig;
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "agentic-chat")]
#[command(author, version, about = "Agentic Chat command line client")]
struct Cli {
    /// JSON host configuration file (defaults to `AGENTIC_CHAT_*` variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message and print the assistant's replies
    Ask {
        /// Message text; multiple words are joined with spaces
        #[arg(required = true)]
        message: Vec<String>,

        /// Print HTML fragments instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Fetch the context token and print it
    Token,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
///
/// Returns `None` when no DSN is configured.
fn init_sentry(dsn: Option<String>) -> Option<sentry::ClientInitGuard> {
    let dsn = dsn.filter(|v| !v.trim().is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Log a failed command and map the outcome to a process exit status.
fn exit_status(result: Result<(), Box<dyn std::error::Error>>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            1
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Pick up SENTRY_DSN and AGENTIC_CHAT_* from .env before anything reads them
    let _ = dotenvy::dotenv();

    // Dropped at the end of main, which flushes pending Sentry events
    let sentry_guard = init_sentry(std::env::var("SENTRY_DSN").ok());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agentic_chat_widget=info,agentic_chat_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if sentry_guard.is_some() {
        tracing::info!("Sentry initialized");
    }

    let cli = Cli::parse();
    let status = exit_status(run(cli).await);

    drop(sentry_guard);
    ExitCode::from(status)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let host = match &cli.config {
        Some(path) => HostConfig::from_file(path)?,
        None => HostConfig::from_env()?,
    };

    match cli.command {
        Commands::Ask { message, html } => {
            commands::ask::run(&host, &message.join(" "), html).await?;
        }
        Commands::Token => commands::token::run(&host).await?,
    }
    Ok(())
}
