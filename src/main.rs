//! GemChat - Interactive Gemini chat CLI
//!
#![doc = "GemChat - Interactive Gemini chat CLI"]
#![doc = "Main entry point for the GemChat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gemchat::cli::{Cli, Commands};
use gemchat::commands;
use gemchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // If the user supplied a history directory on the CLI (or via env),
    // mirror it into GEMCHAT_HISTORY_DIR so the store initializer can
    // pick it up. This keeps callers unchanged while allowing
    // `TranscriptStore::new()` to honor an override.
    if let Some(dir) = &cli.history_dir {
        std::env::set_var("GEMCHAT_HISTORY_DIR", dir);
        tracing::info!("Using history directory override from CLI: {}", dir);
    }

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Execute command
    match cli.command {
        Commands::Chat { resume } => {
            // Chat talks to the API, so credentials must be in place
            config.validate()?;
            if let Some(r) = &resume {
                tracing::debug!("Resuming session: {}", r);
            }
            commands::chat::run_chat(config, resume).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "gemchat=debug" } else { "gemchat=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
