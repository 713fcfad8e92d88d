//! Command-line interface definition for GemChat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat and transcript management.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// GemChat - Interactive Gemini chat client
///
/// Chat with a Gemini model from the terminal and keep transcripts
/// as JSON files on local disk.
#[derive(Parser, Debug, Clone)]
#[command(name = "gemchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Override the session storage directory
    #[arg(long, env = "GEMCHAT_HISTORY_DIR")]
    pub history_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for GemChat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start interactive chat mode
    Chat {
        /// Resume a saved session by id
        #[arg(short, long)]
        resume: Option<String>,
    },

    /// Manage saved chat sessions
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// Session management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved sessions
    List,

    /// Print a saved session transcript
    Show {
        /// Session id
        id: String,
    },

    /// Delete a saved session
    Delete {
        /// Session id
        id: String,
    },

    /// Rename a saved session
    Rename {
        /// Session id
        id: String,

        /// New title
        title: String,
    },

    /// Import a transcript from a JSON document with a `messages` key
    Import {
        /// Path to the JSON document
        file: PathBuf,

        /// Title for the imported session
        #[arg(short, long, default_value = "Imported chat")]
        title: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
