//! GemChat - Gemini chat CLI library
//!
//! This library provides the core functionality for the GemChat client,
//! including the Gemini conversation handle, transcript persistence,
//! retry handling, response rendering, and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `providers`: Conversation abstraction and the Gemini implementation
//! - `transcript`: JSON session store (save, load, list, rename, delete, import)
//! - `retry`: Exponential backoff with jitter around fallible async calls
//! - `fetch`: One round trip through a conversation handle
//! - `render`: Fenced-code-aware response rendering
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use gemchat::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml")?;
//!     config.validate()?;
//!
//!     // Conversation usage would go here
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetch;
pub mod providers;
pub mod render;
pub mod retry;
pub mod transcript;

// Re-export commonly used types
pub use config::Config;
pub use error::{GemChatError, Result};
pub use providers::{map_role, Conversation, Message, Reply};
pub use transcript::{SessionRecord, SessionSummary, TranscriptStore};
