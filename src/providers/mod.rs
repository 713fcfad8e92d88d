//! Provider module for GemChat
//!
//! This module contains the conversation abstraction and the Gemini
//! implementation behind it.

pub mod base;
pub mod gemini;

pub use base::{map_role, Conversation, Message, Reply};
pub use gemini::GeminiConversation;

use crate::config::Config;
use crate::error::Result;

/// Start a conversation seeded with the configured greeting
///
/// The greeting turn carries the provider's internal `model` role, the
/// same tag the API reports for its own replies.
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `seed` - Prior turns to resume from; when empty, the greeting opens
///   the history
///
/// # Errors
///
/// Returns error if the provider handle cannot be initialized
pub fn start_conversation(config: &Config, seed: Vec<Message>) -> Result<Box<dyn Conversation>> {
    let history = if seed.is_empty() {
        vec![Message::model(config.chat.greeting.clone())]
    } else {
        seed
    };

    Ok(Box::new(GeminiConversation::new(
        config.gemini.clone(),
        history,
    )?))
}
