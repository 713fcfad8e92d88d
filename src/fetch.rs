//! Response fetching for GemChat
//!
//! One synchronous-feeling step of the chat round trip: send the user
//! message through the conversation handle and hand back the reply text.
//! There is no state machine here; conversation history lives entirely
//! in the handle. Failures propagate unchanged so callers can wrap the
//! fetch with the retry layer.

use crate::error::Result;
use crate::providers::Conversation;

/// Send a user message and return the reply's text content
///
/// Returns the empty string when the reply carries no text.
///
/// # Arguments
///
/// * `conversation` - Active conversation handle
/// * `user_text` - The user's message
///
/// # Errors
///
/// Returns error if the underlying send fails
pub async fn fetch_reply(conversation: &dyn Conversation, user_text: &str) -> Result<String> {
    let reply = conversation.send(user_text).await?;
    let text = reply.text_or_empty();
    tracing::debug!("Fetched reply: {} chars", text.len());
    Ok(text)
}
