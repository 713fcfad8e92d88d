//! Base conversation trait and common types for GemChat
//!
//! This module defines the Conversation trait that provider
//! implementations satisfy, along with the message and reply types
//! shared by the chat surface and the transcript store.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message structure for conversation turns
///
/// Represents a single turn, either from the user or from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant, or the provider's
    /// internal `model` tag)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use gemchat::providers::Message;
    ///
    /// let msg = Message::user("Hello!");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    ///
    /// # Examples
    ///
    /// ```
    /// use gemchat::providers::Message;
    ///
    /// let msg = Message::assistant("Hello, user!");
    /// assert_eq!(msg.role, "assistant");
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// Creates a message carrying the provider's internal `model` role
    ///
    /// Gemini reports assistant turns with role `model`; conversation
    /// history keeps that tag and [`map_role`] translates it for display
    /// and persistence.
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            content: content.into(),
        }
    }
}

/// Reply returned by a conversation send
///
/// The text is optional because the API may return a candidate with no
/// text parts (e.g. a safety-blocked reply).
#[derive(Debug, Clone, Default)]
pub struct Reply {
    /// Text content of the reply, if any
    pub text: Option<String>,
}

impl Reply {
    /// Reply text, or the empty string when the reply carries none
    pub fn text_or_empty(&self) -> String {
        self.text.clone().unwrap_or_default()
    }
}

/// Translate the provider's internal speaker tag to the UI-facing label
///
/// `"model"` maps to `"assistant"`; every other input passes through
/// unchanged, including `"user"`.
///
/// # Examples
///
/// ```
/// use gemchat::providers::map_role;
///
/// assert_eq!(map_role("model"), "assistant");
/// assert_eq!(map_role("user"), "user");
/// ```
pub fn map_role(role: &str) -> &str {
    if role == "model" {
        "assistant"
    } else {
        role
    }
}

/// An ongoing exchange with a remote model
///
/// The conversation owns its history: each `send` appends the user turn
/// and the model's reply. Callers treat the handle as opaque state; the
/// spec-level "response fetcher" is a single `send` with text
/// extraction layered on top.
///
/// `send` takes `&self` so a failed call can be repeated through the
/// retry wrapper without threading a mutable borrow through it; history
/// lives behind interior mutability in implementations.
#[async_trait]
pub trait Conversation: Send + Sync {
    /// Send a user message and await the model's reply
    ///
    /// On success the user turn and the reply are both part of
    /// `history()`. On failure the history is left unchanged so the
    /// call can be retried safely.
    async fn send(&self, text: &str) -> Result<Reply>;

    /// All prior turns, in conversation order
    fn history(&self) -> Vec<Message>;
}
