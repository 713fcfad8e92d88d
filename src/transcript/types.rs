use crate::providers::Message;
use serde::{Deserialize, Serialize};

/// One persisted chat session
///
/// This is the exact structure written to `{id}.json` in the store
/// directory: a title, a human-readable timestamp, and the ordered
/// message list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    /// Session title
    pub title: String,
    /// Human-readable creation/update timestamp (`YYYY-MM-DD HH:MM:SS`)
    pub timestamp: String,
    /// Ordered conversation turns
    pub messages: Vec<Message>,
}

impl Default for SessionRecord {
    /// The record returned for an id that does not exist in the store
    fn default() -> Self {
        Self {
            title: "Chat".to_string(),
            timestamp: String::new(),
            messages: Vec::new(),
        }
    }
}

/// Listing entry for a stored session
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// Session id (file stem)
    pub id: String,
    /// Session title
    pub title: String,
    /// Last-written timestamp
    pub timestamp: String,
    /// Number of messages in the transcript
    pub message_count: usize,
}
