//! Gemini conversation implementation for GemChat
//!
//! This module implements the Conversation trait against the Gemini
//! `generateContent` endpoint. The handle accumulates history locally
//! and posts the full transcript with each request, so conversation
//! state lives entirely inside the handle.

use crate::config::GeminiConfig;
use crate::error::{GemChatError, Result};
use crate::providers::{Conversation, Message, Reply};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;

/// Default public API base
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini API conversation handle
///
/// Created through [`crate::providers::start_conversation`]. Each `send`
/// posts the accumulated history plus the new user turn and appends both
/// the user turn and the model reply on success.
pub struct GeminiConversation {
    client: Client,
    config: GeminiConfig,
    history: RwLock<Vec<Message>>,
}

/// Request structure for the generateContent endpoint
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// A single turn in Gemini wire format
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// Text-bearing part of a turn
#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

/// System instruction in wire format (role is not sent)
#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

/// Sampling parameters for a request
#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Response structure from the generateContent endpoint
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

/// A reply candidate
#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

impl GeminiConversation {
    /// Create a new conversation handle
    ///
    /// # Arguments
    ///
    /// * `config` - Gemini configuration (key, model, sampling options)
    /// * `history` - Seed turns (e.g. a greeting), in conversation order
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig, history: Vec<Message>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("gemchat/0.2.0")
            .build()
            .map_err(|e| GemChatError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Gemini conversation: model={}", config.model);

        Ok(Self {
            client,
            config,
            history: RwLock::new(history),
        })
    }

    /// Endpoint URL for the configured model
    fn endpoint(&self) -> String {
        let base = self
            .config
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        format!(
            "{}/v1beta/models/{}:generateContent",
            base, self.config.model
        )
    }

    /// Build the wire request from history plus the pending user turn
    fn build_request(&self, user_text: &str) -> Result<GeminiRequest> {
        let history = self.history.read().map_err(|_| {
            GemChatError::Provider("Failed to acquire read lock on history".to_string())
        })?;

        let mut contents: Vec<GeminiContent> = history
            .iter()
            .map(|m| GeminiContent {
                role: m.role.clone(),
                parts: vec![GeminiPart {
                    text: Some(m.content.clone()),
                }],
            })
            .collect();

        contents.push(GeminiContent {
            role: "user".to_string(),
            parts: vec![GeminiPart {
                text: Some(user_text.to_string()),
            }],
        });

        let system_instruction =
            self.config
                .system_prompt
                .as_ref()
                .map(|prompt| GeminiSystemInstruction {
                    parts: vec![GeminiPart {
                        text: Some(prompt.clone()),
                    }],
                });

        let generation_config =
            if self.config.temperature.is_some() || self.config.max_output_tokens.is_some() {
                Some(GenerationConfig {
                    temperature: self.config.temperature,
                    max_output_tokens: self.config.max_output_tokens,
                })
            } else {
                None
            };

        Ok(GeminiRequest {
            contents,
            system_instruction,
            generation_config,
        })
    }
}

/// Join the text parts of the first candidate, if any
fn extract_reply_text(response: &GeminiResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let collected: Vec<&str> = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .filter(|t| !t.is_empty())
        .collect();

    if collected.is_empty() {
        None
    } else {
        Some(collected.join("\n"))
    }
}

#[async_trait]
impl Conversation for GeminiConversation {
    async fn send(&self, text: &str) -> Result<Reply> {
        let url = self.endpoint();
        let api_key = self
            .config
            .api_key
            .clone()
            .ok_or_else(|| GemChatError::MissingCredentials("gemini".to_string()))?;

        let request = self.build_request(text)?;
        tracing::debug!(
            "Sending Gemini request: {} turns, model={}",
            request.contents.len(),
            self.config.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                GemChatError::Provider(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(GemChatError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            GemChatError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        let reply_text = extract_reply_text(&gemini_response);
        tracing::debug!(
            "Gemini response received: {} candidates, text={}",
            gemini_response.candidates.len(),
            reply_text.is_some()
        );

        // Only a successful round trip mutates history, so a failed send
        // can be retried without duplicating the user turn.
        let mut history = self.history.write().map_err(|_| {
            GemChatError::Provider("Failed to acquire write lock on history".to_string())
        })?;
        history.push(Message::user(text));
        history.push(Message::model(reply_text.clone().unwrap_or_default()));

        Ok(Reply { text: reply_text })
    }

    fn history(&self) -> Vec<Message> {
        self.history
            .read()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}
