//! The AI service seam: chat completion, speech-to-text and text-to-speech.
//!
//! Handlers receive a [`SharedAi`] through an axum `Extension`; production wires
//! in [`openai::OpenAiClient`], tests wire in a scripted double.

pub mod openai;
#[cfg(test)]
pub(crate) mod scripted;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type SharedAi = Arc<dyn ChessAi>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged conversation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
    /// Constrain the reply to a single JSON object.
    pub json_output: bool,
}

impl ChatRequest {
    pub fn text(messages: Vec<ChatMessage>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            messages,
            temperature: Some(temperature),
            max_tokens,
            json_output: false,
        }
    }

    pub fn json(messages: Vec<ChatMessage>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            json_output: true,
            ..Self::text(messages, temperature, max_tokens)
        }
    }
}

/// Uploaded audio handed to transcription.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("OpenAI request failed: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),

    #[error("AI service returned an empty response")]
    Empty,

    #[error("AI service unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ChessAi: Send + Sync {
    /// Run a chat completion and return the first choice's text.
    async fn chat(&self, request: ChatRequest) -> Result<String, AiError>;

    async fn transcribe(&self, audio: AudioClip) -> Result<String, AiError>;

    /// Synthesize speech; returns the encoded audio bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AiError>;
}
