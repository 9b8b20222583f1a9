//! Text-generation capability.
//!
//! Defines the [`TextGeneration`] trait that all chat backends implement.
//! Concrete HTTP backends (OpenAI, Gemini, Ollama) live in the `nutriscan`
//! app crate; this crate only describes the request shape.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::models::{ConversationTurn, Role};

/// Sampling temperature for single-shot analysis prompts.
pub const ANALYSIS_TEMPERATURE: f32 = 0.7;
/// Sampling temperature for free chat.
pub const CHAT_TEMPERATURE: f32 = 0.8;

/// A single message sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

/// One outbound "generate text" call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    /// Provider-specific parameters (e.g. `api_base`).
    pub extra: BTreeMap<String, String>,
}

/// Trait for text-generation backends.
///
/// Implementations perform one blocking call per [`generate`](Self::generate)
/// and may fail for any reason (network, auth, backend error). Callers do not
/// distinguish failure causes.
pub trait TextGeneration: Send + Sync {
    /// Short backend identifier for logs (e.g. `"openai"`).
    fn name(&self) -> &str;

    /// Generate a completion for the request's messages.
    fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
