//! The conversational nutrition assistant.
//!
//! [`NutritionAssistant`] turns high-level intents into a single
//! [`GenerationRequest`] and folds the outcome into a [`Reply`] the caller
//! can always display.
//!
//! # Operations
//!
//! | Operation | Temperature | Touches history |
//! |-----------|-------------|-----------------|
//! | [`analyze_product`](NutritionAssistant::analyze_product) | 0.7 | no |
//! | [`suggest_alternatives`](NutritionAssistant::suggest_alternatives) | 0.7 | no |
//! | [`chat`](NutritionAssistant::chat) | 0.8 | yes |
//!
//! # History
//!
//! History is append-only. A successful `chat` appends the user turn and
//! the assistant turn; a failed one keeps only the user turn, so the next
//! call still sees it. Nothing is ever removed. A [`HistoryWindow`] can cap
//! how many recent turns are *sent* to the backend without touching what is
//! stored.

use std::fmt;

use crate::generation::{
    ChatMessage, GenerationRequest, TextGeneration, ANALYSIS_TEMPERATURE, CHAT_TEMPERATURE,
};
use crate::models::{ConversationTurn, ProductInfo, Role};
use crate::prompt;
use crate::provider::{resolve_provider, ProviderConfig, ProviderSettings};

/// Prefix that marks a failed reply.
pub const ERROR_MARKER: &str = "❌";

/// Outcome of an assistant operation.
///
/// Both variants carry displayable text, so callers that only want to show
/// something can use [`text`](Reply::text) or `Display` without branching.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Answer(String),
    Failed(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Answer(t) | Reply::Failed(t) => t,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Reply::Failed(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// How much of the stored history is dispatched on each chat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryWindow {
    /// Send every stored turn.
    #[default]
    Unbounded,
    /// Send at most the `n` most recent turns, starting at a user turn.
    Recent(usize),
}

/// Nutrition assistant bound to one resolved provider.
pub struct NutritionAssistant {
    config: ProviderConfig,
    backend: Box<dyn TextGeneration>,
    history: Vec<ConversationTurn>,
    window: HistoryWindow,
}

impl NutritionAssistant {
    /// Create an assistant for an already resolved provider.
    pub fn new(config: ProviderConfig, backend: Box<dyn TextGeneration>) -> Self {
        Self {
            config,
            backend,
            history: Vec::new(),
            window: HistoryWindow::default(),
        }
    }

    /// Resolve `settings` and create an assistant.
    pub fn from_settings(settings: &ProviderSettings, backend: Box<dyn TextGeneration>) -> Self {
        Self::new(resolve_provider(settings), backend)
    }

    pub fn with_history_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }

    pub fn provider_config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Three-part analysis of a single product. Stateless.
    pub fn analyze_product(&self, product: &ProductInfo) -> Reply {
        let messages = vec![ChatMessage::user(prompt::analysis_prompt(product))];
        match self.dispatch(messages, ANALYSIS_TEMPERATURE) {
            Ok(text) => Reply::Answer(text),
            Err(e) => Reply::Failed(format!("{} Analysis error: {:#}", ERROR_MARKER, e)),
        }
    }

    /// Short justification of why the first three candidates beat `product`.
    /// Extra candidates are ignored. Stateless.
    pub fn suggest_alternatives(&self, product: &ProductInfo, candidates: &[ProductInfo]) -> Reply {
        let messages = vec![ChatMessage::user(prompt::alternatives_prompt(
            product, candidates,
        ))];
        match self.dispatch(messages, ANALYSIS_TEMPERATURE) {
            Ok(text) => Reply::Answer(text),
            Err(e) => Reply::Failed(format!("{} Error: {:#}", ERROR_MARKER, e)),
        }
    }

    /// Send a message in the running conversation.
    ///
    /// `context`, when non-empty, is prepended to the stored user turn.
    pub fn chat(&mut self, message: &str, context: &str) -> Reply {
        self.history.push(ConversationTurn::new(
            Role::User,
            prompt::chat_user_content(message, context),
        ));

        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(ChatMessage::system(prompt::SYSTEM_INSTRUCTION));
        messages.extend(self.dispatched_turns().iter().map(ChatMessage::from));

        match self.dispatch(messages, CHAT_TEMPERATURE) {
            Ok(text) => {
                self.history
                    .push(ConversationTurn::new(Role::Assistant, text.clone()));
                Reply::Answer(text)
            }
            Err(e) => Reply::Failed(format!("{} Error: {:#}", ERROR_MARKER, e)),
        }
    }

    fn dispatched_turns(&self) -> &[ConversationTurn] {
        match self.window {
            HistoryWindow::Unbounded => &self.history,
            HistoryWindow::Recent(n) => {
                let start = self.history.len().saturating_sub(n);
                let window = &self.history[start..];
                let first_user = window
                    .iter()
                    .position(|turn| turn.role == Role::User)
                    .unwrap_or(window.len());
                &window[first_user..]
            }
        }
    }

    fn dispatch(&self, messages: Vec<ChatMessage>, temperature: f32) -> anyhow::Result<String> {
        let request = GenerationRequest {
            model: self.config.model.clone(),
            messages,
            temperature,
            extra: self.config.extra.clone(),
        };

        tracing::debug!(
            backend = self.backend.name(),
            model = %request.model,
            messages = request.messages.len(),
            temperature,
            "dispatching generation request"
        );

        self.backend.generate(&request).map_err(|e| {
            tracing::warn!(backend = self.backend.name(), error = %e, "generation failed");
            e
        })
    }
}
