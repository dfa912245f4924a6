//! Hook input and conversation turn types.
//!
//! The hook receives one JSON object on stdin. Only `prompt` is required;
//! prior turns may arrive under `conversationHistory` or the legacy keys
//! `messages` and `history` (first present wins). Input is read leniently:
//! malformed turns are skipped instead of failing the whole request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Keys that may carry the conversation history, in lookup order.
pub const HISTORY_KEYS: [&str; 3] = ["conversationHistory", "messages", "history"];

/// A single prior turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub content: String,
}

impl ConversationTurn {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Build a turn from an arbitrary JSON value.
    ///
    /// Returns `None` for anything that is not an object with a `content`
    /// field. Non-string content is kept as its JSON text.
    pub fn from_value(value: &Value) -> Option<Self> {
        let content = value.as_object()?.get("content")?;
        Some(Self::new(stringify(content)))
    }
}

/// The parsed hook request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookInput {
    pub prompt: String,
    pub history: Vec<ConversationTurn>,
}

impl HookInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    /// Parse raw stdin text. Invalid JSON or a non-object yields an empty input.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                debug!(error = %e, "Hook input is not valid JSON, treating as empty");
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let prompt = match object.get("prompt") {
            None | Some(Value::Null) => String::new(),
            Some(v) => stringify(v),
        };

        let history = HISTORY_KEYS
            .iter()
            .find_map(|key| object.get(*key))
            .and_then(Value::as_array)
            .map(|turns| turns.iter().filter_map(ConversationTurn::from_value).collect())
            .unwrap_or_default();

        Self { prompt, history }
    }

    pub fn is_empty(&self) -> bool {
        self.prompt.is_empty()
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
