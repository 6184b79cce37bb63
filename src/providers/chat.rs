//! Chat-completion payloads (Grok, OpenRouter text models).
//!
//! `{ choices: [{ message: { content: "..." }, finish_reason }], model }`

use super::{as_object, decode_field, decode_list};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

const SOURCE: &str = "chat_decoder";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub choices: Vec<ChatChoice>,
    pub model: Option<String>,
}

impl ChatCompletion {
    pub fn decode(payload: &Value) -> Result<Self> {
        let obj = as_object(payload, SOURCE)?;
        Ok(Self {
            choices: decode_list(obj, "choices", SOURCE)?,
            model: decode_field(obj, "model", "model", SOURCE)?,
        })
    }

    /// Content of the first choice.
    pub fn first_content(&self) -> Result<&str> {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| Error::EmptyChoices {
                provider: self.model.clone().unwrap_or_else(|| "chat".to_string()),
            })
    }
}

/// Validate a chat payload and return the first choice's text.
pub fn extract_chat_content(payload: &Value) -> Result<String> {
    ChatCompletion::decode(payload)?
        .first_content()
        .map(str::to_owned)
}
