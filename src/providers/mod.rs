//! 供应商响应解码 — 每种响应结构一个解码器，提取结果或返回带字段路径的校验错误
//!
//! Provider response decoders and extractors.
//!
//! Each upstream returns its own JSON shape. Every shape has one decoder that
//! turns the raw payload into typed structs or fails with
//! [`Error::Validation`] naming the offending field. Extraction then works on
//! the typed value, so "no output" outcomes are plain values:
//!
//! | Shape | Decoder | Extractor | Empty outcome |
//! |-------|---------|-----------|---------------|
//! | chat completion | [`ChatCompletion::decode`] | [`extract_chat_content`] | [`Error::EmptyChoices`] |
//! | OpenRouter image | [`OpenRouterImageResponse::decode`] | [`extract_image_result_a`] | `None` / [`ImageOutcome::SafetyBlocked`] |
//! | GetImg image | [`GetImgResponse::decode`] | [`extract_image_result_b`] | `None` |

pub mod chat;
pub mod getimg;
pub mod openrouter;

pub use chat::{extract_chat_content, ChatChoice, ChatCompletion, ChatMessage};
pub use getimg::{extract_image_result_b, GetImgResponse};
pub use openrouter::{extract_image_result_a, ImageOutcome, OpenRouterImageResponse};

use crate::{Error, ErrorContext, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Which decoder a payload goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Chat,
    OpenRouterImage,
    GetImg,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Chat => "chat",
            ProviderKind::OpenRouterImage => "openrouter-image",
            ProviderKind::GetImg => "getimg",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(ProviderKind::Chat),
            "openrouter-image" | "openrouter" => Ok(ProviderKind::OpenRouterImage),
            "getimg" => Ok(ProviderKind::GetImg),
            other => Err(Error::configuration_with_context(
                format!("unknown provider kind '{}'", other),
                ErrorContext::new()
                    .with_details("expected one of: chat, openrouter-image, getimg")
                    .with_source("provider_kind"),
            )),
        }
    }
}

/// A decoded upstream payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse {
    Chat(ChatCompletion),
    OpenRouterImage(OpenRouterImageResponse),
    GetImg(GetImgResponse),
}

impl ProviderResponse {
    pub fn decode(kind: ProviderKind, payload: &Value) -> Result<Self> {
        Ok(match kind {
            ProviderKind::Chat => ProviderResponse::Chat(ChatCompletion::decode(payload)?),
            ProviderKind::OpenRouterImage => {
                ProviderResponse::OpenRouterImage(OpenRouterImageResponse::decode(payload)?)
            }
            ProviderKind::GetImg => ProviderResponse::GetImg(GetImgResponse::decode(payload)?),
        })
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderResponse::Chat(_) => ProviderKind::Chat,
            ProviderResponse::OpenRouterImage(_) => ProviderKind::OpenRouterImage,
            ProviderResponse::GetImg(_) => ProviderKind::GetImg,
        }
    }
}

fn violation(message: impl Into<String>, path: &str, source: &str) -> Error {
    Error::validation_with_context(
        message,
        ErrorContext::new().with_field_path(path).with_source(source),
    )
}

fn as_object<'a>(payload: &'a Value, source: &str) -> Result<&'a Map<String, Value>> {
    payload.as_object().ok_or_else(|| {
        violation(
            format!("expected a JSON object, got {}", type_name(payload)),
            "$",
            source,
        )
    })
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode `obj[field]` as `T`. Absent and `null` both decode to `None`.
fn decode_field<T: DeserializeOwned>(
    obj: &Map<String, Value>,
    field: &str,
    path: &str,
    source: &str,
) -> Result<Option<T>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => T::deserialize(v)
            .map(Some)
            .map_err(|e| violation(e.to_string(), path, source)),
    }
}

/// Decode a required array field element by element, so failures point at
/// the element index.
fn decode_list<T: DeserializeOwned>(
    obj: &Map<String, Value>,
    field: &str,
    source: &str,
) -> Result<Vec<T>> {
    let items = match obj.get(field) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(violation(
                format!("expected an array, got {}", type_name(other)),
                field,
                source,
            ))
        }
        None => return Err(violation("missing required array", field, source)),
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            T::deserialize(item)
                .map_err(|e| violation(e.to_string(), &format!("{}[{}]", field, i), source))
        })
        .collect()
}

/// Image references must be absolute `http`, `https` or `data` URLs.
fn check_image_url(raw: &str, path: &str, source: &str) -> Result<()> {
    match url::Url::parse(raw) {
        Ok(u) if matches!(u.scheme(), "http" | "https" | "data") => Ok(()),
        Ok(u) => Err(violation(
            format!("unsupported url scheme '{}'", u.scheme()),
            path,
            source,
        )),
        Err(e) => Err(violation(format!("malformed url: {}", e), path, source)),
    }
}
