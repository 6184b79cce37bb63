//! OpenRouter image generation (Gemini image models).
//!
//! Images arrive under `choices[i].message.images[j].image_url.url`, usually as
//! `data:` URLs. A refused generation carries a safety `native_finish_reason`
//! and no images.

use super::{as_object, check_image_url, decode_list};
use crate::Result;
use serde::Deserialize;
use serde_json::Value;

const SOURCE: &str = "openrouter_image_decoder";

/// Native finish reasons that mean the prompt was refused on policy grounds.
pub const SAFETY_FINISH_REASONS: &[&str] = &[
    "IMAGE_SAFETY",
    "SAFETY",
    "PROHIBITED_CONTENT",
    "IMAGE_PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
];

pub fn is_safety_block(reason: &str) -> bool {
    SAFETY_FINISH_REASONS
        .iter()
        .any(|r| r.eq_ignore_ascii_case(reason.trim()))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedImage {
    pub image_url: ImageUrl,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ImageMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<GeneratedImage>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageChoice {
    #[serde(default)]
    pub native_finish_reason: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub message: Option<ImageMessage>,
}

impl ImageChoice {
    pub fn safety_reason(&self) -> Option<&str> {
        self.native_finish_reason
            .as_deref()
            .filter(|r| is_safety_block(r))
    }

    pub fn first_image_url(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.images.as_deref())
            .and_then(|imgs| imgs.first())
            .map(|img| img.image_url.url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenRouterImageResponse {
    pub choices: Vec<ImageChoice>,
}

/// What an image request produced, when it produced anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Url(String),
    /// Refused for policy reasons; retrying with an adjusted prompt may work.
    SafetyBlocked { reason: String },
}

impl ImageOutcome {
    pub fn is_safety_blocked(&self) -> bool {
        matches!(self, ImageOutcome::SafetyBlocked { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            ImageOutcome::Url(u) => Some(u),
            ImageOutcome::SafetyBlocked { .. } => None,
        }
    }
}

impl OpenRouterImageResponse {
    pub fn decode(payload: &Value) -> Result<Self> {
        let obj = as_object(payload, SOURCE)?;
        let choices: Vec<ImageChoice> = decode_list(obj, "choices", SOURCE)?;

        for (i, choice) in choices.iter().enumerate() {
            let images = choice
                .message
                .as_ref()
                .and_then(|m| m.images.as_deref())
                .unwrap_or_default();
            for (j, img) in images.iter().enumerate() {
                check_image_url(
                    &img.image_url.url,
                    &format!("choices[{}].message.images[{}].image_url.url", i, j),
                    SOURCE,
                )?;
            }
        }

        Ok(Self { choices })
    }

    /// Walk choices in order; the first one that is safety-blocked or carries
    /// an image decides the outcome.
    pub fn outcome(&self) -> Option<ImageOutcome> {
        self.choices.iter().find_map(|choice| {
            if let Some(reason) = choice.safety_reason() {
                return Some(ImageOutcome::SafetyBlocked {
                    reason: reason.to_string(),
                });
            }
            choice
                .first_image_url()
                .map(|u| ImageOutcome::Url(u.to_string()))
        })
    }
}

/// Validate an OpenRouter image payload and pull out its outcome.
///
/// `Ok(None)` means the provider answered but produced no image.
pub fn extract_image_result_a(payload: &Value) -> Result<Option<ImageOutcome>> {
    Ok(OpenRouterImageResponse::decode(payload)?.outcome())
}
