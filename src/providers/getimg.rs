//! GetImg.ai (Flux) image generation.
//!
//! The image may come back as inline base64 (`image`), a top-level `url`, or a
//! list of records (`data[].url`). Extraction checks them in that order.

use super::{as_object, check_image_url, decode_field, decode_list};
use crate::Result;
use serde::Deserialize;
use serde_json::Value;

const SOURCE: &str = "getimg_decoder";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetImgRecord {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GetImgResponse {
    /// Inline base64 image data.
    pub image: Option<String>,
    pub url: Option<String>,
    pub data: Vec<GetImgRecord>,
    pub seed: Option<u64>,
    pub cost: Option<f64>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

impl GetImgResponse {
    pub fn decode(payload: &Value) -> Result<Self> {
        let obj = as_object(payload, SOURCE)?;

        let image = non_empty(decode_field::<String>(obj, "image", "image", SOURCE)?);
        let url = non_empty(decode_field::<String>(obj, "url", "url", SOURCE)?);
        if let Some(u) = &url {
            check_image_url(u, "url", SOURCE)?;
        }

        let data: Vec<GetImgRecord> = match obj.get("data") {
            None | Some(Value::Null) => Vec::new(),
            Some(_) => decode_list(obj, "data", SOURCE)?,
        };
        let data = data
            .into_iter()
            .map(|r| GetImgRecord {
                url: non_empty(r.url),
            })
            .collect::<Vec<_>>();
        for (i, record) in data.iter().enumerate() {
            if let Some(u) = &record.url {
                check_image_url(u, &format!("data[{}].url", i), SOURCE)?;
            }
        }

        Ok(Self {
            image,
            url,
            data,
            seed: decode_field(obj, "seed", "seed", SOURCE)?,
            cost: decode_field(obj, "cost", "cost", SOURCE)?,
        })
    }

    /// `image`, then `url`, then `data[0].url`.
    pub fn best_image(&self) -> Option<&str> {
        self.image
            .as_deref()
            .or(self.url.as_deref())
            .or_else(|| self.data.first().and_then(|r| r.url.as_deref()))
    }
}

/// Validate a GetImg payload and return the highest-priority image reference.
///
/// `Ok(None)` means no image field was present.
pub fn extract_image_result_b(payload: &Value) -> Result<Option<String>> {
    Ok(GetImgResponse::decode(payload)?
        .best_image()
        .map(str::to_owned))
}
