//! Response body handling for guarded calls.

use crate::transport::TransportError;
use crate::{Error, Result};
use serde_json::Value;

const MAX_ERROR_MESSAGE_CHARS: usize = 512;

/// Read a JSON body, turning non-2xx statuses into [`Error::Remote`].
pub(crate) async fn read_json(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Remote {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| Error::Transport(TransportError::Http(e)))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Best-effort human message from an error body.
///
/// Handles `{error: {message}}`, `{error: "..."}` and `{message}`; anything
/// else is returned as truncated text.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let msg = json
            .pointer("/error/message")
            .or_else(|| json.get("error").filter(|v| v.is_string()))
            .or_else(|| json.get("message"))
            .and_then(|v| v.as_str());
        if let Some(m) = msg {
            return m.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_ERROR_MESSAGE_CHARS {
        let mut s: String = trimmed.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
        s.push('…');
        s
    } else {
        trimmed.to_string()
    }
}
