//! Relay function wire format.
//!
//! A relay accepts `{"url": ...}` and answers `{"contentType": ..., "data": <base64>}`
//! or `{"error": ...}`. The client side lives in the proxy race; [`serve`] is the
//! server-side pass-through used by the binary's relay endpoint.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::{FetchRequest, Fetcher};
use crate::{FailureKind, FetchError};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelayRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayReply {
    Image {
        #[serde(rename = "contentType")]
        content_type: Option<String>,
        data: String,
    },
    Error {
        error: String,
    },
}

impl RelayReply {
    pub fn error(message: impl Into<String>) -> Self {
        RelayReply::Error {
            error: message.into(),
        }
    }
}

/// Decoded relay payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayPayload {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayServeError {
    #[error("URL is required")]
    MissingUrl,
    #[error("{0}")]
    Upstream(#[from] FetchError),
}

pub(crate) fn request(endpoint: &str, target: &str) -> Result<FetchRequest, FetchError> {
    let body = serde_json::to_vec(&RelayRequest {
        url: Some(target.to_string()),
    })
    .map_err(|err| FetchError::new(FailureKind::Relay, err.to_string()))?;
    Ok(FetchRequest::post_json(endpoint, body))
}

pub fn decode_reply(body: &[u8]) -> Result<RelayPayload, FetchError> {
    let reply: RelayReply = serde_json::from_slice(body)
        .map_err(|err| FetchError::new(FailureKind::Relay, format!("malformed reply: {err}")))?;
    match reply {
        RelayReply::Image { content_type, data } => {
            let bytes = STANDARD
                .decode(data.as_bytes())
                .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
            Ok(RelayPayload {
                bytes: Bytes::from(bytes),
                content_type,
            })
        }
        RelayReply::Error { error } => Err(FetchError::new(FailureKind::Relay, error)),
    }
}

/// Fetches the requested URL once and re-encodes the body for the wire.
pub async fn serve(
    fetcher: &dyn Fetcher,
    request: RelayRequest,
) -> Result<RelayReply, RelayServeError> {
    let url = request
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or(RelayServeError::MissingUrl)?;
    let output = fetcher.fetch(FetchRequest::get(url)).await?;
    Ok(RelayReply::Image {
        content_type: output.content_type,
        data: STANDARD.encode(&output.bytes),
    })
}
