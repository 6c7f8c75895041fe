//! Body of a background fetch: locate, retrieve, check cancellation, persist.

use std::fmt;
use std::sync::Arc;

use url::Url;

use super::Inner;
use crate::cancel::CancelToken;
use crate::normalize::normalize_key;
use crate::transport::TransportError;

/// How a background fetch ended. Only logged; never surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Outcome {
    Stored { bytes: usize },
    Malformed,
    TransportFailed,
    Cancelled,
    Rejected { status: u32 },
    WriteFailed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Stored { bytes } => write!(f, "stored {} bytes", bytes),
            Outcome::Malformed => write!(f, "malformed identifier"),
            Outcome::TransportFailed => write!(f, "transport failed"),
            Outcome::Cancelled => write!(f, "cancelled"),
            Outcome::Rejected { status } => write!(f, "HTTP {}", status),
            Outcome::WriteFailed => write!(f, "store write failed"),
        }
    }
}

/// Parse an identifier as an http(s) locator.
pub(super) fn parse_locator(identifier: &str) -> Option<Url> {
    Url::parse(identifier)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

pub(super) async fn run_fetch(inner: &Arc<Inner>, identifier: &str, token: &CancelToken) -> Outcome {
    let Some(url) = parse_locator(identifier) else {
        return Outcome::Malformed;
    };

    let transport = Arc::clone(&inner.transport);
    let transfer_token = token.clone();
    let response = match tokio::task::spawn_blocking(move || transport.get(&url, &transfer_token)).await {
        Ok(Ok(response)) => response,
        Ok(Err(TransportError::Cancelled)) => return Outcome::Cancelled,
        Ok(Err(e)) => {
            tracing::debug!("transport error: {}", e);
            return Outcome::TransportFailed;
        }
        Err(e) => {
            tracing::debug!("transport task failed: {}", e);
            return Outcome::TransportFailed;
        }
    };

    if token.is_cancelled() {
        return Outcome::Cancelled;
    }
    if !response.is_success() {
        return Outcome::Rejected {
            status: response.status,
        };
    }

    // A cancel landing between the check above and this write is not caught.
    let key = normalize_key(identifier);
    let bytes = response.body.len();
    let store = Arc::clone(&inner.store);
    let namespace = inner.namespace.clone();
    match tokio::task::spawn_blocking(move || store.write(&namespace, &key, &response.body)).await {
        Ok(Ok(())) => Outcome::Stored { bytes },
        Ok(Err(e)) => {
            tracing::warn!("cache write failed: {}", e);
            Outcome::WriteFailed
        }
        Err(e) => {
            tracing::warn!("cache write task failed: {}", e);
            Outcome::WriteFailed
        }
    }
}
