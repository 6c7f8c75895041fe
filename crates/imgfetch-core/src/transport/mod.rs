//! Network retrieval seam.
//!
//! The fetcher only needs "give me status and bytes for this locator, or
//! fail". Transports are blocking; the fetcher drives them from
//! `spawn_blocking`.

mod curl_backend;

pub use curl_backend::CurlTransport;

use crate::cancel::CancelToken;
use url::Url;

/// A completed HTTP exchange. The body is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u32,
    pub body: Vec<u8>,
}

impl Response {
    /// True for 200..=299.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// libcurl reported an error (DNS, connect, timeout, protocol).
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    /// The transfer stopped because its cancel token was set.
    #[error("transfer cancelled")]
    Cancelled,
}

/// Blocking GET of a locator. Implementations should poll `cancel` while
/// the transfer is running and return [`TransportError::Cancelled`] when it
/// is set.
pub trait Transport: Send + Sync + 'static {
    fn get(&self, url: &Url, cancel: &CancelToken) -> Result<Response, TransportError>;
}
