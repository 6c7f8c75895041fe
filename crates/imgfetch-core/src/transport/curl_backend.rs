//! libcurl-backed transport.
//!
//! Follows redirects, buffers the body in memory and aborts the transfer
//! from the progress callback once the cancel token is set.

use super::{Response, Transport, TransportError};
use crate::cancel::CancelToken;
use crate::config::TransportConfig;
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    opts: TransportConfig,
}

impl CurlTransport {
    pub fn new(opts: TransportConfig) -> Self {
        Self { opts }
    }
}

impl Transport for CurlTransport {
    fn get(&self, url: &Url, cancel: &CancelToken) -> Result<Response, TransportError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(self.opts.max_redirections)?;
        easy.connect_timeout(self.opts.connect_timeout())?;
        easy.timeout(self.opts.timeout())?;
        if let Some(ua) = &self.opts.user_agent {
            easy.useragent(ua)?;
        }
        // Needed for the progress callback to fire.
        easy.progress(true)?;

        {
            let token = cancel.clone();
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.progress_function(move |_, _, _, _| !token.is_cancelled())?;
            if let Err(e) = transfer.perform() {
                if e.is_aborted_by_callback() && cancel.is_cancelled() {
                    return Err(TransportError::Cancelled);
                }
                return Err(TransportError::Curl(e));
            }
        }

        let status = easy.response_code()?;
        tracing::trace!(status, bytes = body.len(), "GET {} finished", url);
        Ok(Response { status, body })
    }
}
