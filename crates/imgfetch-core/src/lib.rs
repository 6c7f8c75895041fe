//! imgfetch core: deduplicated background fetching into a namespaced disk
//! cache, for image views that render from cache and prefetch on a miss.

pub mod config;
pub mod logging;

pub mod cancel;
pub mod checksum;
pub mod fetcher;
pub mod normalize;
pub mod store;
pub mod transport;

pub use fetcher::{Fetcher, FetcherError, Priority};
pub use normalize::normalize_key;
