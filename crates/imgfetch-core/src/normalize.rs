//! Identifier normalization shared by the fetcher and any cache reader.
//!
//! The fetcher persists blobs under `normalize_key(identifier)`; a reader
//! looking for the same resource must use this exact function or it will
//! never hit.

/// Path separator stripped from identifiers.
pub const SEPARATOR: char = '/';

/// Derives the cache key for an identifier by removing every `/`.
pub fn normalize_key(identifier: &str) -> String {
    identifier.replace(SEPARATOR, "")
}
