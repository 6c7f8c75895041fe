//! `imgfetch key <url>` – print the normalized cache key.

use anyhow::Result;
use imgfetch_core::normalize_key;

pub fn run_key(url: &str) -> Result<()> {
    println!("{}", normalize_key(url));
    Ok(())
}
