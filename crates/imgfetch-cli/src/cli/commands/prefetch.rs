//! `imgfetch prefetch <url>...` – warm the cache for a list of URLs.

use anyhow::Result;
use imgfetch_core::{normalize_key, Priority};
use std::collections::BTreeSet;

use crate::cli::App;

pub async fn run_prefetch(app: &App, urls: &[String], priority: Priority) -> Result<()> {
    for url in urls {
        app.fetcher.fetch_with_priority(url, priority);
    }
    app.fetcher.wait_idle().await;

    let unique: BTreeSet<&str> = urls.iter().map(String::as_str).collect();
    let mut cached = 0usize;
    for url in &unique {
        if app.cached_path(&normalize_key(url))?.is_some() {
            cached += 1;
        } else {
            println!("miss  {}", url);
        }
    }
    println!("{}/{} cached", cached, unique.len());
    Ok(())
}
