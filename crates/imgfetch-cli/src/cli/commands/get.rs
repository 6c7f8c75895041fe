//! `imgfetch get <url>` – what an image view does on appear: show the
//! cached blob, or a placeholder while the fetcher fills the cache.

use anyhow::Result;
use imgfetch_core::normalize_key;

use crate::cli::App;

pub async fn run_get(app: &App, url: &str, no_fetch: bool) -> Result<()> {
    let key = normalize_key(url);
    if let Some(path) = app.cached_path(&key)? {
        println!("{}", path.display());
        return Ok(());
    }

    if !no_fetch {
        app.fetcher.fetch(url);
        app.fetcher.wait_idle().await;
        if let Some(path) = app.cached_path(&key)? {
            println!("{}", path.display());
            return Ok(());
        }
    }

    println!("placeholder: {} is not cached", url);
    Ok(())
}
