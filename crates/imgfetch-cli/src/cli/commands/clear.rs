//! `imgfetch clear` – cancel pending fetches and empty the namespace.

use anyhow::Result;

use crate::cli::App;

pub async fn run_clear(app: &App) -> Result<()> {
    app.fetcher.clear_cache().await;
    println!("Cleared namespace {}", app.namespace());
    Ok(())
}
