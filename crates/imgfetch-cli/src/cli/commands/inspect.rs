//! `imgfetch inspect <url>` – details of a cached blob.

use anyhow::{Context, Result};
use imgfetch_core::{checksum, normalize_key};

use crate::cli::App;

pub fn run_inspect(app: &App, url: &str) -> Result<()> {
    let key = normalize_key(url);
    println!("{:<10} {}", "KEY", key);
    match app.cached_path(&key)? {
        Some(path) => {
            let size = std::fs::metadata(&path)
                .with_context(|| format!("stat {}", path.display()))?
                .len();
            println!("{:<10} {}", "PATH", path.display());
            println!("{:<10} {}", "SIZE", size);
            println!("{:<10} {}", "SHA256", checksum::sha256_path(&path)?);
        }
        None => println!("{:<10} not cached", "STATE"),
    }
    Ok(())
}
