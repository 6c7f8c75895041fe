//! CLI for the imgfetch cache. Also the composition root: the only place a
//! `Fetcher` is built.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use imgfetch_core::config::{self, ImgfetchConfig};
use imgfetch_core::store::{CacheStore, DiskStore};
use imgfetch_core::transport::CurlTransport;
use imgfetch_core::{Fetcher, Priority};
use std::path::PathBuf;
use std::sync::Arc;

use commands::{run_clear, run_completions, run_get, run_inspect, run_key, run_prefetch};

/// Top-level CLI for the imgfetch cache.
#[derive(Debug, Parser)]
#[command(name = "imgfetch")]
#[command(about = "imgfetch: fetch remote images into a local cache", long_about = None)]
pub struct Cli {
    /// Use this config file instead of ~/.config/imgfetch/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the cached path of a URL, fetching it first on a miss.
    Get {
        /// Image URL.
        url: String,
        /// Only look in the cache; never fetch.
        #[arg(long)]
        no_fetch: bool,
    },

    /// Fetch URLs into the cache in the background and wait for them.
    Prefetch {
        /// Image URLs. Duplicates are fetched once.
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(long, value_enum, default_value_t = PriorityArg::Normal)]
        priority: PriorityArg,
    },

    /// Show the cache key, path, size and SHA-256 of a cached URL.
    Inspect {
        /// Image URL.
        url: String,
    },

    /// Print the cache key a URL is stored under.
    Key {
        /// Image URL.
        url: String,
    },

    /// Remove every cached blob in the configured namespace.
    Clear,

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    Low,
    Normal,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(p: PriorityArg) -> Self {
        match p {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Normal => Priority::Normal,
            PriorityArg::High => Priority::High,
        }
    }
}

/// Everything a command needs, built once from config.
pub struct App {
    pub fetcher: Fetcher,
    pub store: Arc<DiskStore>,
}

impl App {
    pub fn compose(cfg: &ImgfetchConfig) -> Result<Self> {
        let store = match &cfg.cache_dir {
            Some(dir) => DiskStore::new(dir),
            None => DiskStore::open_default().context("locate cache directory")?,
        };
        let store = Arc::new(store);
        let transport = Arc::new(CurlTransport::new(cfg.transport.clone()));
        let fetcher = Fetcher::new(transport, store.clone(), cfg.namespace.clone())
            .with_context(|| format!("configured namespace {:?}", cfg.namespace))?;
        tracing::debug!(root = %store.root().display(), namespace = %cfg.namespace, "composed fetcher");
        Ok(Self { fetcher, store })
    }

    pub fn namespace(&self) -> &str {
        self.fetcher.namespace()
    }

    /// Path of the cached blob for `key`, if one exists.
    pub fn cached_path(&self, key: &str) -> Result<Option<PathBuf>> {
        if !self.store.exists(self.namespace(), key) {
            return Ok(None);
        }
        Ok(Some(self.store.path_for(self.namespace(), key)?))
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Commands that need neither config nor cache.
        match &cli.command {
            CliCommand::Key { url } => return run_key(url),
            CliCommand::Completions { shell } => return run_completions(*shell),
            _ => {}
        }

        let cfg = match &cli.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);
        let app = App::compose(&cfg)?;

        match cli.command {
            CliCommand::Get { url, no_fetch } => run_get(&app, &url, no_fetch).await?,
            CliCommand::Prefetch { urls, priority } => {
                run_prefetch(&app, &urls, priority.into()).await?
            }
            CliCommand::Inspect { url } => run_inspect(&app, &url)?,
            CliCommand::Clear => run_clear(&app).await?,
            CliCommand::Key { .. } | CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
