use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Namespace used when the config does not name one.
pub const DEFAULT_NAMESPACE: &str = "caches";

/// HTTP transport parameters (optional `[transport]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Seconds allowed for connection establishment.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for the whole transfer. Timeouts are left to the transport.
    pub timeout_secs: u64,
    /// Maximum redirects followed before giving up.
    pub max_redirections: u32,
    /// Optional `User-Agent` header.
    pub user_agent: Option<String>,
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 60,
            max_redirections: 10,
            user_agent: None,
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// Global configuration loaded from `~/.config/imgfetch/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImgfetchConfig {
    /// Cache namespace (a subdirectory of the cache dir) the fetcher writes to and clears.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Cache root; `None` means `$XDG_CACHE_HOME/imgfetch`.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub transport: TransportConfig,
}

impl Default for ImgfetchConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            cache_dir: None,
            transport: TransportConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ImgfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ImgfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path (e.g. `--config`).
pub fn load_from(path: &Path) -> Result<ImgfetchConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: ImgfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
