use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gateway::DEFAULT_GATEWAYS;
use crate::retry::RetryPolicy;

/// Public relay used when every gateway probe fails.
pub const DEFAULT_RELAY_BASE: &str = "https://api.allorigins.win/raw";

/// Pinning endpoint used by `vidgate pin`.
pub const DEFAULT_PINNING_URL: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";

/// Environment overrides for the pinning credentials.
pub const ENV_PINNING_API_KEY: &str = "VIDGATE_PINNING_API_KEY";
pub const ENV_PINNING_SECRET_KEY: &str = "VIDGATE_PINNING_SECRET_KEY";

/// Timeouts for a single gateway probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub connect_timeout_secs: u64,
    /// Upper bound for the whole request (HEAD, opaque GET or relay GET).
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            timeout_secs: 15,
        }
    }
}

/// Metadata preload and automatic retry parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Soft deadline for the metadata preload probe.
    pub preload_timeout_ms: u64,
    /// Bytes fetched from the start of the media to detect its container.
    pub sniff_bytes: usize,
    /// Automatic retries before a manual retry is required.
    pub max_auto_retries: u32,
    /// Base delay in seconds for exponential backoff (retry n waits base * 2^n).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            preload_timeout_ms: 5000,
            sniff_bytes: 64 * 1024,
            max_auto_retries: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

impl PlaybackConfig {
    pub fn preload_timeout(&self) -> Duration {
        Duration::from_millis(self.preload_timeout_ms)
    }

    /// Backoff policy. Fails when `base_delay_secs` is negative, NaN or too
    /// large for a `Duration`.
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        let base_delay = Duration::try_from_secs_f64(self.base_delay_secs).map_err(|e| {
            anyhow!("invalid playback.base_delay_secs = {}: {}", self.base_delay_secs, e)
        })?;
        Ok(RetryPolicy {
            max_auto_retries: self.max_auto_retries,
            base_delay,
            max_delay: Duration::from_secs(self.max_delay_secs),
        })
    }
}

/// Resolution cache sizing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached identifiers (None = unbounded for the process lifetime).
    #[serde(default)]
    pub capacity: Option<usize>,
}

/// Storage provider upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinningConfig {
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Uploads larger than this are rejected before any network call.
    pub max_upload_bytes: u64,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_PINNING_URL.to_string(),
            api_key: None,
            secret_key: None,
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}

impl PinningConfig {
    /// Credentials from the environment, falling back to the config file values.
    pub fn credentials(&self) -> Option<(String, String)> {
        self.credentials_with(|name| std::env::var(name).ok())
    }

    /// Like `credentials`, reading overrides through `env` instead of the
    /// process environment.
    pub fn credentials_with<F>(&self, env: F) -> Option<(String, String)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = env(ENV_PINNING_API_KEY).or_else(|| self.api_key.clone())?;
        let secret = env(ENV_PINNING_SECRET_KEY).or_else(|| self.secret_key.clone())?;
        if key.trim().is_empty() || secret.trim().is_empty() {
            return None;
        }
        Some((key, secret))
    }
}

/// Global configuration loaded from `~/.config/vidgate/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VidgateConfig {
    /// Gateway bases in priority order; the identifier is appended verbatim.
    pub gateways: Vec<String>,
    /// Cross-origin relay wrapping the primary gateway (None disables the relay step).
    #[serde(default)]
    pub relay_base: Option<String>,
    /// Accept a gateway whose opaque GET completed even though its status was not visible.
    pub accept_opaque_probe: bool,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub pinning: PinningConfig,
}

impl Default for VidgateConfig {
    fn default() -> Self {
        Self {
            gateways: DEFAULT_GATEWAYS.iter().map(|g| g.to_string()).collect(),
            relay_base: Some(DEFAULT_RELAY_BASE.to_string()),
            accept_opaque_probe: true,
            probe: ProbeConfig::default(),
            playback: PlaybackConfig::default(),
            cache: CacheConfig::default(),
            pinning: PinningConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vidgate")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VidgateConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<VidgateConfig> {
    if !path.exists() {
        let default_cfg = VidgateConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: VidgateConfig = toml::from_str(&data)?;
    cfg.playback
        .retry_policy()
        .with_context(|| format!("config {}", path.display()))?;
    Ok(cfg)
}
