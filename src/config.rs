//! Configuration loading for the `openlens` CLI.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.openlens/config.toml` (user)
//! 3. `/etc/openlens/config.toml` (system)
//!
//! Every section and key is optional. With no file at all the built-in
//! defaults apply; only an explicit path that does not exist is an error.
//!
//! ```toml
//! [api]
//! base_url = "https://api.openalex.org"
//! timeout_ms = 5000
//!
//! [scheduler]
//! max_concurrent = 3
//! min_delay_ms = 75
//!
//! [retry]
//! max_retries = 3
//! initial_delay_ms = 75
//!
//! [cache.institutions]
//! ttl_secs = 1800
//! max_entries = 200
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::explorer::ExplorerBuilder;
use crate::http::{RetryConfig, SchedulerConfig};
use crate::openalex::DEFAULT_BASE_URL;
use crate::{CacheConfig, OpenLensError, Result};

/// CLI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub cache: CacheSection,
}

/// API endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API root (default: https://api.openalex.org).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request deadline in milliseconds (default: 5000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

/// Request admission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulerSection {
    #[serde(default)]
    pub max_concurrent: Option<usize>,
    #[serde(default)]
    pub min_delay_ms: Option<u64>,
}

/// Retry behaviour.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrySection {
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub initial_delay_ms: Option<u64>,
}

/// Cache sizing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSection {
    #[serde(default)]
    pub institutions: Option<CacheLimits>,
    #[serde(default)]
    pub works: Option<CacheLimits>,
}

/// TTL and capacity overrides for one cache.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheLimits {
    #[serde(default)]
    pub ttl_secs: Option<u64>,
    #[serde(default)]
    pub max_entries: Option<usize>,
}

impl CacheLimits {
    fn apply(&self, mut config: CacheConfig) -> CacheConfig {
        if let Some(secs) = self.ttl_secs {
            config = config.ttl(Duration::from_secs(secs));
        }
        if let Some(n) = self.max_entries {
            config = config.max_entries(n);
        }
        config
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.openlens/config.toml`
    /// 3. `/etc/openlens/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            OpenLensError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            OpenLensError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(OpenLensError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".openlens").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/openlens/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Apply this configuration to an [`ExplorerBuilder`].
    pub fn apply(&self, builder: ExplorerBuilder) -> ExplorerBuilder {
        let mut scheduler = SchedulerConfig::default();
        if let Some(n) = self.scheduler.max_concurrent {
            scheduler = scheduler.max_concurrent(n);
        }
        if let Some(ms) = self.scheduler.min_delay_ms {
            scheduler = scheduler.min_delay(Duration::from_millis(ms));
        }

        let mut retry = RetryConfig::default();
        if let Some(n) = self.retry.max_retries {
            retry = retry.max_retries(n);
        }
        if let Some(ms) = self.retry.initial_delay_ms {
            retry = retry.initial_delay(Duration::from_millis(ms));
        }

        let mut institutions = CacheConfig::institutions();
        if let Some(ref limits) = self.cache.institutions {
            institutions = limits.apply(institutions);
        }
        let mut works = CacheConfig::works();
        if let Some(ref limits) = self.cache.works {
            works = limits.apply(works);
        }

        builder
            .base_url(&self.api.base_url)
            .timeout(Duration::from_millis(self.api.timeout_ms))
            .scheduler(scheduler)
            .retry(retry)
            .institution_cache(institutions)
            .works_cache(works)
    }
}
