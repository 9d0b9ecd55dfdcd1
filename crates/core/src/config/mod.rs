//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (ATOM_SW_*)
//! 2. TOML config file (if ATOM_SW_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// The versioned cache names the worker operates against.
///
/// Only these two names survive an activate; every other cache name is
/// treated as a stale deploy and destroyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNames {
    /// Core cache, pre-populated at install with the site shell.
    pub core: String,
    /// Runtime cache, populated lazily as resources are fetched.
    pub runtime: String,
}

/// Worker configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (ATOM_SW_*)
/// 2. TOML config file (if ATOM_SW_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache database.
    ///
    /// Set via ATOM_SW_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the worker is registered against; only requests within this
    /// scope are intercepted, and the core-asset manifest resolves against it.
    ///
    /// Set via ATOM_SW_SCOPE environment variable.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// User-Agent string for network fetches.
    ///
    /// Set via ATOM_SW_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network fetch timeout in milliseconds.
    ///
    /// Set via ATOM_SW_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Deploy version baked into the core cache name. Bumping it is the
    /// only supported cache migration mechanism.
    ///
    /// Set via ATOM_SW_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Site-shell paths pre-warmed into the core cache at install.
    ///
    /// Set via ATOM_SW_CORE_ASSETS environment variable (comma-separated).
    #[serde(default = "default_core_assets")]
    pub core_assets: Vec<String>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./atom-sw-cache.sqlite")
}

fn default_scope() -> String {
    "http://localhost:4321/".into()
}

fn default_user_agent() -> String {
    "atom-sw/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_cache_version() -> String {
    "v1".into()
}

fn default_core_assets() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/bio",
        "/admin",
        "/favicon.svg",
        "/images/bio/arthur-portfolio.jpg",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            scope: default_scope(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            cache_version: default_cache_version(),
            core_assets: default_core_assets(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Derive the current core/runtime cache names.
    ///
    /// The core name carries the deploy version; the runtime name is fixed
    /// across deploys, matching the eviction rule in activate.
    pub fn cache_names(&self) -> CacheNames {
        CacheNames {
            core: format!("atom-portfolio-{}", self.cache_version),
            runtime: "atom-runtime".into(),
        }
    }

    /// Parse the configured scope as a URL.
    pub fn scope_url(&self) -> Result<url::Url, ConfigError> {
        url::Url::parse(&self.scope)
            .map_err(|e| ConfigError::Invalid { field: "scope".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `ATOM_SW_`
    /// 2. TOML file from `ATOM_SW_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("ATOM_SW_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("ATOM_SW_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
