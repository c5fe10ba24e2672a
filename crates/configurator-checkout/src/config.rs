//! # Configurator Configuration
//!
//! Settings for the commerce backend, the checkout gate and the catalog.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CONFIGURATOR_BACKEND_URL=https://shop.example.com                  │
//! │     CONFIGURATOR_BLOCK_ON_CONFLICT=true                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/configurator/configurator.toml (Linux)                   │
//! │     ~/Library/Application Support/com.configurator.configurator/...    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost backend, conflicts warn only                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # configurator.toml
//! [backend]
//! base_url = "https://shop.example.com"
//! add_path = "/cart/add.js"
//! timeout_secs = 10
//!
//! [retry]
//! initial_backoff_ms = 250
//! max_elapsed_secs = 10
//!
//! [checkout]
//! block_on_conflict = false
//! require_preorder_agreement = false
//!
//! [catalog]
//! path = "/srv/configurator/nova75.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use configurator_core::{Catalog, ReadinessPolicy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Backend Settings
// =============================================================================

/// Where and how the cart is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Storefront origin, `http://` or `https://`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the "add to cart" endpoint, joined onto `base_url`.
    #[serde(default = "default_add_path")]
    pub add_path: String,

    /// Request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_add_path() -> String {
    "/cart/add.js".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            base_url: default_base_url(),
            add_path: default_add_path(),
            timeout_secs: default_timeout(),
        }
    }
}

impl BackendSettings {
    /// Full URL of the "add to cart" endpoint.
    pub fn add_url(&self) -> CheckoutResult<Url> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(&self.add_path)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Retry Settings
// =============================================================================

/// Exponential backoff for transient submission failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// First wait after a transient failure (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Longest single wait (milliseconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Give up once this much time has passed (seconds).
    /// Set to 0 to disable retries.
    #[serde(default = "default_max_elapsed")]
    pub max_elapsed_secs: u64,
}

fn default_initial_backoff() -> u64 {
    250
}

fn default_max_backoff() -> u64 {
    2_000
}

fn default_max_elapsed() -> u64 {
    10
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            max_elapsed_secs: default_max_elapsed(),
        }
    }
}

impl RetrySettings {
    /// No retries: the first failure is final.
    pub fn disabled() -> Self {
        RetrySettings {
            max_elapsed_secs: 0,
            ..Default::default()
        }
    }
}

// =============================================================================
// Checkout Settings
// =============================================================================

/// Switches for the checkout gate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Active conflicts disable "Add to Cart" instead of only warning.
    #[serde(default)]
    pub block_on_conflict: bool,

    /// Buyers must accept the preorder agreement first.
    #[serde(default)]
    pub require_preorder_agreement: bool,
}

impl CheckoutSettings {
    pub fn policy(&self) -> ReadinessPolicy {
        ReadinessPolicy {
            block_on_conflict: self.block_on_conflict,
            require_preorder_agreement: self.require_preorder_agreement,
        }
    }
}

// =============================================================================
// Catalog Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Catalog document used when none is given on the command line.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configurator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfiguratorConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl ConfiguratorConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (configurator.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CheckoutResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading configurator config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load configurator config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CheckoutResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CheckoutError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CheckoutError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .map_err(|e| CheckoutError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Configurator config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CheckoutResult<()> {
        let url = &self.backend.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CheckoutError::InvalidUrl(format!(
                "Backend URL must start with http:// or https://, got: {}",
                url
            )));
        }
        self.backend.add_url()?;

        if self.backend.add_path.trim().is_empty() {
            return Err(CheckoutError::InvalidConfig("add_path must not be empty".into()));
        }

        if self.backend.timeout_secs == 0 {
            return Err(CheckoutError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(CheckoutError::InvalidConfig(
                "initial_backoff_ms must not exceed max_backoff_ms".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CONFIGURATOR_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.base_url = url;
        }

        if let Ok(path) = std::env::var("CONFIGURATOR_ADD_PATH") {
            self.backend.add_path = path;
        }

        if let Ok(timeout) = std::env::var("CONFIGURATOR_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse::<u64>() {
                self.backend.timeout_secs = t;
            }
        }

        if let Ok(flag) = std::env::var("CONFIGURATOR_BLOCK_ON_CONFLICT") {
            match parse_flag(&flag) {
                Some(value) => {
                    debug!(value, "Overriding block_on_conflict from environment");
                    self.checkout.block_on_conflict = value;
                }
                None => warn!(value = %flag, "Unknown boolean in CONFIGURATOR_BLOCK_ON_CONFLICT"),
            }
        }

        if let Ok(flag) = std::env::var("CONFIGURATOR_REQUIRE_PREORDER") {
            match parse_flag(&flag) {
                Some(value) => self.checkout.require_preorder_agreement = value,
                None => warn!(value = %flag, "Unknown boolean in CONFIGURATOR_REQUIRE_PREORDER"),
            }
        }

        if let Ok(path) = std::env::var("CONFIGURATOR_CATALOG") {
            debug!(path = %path, "Overriding catalog path from environment");
            self.catalog.path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "configurator", "configurator")
            .map(|dirs| dirs.config_dir().join("configurator.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn policy(&self) -> ReadinessPolicy {
        self.checkout.policy()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Catalog Loading
// =============================================================================

/// Reads and parses a catalog document.
///
/// Integrity issues do not fail the load; each one is logged and the
/// affected rule or variant is left out by the engine.
pub fn load_catalog(path: &Path) -> CheckoutResult<Catalog> {
    let contents = std::fs::read_to_string(path).map_err(|e| CheckoutError::CatalogLoadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let catalog = Catalog::from_json(&contents)?;

    for issue in catalog.issues() {
        warn!(path = ?path, %issue, "Catalog integrity issue");
    }
    info!(
        path = ?path,
        components = catalog.components().len(),
        rules = catalog.conflicts().len(),
        "Catalog loaded"
    );

    Ok(catalog)
}

// =============================================================================
// Unit Tests
// =============================================================================
