//! Configuration loading
//!
//! Config file resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. `ETYMA_CONFIG` environment variable
//! 3. Platform config directory (`~/.config/etyma/config.toml` on Linux)
//! 4. Built-in defaults (fallback)
//!
//! A missing config file is not fatal: a warning is logged and defaults are
//! used. Secrets found in the environment override whatever the file holds.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "ETYMA_CONFIG";

/// Complete service configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub openai: OpenAiConfig,
    pub art: ArtConfig,
    pub stripe: StripeConfig,
    pub relay: RelayConfig,
    pub orders: OrderStoreConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally visible origin used for checkout return URLs
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            public_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log file path (logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Hosted language model used for name analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Image generation provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Delay between status polls when waiting server-side
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    /// `png` or `jpeg`
    pub output_format: String,
    /// Hosts artwork may be downloaded from; empty allows any public https host
    pub artwork_hosts: Vec<String>,
    /// Largest artwork download accepted
    pub max_image_bytes: u64,
}

impl Default for ArtConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.kie.ai".to_string(),
            poll_interval_ms: 3000,
            max_poll_attempts: 60,
            output_format: "jpeg".to_string(),
            artwork_hosts: Vec::new(),
            max_image_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Payment processor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub base_url: String,
    pub currency: String,
    /// Price in the currency's minor unit
    pub unit_amount: u64,
    pub product_name: String,
    /// Maximum age of a signed webhook timestamp
    pub signature_tolerance_secs: i64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            webhook_secret: None,
            base_url: "https://api.stripe.com".to_string(),
            currency: "gbp".to_string(),
            unit_amount: 2500,
            product_name: "Etyma Digital Print".to_string(),
            signature_tolerance_secs: 300,
        }
    }
}

/// Hosted email/sheets relay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Mail/sheets account the relay acts as
    pub account: String,
    pub from: String,
    /// Spreadsheet receiving waitlist signups and name requests
    pub sheet_id: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://google-api-proxy-production.up.railway.app".to_string(),
            account: "levity".to_string(),
            from: "Etyma <atlas@levityleads.com>".to_string(),
            sheet_id: None,
        }
    }
}

/// In-memory order store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderStoreConfig {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for OrderStoreConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60 * 60,
            sweep_interval_secs: 5 * 60,
        }
    }
}

impl TomlConfig {
    /// Resolve, load, and apply environment overrides
    ///
    /// `cli_path` takes priority over every other source. A path given on
    /// the command line or via `ETYMA_CONFIG` must exist; the platform
    /// default may be absent.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_path(cli_path) {
            ConfigSource::Explicit(path) => load_toml_config(&path)?,
            ConfigSource::Default(path) if path.exists() => load_toml_config(&path)?,
            ConfigSource::Default(path) => {
                warn!(
                    "No config file at {}, using built-in defaults",
                    path.display()
                );
                TomlConfig::default()
            }
            ConfigSource::None => {
                warn!("Could not determine config directory, using built-in defaults");
                TomlConfig::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override secrets and relay location from the environment
    pub fn apply_env_overrides(&mut self) {
        override_from_env(&mut self.openai.api_key, "OPENAI_API_KEY");
        override_from_env(&mut self.art.api_key, "KIE_API_KEY");
        override_from_env(&mut self.stripe.secret_key, "STRIPE_SECRET_KEY");
        override_from_env(&mut self.stripe.webhook_secret, "STRIPE_WEBHOOK_SECRET");
        override_from_env(&mut self.relay.api_key, "GOOGLE_API_KEY");

        if let Some(url) = env_value("GOOGLE_API_URL") {
            info!("Relay URL loaded from environment variable");
            self.relay.base_url = url;
        }
    }
}

/// Where the config file came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// CLI argument or environment variable
    Explicit(PathBuf),
    /// Platform default location
    Default(PathBuf),
    /// No location could be determined
    None,
}

/// Resolve the config file location per the priority order above
pub fn resolve_config_path(cli_path: Option<&Path>) -> ConfigSource {
    if let Some(path) = cli_path {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Some(path) = env_value(CONFIG_ENV_VAR) {
        return ConfigSource::Explicit(PathBuf::from(path));
    }

    match dirs::config_dir() {
        Some(dir) => ConfigSource::Default(dir.join("etyma").join("config.toml")),
        None => ConfigSource::None,
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Validate a secret (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| is_valid_key(v))
}

fn override_from_env(slot: &mut Option<String>, env_name: &str) {
    if let Some(value) = env_value(env_name) {
        if slot.as_deref().is_some_and(is_valid_key) {
            warn!("{} set in both environment and TOML, using environment", env_name);
        } else {
            info!("{} loaded from environment variable", env_name);
        }
        *slot = Some(value);
    } else if slot.as_deref().is_some_and(|v| !is_valid_key(v)) {
        *slot = None;
    }
}
