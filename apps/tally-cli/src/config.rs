//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_DB_PATH, TALLY_DB_MAX_CONNECTIONS, TALLY_CHANNEL,            │
//! │     TALLY_DEFAULT_ZONE, TALLY_PRICES_INCLUDE_TAX, TALLY_ZONE_STRATEGY  │
//! │                                                                         │
//! │  2. TOML Config File (--config, or the platform config dir)            │
//! │     ~/.config/pricing/tally.toml (Linux)                               │
//! │     ~/Library/Application Support/com.tally.pricing/tally.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/tally/tally.db"
//! max_connections = 5
//!
//! [channel]
//! code = "web-uk"
//! default_zone = "uk"
//! prices_include_tax = true
//!
//! [pricing]
//! zone_strategy = "shipping_country"  # channel_default | shipping_country
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally_pricing::{ChannelDefaultZoneStrategy, ShippingCountryZoneStrategy, ZoneStrategy};
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// Errors
// =============================================================================

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Zone Strategy Selection
// =============================================================================

/// Which zone strategy the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneStrategyKind {
    /// Always the channel's default zone.
    #[default]
    ChannelDefault,
    /// Zone of the order's shipping country.
    ShippingCountry,
}

impl ZoneStrategyKind {
    pub fn build(self) -> Arc<dyn ZoneStrategy> {
        match self {
            ZoneStrategyKind::ChannelDefault => Arc::new(ChannelDefaultZoneStrategy),
            ZoneStrategyKind::ShippingCountry => Arc::new(ShippingCountryZoneStrategy),
        }
    }
}

impl std::str::FromStr for ZoneStrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "channel_default" | "channel" => Ok(ZoneStrategyKind::ChannelDefault),
            "shipping_country" | "shipping" => Ok(ZoneStrategyKind::ShippingCountry),
            other => Err(ConfigError::InvalidValue {
                key: "zone_strategy".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "tally", "pricing")
        .map(|dirs| dirs.data_dir().join("tally.db"))
        .unwrap_or_else(|| PathBuf::from("tally.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// The sales channel orders are priced in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettings {
    #[serde(default = "default_channel_code")]
    pub code: String,

    /// Zone id used when no other zone applies; must exist in the catalog.
    #[serde(default = "default_zone")]
    pub default_zone: String,

    #[serde(default)]
    pub prices_include_tax: bool,
}

fn default_channel_code() -> String {
    "default".to_string()
}

fn default_zone() -> String {
    "uk".to_string()
}

impl Default for ChannelSettings {
    fn default() -> Self {
        ChannelSettings {
            code: default_channel_code(),
            default_zone: default_zone(),
            prices_include_tax: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default)]
    pub zone_strategy: ZoneStrategyKind,
}

// =============================================================================
// TallyConfig
// =============================================================================

/// Effective CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub channel: ChannelSettings,

    #[serde(default)]
    pub pricing: PricingSettings,
}

impl TallyConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// An explicit `config_path` must exist; the platform default may not.
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.channel.code.trim().is_empty() {
            return Err(ConfigError::Invalid("channel.code must not be empty".into()));
        }

        if self.channel.default_zone.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "channel.default_zone must not be empty".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `TALLY_*` overrides read through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        if let Some(path) = lookup("TALLY_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("TALLY_DB_MAX_CONNECTIONS") {
            self.database.max_connections =
                max.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "TALLY_DB_MAX_CONNECTIONS".to_string(),
                    value: max.clone(),
                })?;
        }

        if let Some(code) = lookup("TALLY_CHANNEL") {
            self.channel.code = code;
        }

        if let Some(zone) = lookup("TALLY_DEFAULT_ZONE") {
            self.channel.default_zone = zone;
        }

        if let Some(flag) = lookup("TALLY_PRICES_INCLUDE_TAX") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.channel.prices_include_tax = true,
                "0" | "false" | "no" => self.channel.prices_include_tax = false,
                _ => warn!(value = %flag, "Ignoring unrecognised TALLY_PRICES_INCLUDE_TAX"),
            }
        }

        if let Some(strategy) = lookup("TALLY_ZONE_STRATEGY") {
            self.pricing.zone_strategy = strategy.parse()?;
        }

        Ok(())
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "pricing")
            .map(|dirs| dirs.config_dir().join("tally.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
