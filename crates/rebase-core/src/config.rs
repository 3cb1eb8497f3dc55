//! Configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::types::{u128_string, AccountId, DomainId, InterestRate};

/// Default fixed-point base: `1e18 * 1e18`.
pub const DEFAULT_SCALE: u128 = 1_000_000_000_000_000_000_000_000_000_000_000_000;

/// Default initial global rate: `5e-8` per second at [`DEFAULT_SCALE`].
pub const DEFAULT_INITIAL_RATE: u128 = 50_000_000_000_000_000_000_000_000_000;

/// Full configuration for a rebase deployment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RebaseConfig {
    /// Ledger economics and ownership.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Custody vault settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Cross-domain gateway settings.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Fixed-point base `S` of the accrual factor `S + rate * elapsed`.
    #[serde(default = "default_scale", with = "u128_string")]
    pub scale: u128,
    /// Global rate at ledger creation.
    #[serde(default = "default_initial_rate")]
    pub initial_rate: InterestRate,
    /// Owner identity: sets the rate and grants capabilities.
    #[serde(default = "default_owner")]
    pub owner: AccountId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Identity the vault uses when calling mint/burn.
    #[serde(default = "default_vault_account")]
    pub account: AccountId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Local domain identifier.
    #[serde(default = "default_domain")]
    pub domain: DomainId,
    /// Identity the gateway uses when calling mint/burn.
    #[serde(default = "default_gateway_account")]
    pub account: AccountId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// RocksDB directory holding the persisted ledger and vault state.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_scale() -> u128 {
    DEFAULT_SCALE
}
fn default_initial_rate() -> InterestRate {
    InterestRate(DEFAULT_INITIAL_RATE)
}
fn default_owner() -> AccountId {
    AccountId::from("owner")
}
fn default_vault_account() -> AccountId {
    AccountId::from("vault")
}
fn default_domain() -> DomainId {
    DomainId(1)
}
fn default_gateway_account() -> AccountId {
    AccountId::from("gateway")
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/ledger")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            initial_rate: default_initial_rate(),
            owner: default_owner(),
        }
    }
}

impl LedgerConfig {
    /// Reject configurations the accrual math cannot work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.scale == 0 {
            return Err(CoreError::InvalidConfig("scale must be non-zero".into()));
        }
        Ok(())
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            account: default_vault_account(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            account: default_gateway_account(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl RebaseConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<RebaseConfig>(&contents)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.ledger.validate()?;
        Ok(config)
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}
