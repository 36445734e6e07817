//! # ludo-config
//!
//! Layered configuration loading for Ludo using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LUDO_*` prefix, `__` as separator)
//! 2. Project-level `ludo.toml`
//! 3. User-level `~/.config/ludo/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `LUDO_DATABASE__PATH` -> `database.path`,
//! `LUDO_AUTH__ADMIN_TOKEN` -> `auth.admin_token`, etc.
//!
//! ```no_run
//! use ludo_config::LudoConfig;
//!
//! let config = LudoConfig::load_with_dotenv().expect("config");
//! println!("serving {} on {}", config.database.path, config.server.bind_addr());
//! ```

mod auth;
mod backup;
mod database;
mod error;
mod server;

pub use auth::{AuthConfig, TokenEntry};
pub use backup::{BackupConfig, MAX_BOUND_PARAMETERS};
pub use database::{DatabaseConfig, IN_MEMORY};
pub use error::ConfigError;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local config file, relative to the working directory.
pub const LOCAL_CONFIG_FILE: &str = "ludo.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LudoConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub backup: BackupConfig,
}

impl LudoConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` on malformed sources and
    /// `ConfigError::InvalidValue` when [`Self::validate`] fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so callers can merge extra providers (e.g. CLI flags) on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("LUDO_").split("__"))
    }

    /// Path to the user-global config file.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ludo").join("config.toml"))
    }

    /// Reject values that would make the server or restore unusable.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(invalid("database.path", "must not be empty"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(invalid("server.max_upload_bytes", "must be greater than zero"));
        }
        if self.backup.insert_batch_size == 0 {
            return Err(invalid("backup.insert_batch_size", "must be greater than zero"));
        }
        if let Some(i) = self.auth.tokens.iter().position(|t| t.user_id.is_empty()) {
            return Err(invalid(
                "auth.tokens.user_id",
                &format!("missing for token entry {i}"),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
