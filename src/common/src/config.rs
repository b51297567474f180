//! Application configuration.
//!
//! Values are layered: built-in defaults, then `sweeper.toml`, then
//! `SWEEPER__`-prefixed environment variables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

/// Storage location to clean up.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage DSN: `file:///path/to/backups`, `memory://` or `s3://bucket`.
    ///
    /// Env: SWEEPER__STORAGE__DSN
    pub dsn: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dsn: String::from("file:///.data/backups"),
        }
    }
}

/// Cleanup behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Whitespace separated retention rules in the `<days>:<amount>` form.
    /// `"1:7 7:4 30:2"` retains at most 7 resources older than a day,
    /// 4 older than a week and 2 older than a month.
    ///
    /// Env: SWEEPER__CLEANUP__RULES
    pub rules: String,

    /// Identify expired resources without deleting them.
    ///
    /// Env: SWEEPER__CLEANUP__DRY_RUN
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            rules: String::from("1:7 7:4 30:2"),
            dry_run: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Configuration {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

impl Configuration {
    /// Load configuration from `sweeper.toml` and the environment.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file("sweeper.toml"))
            .merge(Env::prefixed("SWEEPER__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    /// Load configuration from the file at `path` and the environment.
    pub fn load_from_path(path: &Path) -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("SWEEPER__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}
