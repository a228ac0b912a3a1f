#![forbid(unsafe_code)]

mod enumeration;
mod error;
mod persistence;
mod restore;

pub use enumeration::Enumeration;
pub use error::Error;
pub use persistence::Persistence;
pub use restore::Restore;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of environment variables that override file settings.
///
/// Nested keys are separated by a double underscore, e.g.
/// `SPACEWARP_RESTORE__WINDOW_TIMEOUT=45`.
pub const ENV_PREFIX: &str = "SPACEWARP_";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub restore: Restore,
    pub enumeration: Enumeration,
    pub persistence: Persistence,
}

impl Config {
    /// Configuration with every value at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file layered over the defaults, then
    /// apply environment overrides. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let config = Self::figment()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    /// Load from [`default_config_path`].
    pub fn load_default() -> Result<Self, Error> {
        Self::load(default_config_path())
    }

    /// Parse configuration from TOML text layered over the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let config = Self::figment().merge(Toml::string(text)).extract()?;
        Ok(config)
    }

    /// Render the configuration as a TOML document.
    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml_edit::ser::to_string_pretty(self)?)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }
}

/// Directory holding the configuration file and snapshot database.
///
/// Falls back to the temp directory when `HOME` is unset.
pub fn default_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".spacewarp"),
        None => std::env::temp_dir().join("spacewarp"),
    }
}

pub fn default_config_path() -> PathBuf {
    default_dir().join("config.toml")
}
