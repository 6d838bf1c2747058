//! Server configuration.
//!
//! Loaded with figment from, in order of precedence (highest first):
//! 1. Environment variables prefixed with `RECORDBOX_`
//! 2. `recordbox.toml` in the working directory, if present
//! 3. Default values

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::http::HeaderValue;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use shared::EntityKind;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "recordbox.toml";

/// Prefix for environment overrides, e.g. `RECORDBOX_ENTITY=recipes`.
const ENV_PREFIX: &str = "RECORDBOX_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(Box<figment::Error>),

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// SQLite URL of the document store
    pub database_url: String,
    /// Which entity this server exposes
    pub entity: EntityKind,
    /// Directory with the built frontend, served for non-API paths
    pub static_dir: PathBuf,
    /// Origin allowed by CORS
    pub cors_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            database_url: "sqlite:recordbox.db".to_string(),
            entity: EntityKind::Cats,
            static_dir: PathBuf::from("frontend/dist"),
            cors_origin: "http://localhost:8080".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE_NAME))
    }

    pub fn load_from(config_file: &Path) -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(config_file))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        self.cors_origin_header()?;
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "database_url must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address.parse().map_err(|_| ConfigError::Invalid {
            message: format!("bind_address '{}' is not a socket address", self.bind_address),
        })
    }

    pub fn cors_origin_header(&self) -> Result<HeaderValue, ConfigError> {
        self.cors_origin.parse().map_err(|_| ConfigError::Invalid {
            message: format!("cors_origin '{}' is not a valid header value", self.cors_origin),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::from_figment(defaults()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_overrides_entity() {
        let config =
            Config::from_figment(defaults().merge(Serialized::default("entity", "recipes"))).unwrap();
        assert_eq!(config.entity, EntityKind::Recipes);
    }

    #[test]
    fn test_rejects_bad_bind_address() {
        let err = Config::from_figment(defaults().merge(Serialized::default("bind_address", "localhost")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_rejects_unknown_entity() {
        let err = Config::from_figment(defaults().merge(Serialized::default("entity", "dogs")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_missing_config_file_falls_back_to_defaults() {
        let config = Config::load_from(Path::new("does-not-exist.toml"));
        assert!(config.is_ok());
    }
}
