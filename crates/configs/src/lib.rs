//! # configs
//!
//! Typed configuration for the yakboard binary. Values come from an
//! optional `yakboard.toml` next to the process, overridden by
//! `YAKBOARD__`-prefixed environment variables (double underscore as
//! the section separator, e.g. `YAKBOARD__FEED__DEFAULT_RADIUS_METERS`).

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Radius used to scope a viewer's feed when the client does not ask
    /// for a different one.
    #[serde(default = "default_radius_meters")]
    pub default_radius_meters: f64,
    /// Upper bound on candidate posts fetched per feed read.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: i64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            default_radius_meters: default_radius_meters(),
            candidate_limit: default_candidate_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Postgres connection string; absent means the in-memory adapter.
    pub url: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("yakboard").required(false))
            .add_source(Environment::with_prefix("YAKBOARD").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_radius_meters() -> f64 {
    5_000.0
}

fn default_candidate_limit() -> i64 {
    50
}
