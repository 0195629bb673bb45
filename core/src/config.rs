//! Client configuration.
//!
//! Holds where the service lives and what every request carries. Transport
//! concerns such as timeouts stay with the `Transport` implementation.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Opaque key/value fragment merged into every request body.
pub type Credentials = Map<String, Value>;

/// Acting-user id sent as `CreatedBy` when none is configured.
pub const DEFAULT_CREATED_BY: i64 = 101;

/// Endpoint paths relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub list_active: String,
    pub list_deleted: String,
    pub submit: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            list_active: "get_room_list_demo.php".to_string(),
            list_deleted: "get_room_list_deleted_demo.php".to_string(),
            submit: "save_room_demo.php".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default = "default_created_by")]
    pub created_by: i64,
}

fn default_created_by() -> i64 {
    DEFAULT_CREATED_BY
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            endpoints: Endpoints::default(),
            credentials: Credentials::new(),
            created_by: DEFAULT_CREATED_BY,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Read `ROOMS_API_BASE`, `ROOMS_API_CREDENTIALS` and `ROOMS_CREATED_BY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("ROOMS_API_BASE").ok_or(ConfigError::Missing("ROOMS_API_BASE"))?;
        let mut config = Self::new(&base_url);

        if let Some(raw) = lookup("ROOMS_API_CREDENTIALS") {
            config.credentials = serde_json::from_str(&raw).map_err(|e| ConfigError::Invalid {
                name: "ROOMS_API_CREDENTIALS",
                reason: e.to_string(),
            })?;
        }
        if let Some(raw) = lookup("ROOMS_CREATED_BY") {
            config.created_by = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    name: "ROOMS_CREATED_BY",
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(config)
    }
}
