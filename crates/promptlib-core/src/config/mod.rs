//! Runtime configuration for Prompt Library clients.
//!
//! Desktop and CLI both resolve a [`LibraryConfig`] from environment
//! variables (optionally seeded from a `.env` file by the binary). Without
//! `PROMPTLIB_API_URL` the library runs in local-only mode.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

const DEFAULT_COLLECTION: &str = "prompts";
const DEFAULT_RECORDS_PATH: &str = "api/records/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP verb used for partial record updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMethod {
    #[default]
    Patch,
    Put,
}

/// Unit of the timestamps stored by the remote record API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampUnit {
    #[default]
    Seconds,
    Millis,
}

impl TimestampUnit {
    /// Convert a local millisecond timestamp to the remote unit
    pub const fn encode_millis(self, millis: i64) -> i64 {
        match self {
            Self::Seconds => millis.div_euclid(1000),
            Self::Millis => millis,
        }
    }

    /// Convert a remote timestamp to local milliseconds
    pub const fn decode_millis(self, value: i64) -> i64 {
        match self {
            Self::Seconds => value.saturating_mul(1000),
            Self::Millis => value,
        }
    }
}

/// Connection settings for the remote record API
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL, without trailing slash (e.g. `http://localhost:4000`)
    pub base_url: String,
    /// Path between base URL and collection name
    pub records_path: String,
    /// Name of the remote collection holding prompts
    pub collection: String,
    /// Optional bearer token sent with every request
    pub auth_token: Option<String>,
    pub update_method: UpdateMethod,
    pub timestamp_unit: TimestampUnit,
    /// Per-request timeout
    pub timeout: Duration,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("records_path", &self.records_path)
            .field("collection", &self.collection)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("update_method", &self.update_method)
            .field("timestamp_unit", &self.timestamp_unit)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteConfig {
    /// Create a remote configuration with default paths and timeouts
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = normalize_text_option(Some(base_url.into()))
            .ok_or(ConfigError::MissingVar("PROMPTLIB_API_URL"))?;
        if !is_http_url(&base_url) {
            return Err(ConfigError::Invalid(
                "PROMPTLIB_API_URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            records_path: DEFAULT_RECORDS_PATH.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            auth_token: None,
            update_method: UpdateMethod::default(),
            timestamp_unit: TimestampUnit::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Set the bearer token
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = normalize_text_option(Some(token.into()));
        self
    }

    /// Set the path segment between base URL and collection
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = path.into().trim_matches('/').to_string();
        self
    }

    /// Set the remote collection name
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    #[must_use]
    pub const fn with_update_method(mut self, method: UpdateMethod) -> Self {
        self.update_method = method;
        self
    }

    #[must_use]
    pub const fn with_timestamp_unit(mut self, unit: TimestampUnit) -> Self {
        self.timestamp_unit = unit;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the collection endpoint
    pub fn collection_url(&self) -> String {
        if self.records_path.is_empty() {
            format!("{}/{}", self.base_url, self.collection)
        } else {
            format!("{}/{}/{}", self.base_url, self.records_path, self.collection)
        }
    }
}

/// Everything needed to open a [`crate::PromptLibrary`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Local SQLite database file
    pub db_path: PathBuf,
    /// Remote record API; `None` runs in local-only mode
    pub remote: Option<RemoteConfig>,
}

impl LibraryConfig {
    /// Local-only configuration for the given database path
    pub fn local(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            remote: None,
        }
    }

    /// Attach a remote configuration
    #[must_use]
    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = optional_trimmed(&lookup, "PROMPTLIB_DB_PATH")
            .map_or_else(default_db_path, PathBuf::from);

        let remote = match optional_trimmed(&lookup, "PROMPTLIB_API_URL") {
            Some(url) => Some(remote_from_lookup(&lookup, url)?),
            None => None,
        };

        Ok(Self { db_path, remote })
    }
}

fn remote_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
    url: String,
) -> Result<RemoteConfig, ConfigError> {
    let mut remote = RemoteConfig::new(url)?
        .with_collection(value_or_default(
            lookup,
            "PROMPTLIB_COLLECTION",
            DEFAULT_COLLECTION,
        ))
        .with_records_path(value_or_default(
            lookup,
            "PROMPTLIB_RECORDS_PATH",
            DEFAULT_RECORDS_PATH,
        ));

    if let Some(token) = optional_trimmed(lookup, "PROMPTLIB_API_TOKEN") {
        remote = remote.with_auth_token(token);
    }

    let update_method = match value_or_default(lookup, "PROMPTLIB_UPDATE_METHOD", "patch")
        .to_ascii_lowercase()
        .as_str()
    {
        "patch" => UpdateMethod::Patch,
        "put" => UpdateMethod::Put,
        other => {
            return Err(ConfigError::Invalid(format!(
                "PROMPTLIB_UPDATE_METHOD must be `patch` or `put`, got `{other}`"
            )))
        }
    };

    let timestamp_unit = match value_or_default(lookup, "PROMPTLIB_TIMESTAMP_UNIT", "seconds")
        .to_ascii_lowercase()
        .as_str()
    {
        "seconds" | "s" => TimestampUnit::Seconds,
        "millis" | "ms" => TimestampUnit::Millis,
        other => {
            return Err(ConfigError::Invalid(format!(
                "PROMPTLIB_TIMESTAMP_UNIT must be `seconds` or `millis`, got `{other}`"
            )))
        }
    };

    let timeout_secs = value_or_default(
        lookup,
        "PROMPTLIB_HTTP_TIMEOUT_SECS",
        &DEFAULT_TIMEOUT_SECS.to_string(),
    )
    .parse::<u64>()
    .map_err(|_| {
        ConfigError::Invalid("PROMPTLIB_HTTP_TIMEOUT_SECS must be an integer in [1, 300]".into())
    })?;
    if !(1..=300).contains(&timeout_secs) {
        return Err(ConfigError::Invalid(
            "PROMPTLIB_HTTP_TIMEOUT_SECS must be in [1, 300]".to_string(),
        ));
    }

    Ok(remote
        .with_update_method(update_method)
        .with_timestamp_unit(timestamp_unit)
        .with_timeout(Duration::from_secs(timeout_secs)))
}

/// Default location of the local database file
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptlib")
        .join("prompts.db")
}

fn optional_trimmed(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    normalize_text_option(lookup(name))
}

fn value_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}
