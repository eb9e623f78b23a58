//! Configuration management for the marketplace client.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Local persistence configuration
    pub storage: StorageConfig,
    /// Log filter (trace, debug, info, warn, error or an `EnvFilter` directive)
    pub log_level: String,
}

/// Backend API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, without a trailing slash
    pub base_url: String,
    /// Request timeout in seconds, also bounding how long the facade waits
    /// for a collaborator result
    pub request_timeout: u64,
}

impl ApiConfig {
    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Local persistence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing [`FileStorage`](crate::FileStorage); in-memory when unset
    pub path: Option<PathBuf>,
    /// Key the session token is stored under
    pub token_key: String,
    /// Key the favorites array is stored under
    pub favorites_key: String,
}

/// Default storage key for the session token
pub const DEFAULT_TOKEN_KEY: &str = "auth_token";

/// Default storage key for favorites
pub const DEFAULT_FAVORITES_KEY: &str = "favorites";

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `MARQUEE_API_URL` | `http://localhost:3000/api` |
    /// | `MARQUEE_REQUEST_TIMEOUT` | `30` (seconds) |
    /// | `MARQUEE_STORAGE_PATH` | unset (in-memory) |
    /// | `MARQUEE_TOKEN_KEY` | `auth_token` |
    /// | `MARQUEE_FAVORITES_KEY` | `favorites` |
    /// | `RUST_LOG` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api: ApiConfig {
                base_url: lookup("MARQUEE_API_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| "http://localhost:3000/api".to_string()),
                request_timeout: lookup("MARQUEE_REQUEST_TIMEOUT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            storage: StorageConfig {
                path: lookup("MARQUEE_STORAGE_PATH")
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from),
                token_key: lookup("MARQUEE_TOKEN_KEY")
                    .unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string()),
                favorites_key: lookup("MARQUEE_FAVORITES_KEY")
                    .unwrap_or_else(|| DEFAULT_FAVORITES_KEY.to_string()),
            },
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
