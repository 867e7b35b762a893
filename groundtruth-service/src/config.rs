//! Service configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional `config` file
//! (`config.toml`, `config.yaml`, ...), `GROUNDTRUTH__<section>__<key>` environment
//! variables, then the flat `PORT` and `API_KEY` variables used by container hosts.

mod loader;
mod static_config;

pub use loader::load_config;
pub use static_config::{AssetsConfig, ServerConfig};

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Complete service configuration
#[derive(Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub assets: AssetsConfig,
    pub collaborator: CollaboratorConfig,
    pub session: SessionConfig,
}

/// Chat collaborator (Gemini) configuration
#[derive(Debug)]
pub struct CollaboratorConfig {
    pub base_url: String,
    pub model: String,
    /// Absent when no credential is configured; turns then fail without a request
    pub api_key: Option<SecretString>,
    pub request_timeout_secs: u64,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_collaborator_url(),
            model: default_model(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// In-memory session lifetime
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Sessions untouched for this long are evicted
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,

    /// Run eviction every N seconds
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

// ==================== Default Value Functions ====================

pub(crate) fn default_collaborator_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

pub(crate) fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    120
}

pub(crate) fn default_session_ttl_secs() -> u64 {
    6 * 60 * 60
}

pub(crate) fn default_cleanup_interval_secs() -> u64 {
    300
}
