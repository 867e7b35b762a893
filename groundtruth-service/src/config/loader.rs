//! Configuration loading from files and environment variables.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};

use super::static_config::{
    AssetsConfig, ServerConfig, default_assets, default_server,
};
use super::{
    AppConfig, CollaboratorConfig, SessionConfig, default_collaborator_url, default_model,
    default_request_timeout_secs,
};

/// Internal struct for loading fields from config sources
#[derive(Debug, Deserialize)]
struct ConfigLoader {
    #[serde(default = "default_server")]
    server: ServerConfig,

    #[serde(default = "default_assets")]
    assets: AssetsConfig,

    #[serde(default)]
    collaborator: CollaboratorLoader,

    #[serde(default)]
    session: SessionConfig,
}

/// Collaborator settings with the key still in plain form
#[derive(Debug, Deserialize)]
struct CollaboratorLoader {
    #[serde(default = "default_collaborator_url")]
    base_url: String,

    #[serde(default = "default_model")]
    model: String,

    #[serde(default)]
    api_key: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

impl Default for CollaboratorLoader {
    fn default() -> Self {
        Self {
            base_url: default_collaborator_url(),
            model: default_model(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Load configuration from the optional config file and the process environment
pub fn load_config() -> ServiceResult<AppConfig> {
    let builder = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("GROUNDTRUTH")
                .separator("__")
                .try_parsing(true),
        );

    assemble(
        builder,
        std::env::var("PORT").ok(),
        std::env::var("API_KEY").ok(),
    )
}

/// Apply the flat `PORT`/`API_KEY` overrides and deserialize
fn assemble(
    builder: ConfigBuilder<DefaultState>,
    port: Option<String>,
    api_key: Option<String>,
) -> ServiceResult<AppConfig> {
    let loader: ConfigLoader = builder
        .set_override_option("server.port", port)
        .and_then(|b| b.set_override_option("collaborator.api_key", api_key))
        .and_then(|b| b.build())
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to deserialize config: {}", e),
        })?;

    let collaborator = loader.collaborator;
    Ok(AppConfig {
        server: loader.server,
        assets: loader.assets,
        collaborator: CollaboratorConfig {
            base_url: collaborator.base_url,
            model: collaborator.model,
            api_key: collaborator
                .api_key
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
            request_timeout_secs: collaborator.request_timeout_secs,
        },
        session: loader.session,
    })
}
