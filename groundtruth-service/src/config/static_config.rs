//! Settings that affect server binding and asset serving.

use serde::Deserialize;
use std::path::PathBuf;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Built browser UI location
#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

impl AssetsConfig {
    /// Entry document served for client-side routes
    pub fn index_path(&self) -> PathBuf {
        self.dist_dir.join("index.html")
    }
}

// ==================== Default Value Functions ====================

pub(crate) fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

pub(crate) fn default_assets() -> AssetsConfig {
    AssetsConfig {
        dist_dir: default_dist_dir(),
    }
}

pub(crate) fn default_dist_dir() -> PathBuf {
    PathBuf::from("./dist")
}
