//! TOML file configuration structures.
//!
//! These structs directly map to the `ewaste-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Absent means decision emails are only logged.
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:5000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Directory uploaded item images are written to and served from.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Largest accepted request body, multipart uploads included.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Origins allowed by CORS. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 5000))
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// Database pool section. The connection string itself comes from `DATABASE_URL`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

/// SMTP relay used for decision emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: String,
    /// Overridden by `SMTP_PASSWORD` when that is set.
    #[serde(default)]
    pub password: String,
    pub from_address: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "E-Waste Management".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}
