//! Configuration module for ewaste-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::{EmailConfig, FileConfig};
use ewaste_core::notifier::SmtpSettings;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable that replaces `[email] password`.
pub const SMTP_PASSWORD_ENV: &str = "SMTP_PASSWORD";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Settings the server needs after loading.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub allowed_origins: Vec<String>,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub max_connections: u32,
    /// `None` selects the log-only notifier.
    pub email: Option<SmtpSettings>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI and environment overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content, std::env::var(SMTP_PASSWORD_ENV).ok())
    }

    fn load_str(
        &self,
        config_content: &str,
        smtp_password: Option<String>,
    ) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }
        if let (Some(email), Some(password)) = (file_config.email.as_mut(), smtp_password) {
            email.password = password;
        }

        validate(&file_config)?;
        Ok(build_loaded_config(file_config))
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.server.max_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_upload_bytes must be greater than zero".to_string(),
        ));
    }
    if config.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }
    if let Some(email) = &config.email {
        if email.smtp_port == 0 {
            return Err(ConfigError::ValidationError(
                "email.smtp_port must not be zero".to_string(),
            ));
        }
        if !email.from_address.contains('@') {
            return Err(ConfigError::ValidationError(format!(
                "email.from_address {:?} is not an email address",
                email.from_address
            )));
        }
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
            upload_dir: file_config.server.upload_dir,
            max_upload_bytes: file_config.server.max_upload_bytes,
            allowed_origins: file_config.server.allowed_origins,
        },
        max_connections: file_config.database.max_connections,
        email: file_config.email.map(convert_email),
    }
}

fn convert_email(e: EmailConfig) -> SmtpSettings {
    SmtpSettings {
        server: e.smtp_server,
        port: e.smtp_port,
        username: e.username,
        password: e.password,
        from_address: e.from_address,
        from_name: e.from_name,
        timeout: Duration::from_secs(e.timeout_secs),
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WITH_EMAIL: &str = r#"
[server]
listen = "127.0.0.1:3000"

[email]
smtp_server = "smtp.example.com"
username = "mailer"
password = "from-file"
from_address = "noreply@example.com"
"#;

    fn loader(listen: Option<SocketAddr>) -> ConfigLoader {
        ConfigLoader::new("./ewaste-config.toml", listen)
    }

    #[test]
    fn test_listen_override_wins() {
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let loaded = loader(Some(addr)).load_str(WITH_EMAIL, None).unwrap();
        assert_eq!(loaded.server.listen, addr);
    }

    #[test]
    fn test_smtp_password_env_overrides_file() {
        let loaded = loader(None)
            .load_str(WITH_EMAIL, Some("from-env".to_string()))
            .unwrap();
        assert_eq!(loaded.email.unwrap().password, "from-env");

        let loaded = loader(None).load_str(WITH_EMAIL, None).unwrap();
        assert_eq!(loaded.email.unwrap().password, "from-file");
    }

    #[test]
    fn test_missing_email_section_means_no_smtp() {
        let loaded = loader(None)
            .load_str("", Some("ignored".to_string()))
            .unwrap();
        assert!(loaded.email.is_none());
    }

    #[test]
    fn test_rejects_sender_without_at_sign() {
        let config = WITH_EMAIL.replace("noreply@example.com", "noreply");
        assert!(matches!(
            loader(None).load_str(&config, None),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_zero_upload_limit() {
        let config = "[server]\nmax_upload_bytes = 0\n";
        assert!(matches!(
            loader(None).load_str(config, None),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
