//! Configuration types for the update client
//!
//! This module defines the configuration structure consumed by the facade
//! and the TLS transport.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default update server host name
pub const DEFAULT_SERVER: &str = "ddnsclient.onamae.com";

/// Default update server TLS port
pub const DEFAULT_PORT: u16 = 65010;

/// Default per-operation read/write timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client configuration
///
/// Credentials, target endpoint, and per-operation timeouts. A session is
/// created from this configuration per transaction; nothing here is mutated
/// by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Account user id
    pub user_id: String,

    /// Account password
    pub password: String,

    /// Update server host name
    #[serde(default = "default_server")]
    pub server: String,

    /// Update server TLS port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout applied to each read operation, in seconds
    #[serde(default = "default_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Timeout applied to each write operation, in seconds; also bounds the
    /// TCP connect and the TLS handshake
    #[serde(default = "default_timeout_secs")]
    pub write_timeout_secs: u64,

    /// Accept any server certificate without validation
    ///
    /// The production update server presents a certificate that does not
    /// chain to a public root, so this defaults to `true`. Set it to
    /// `false` to require WebPKI validation.
    #[serde(default = "default_insecure_skip_verify")]
    pub insecure_skip_verify: bool,
}

impl ClientConfig {
    /// Create a configuration with the given credentials and all defaults
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
            server: default_server(),
            port: default_port(),
            read_timeout_secs: default_timeout_secs(),
            write_timeout_secs: default_timeout_secs(),
            insecure_skip_verify: default_insecure_skip_verify(),
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "cannot read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| Error::config(format!("invalid config file: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_credential("user_id", &self.user_id)?;
        validate_credential("password", &self.password)?;

        if self.server.is_empty() {
            return Err(Error::config("server cannot be empty"));
        }
        if self.port == 0 {
            return Err(Error::config("port cannot be 0"));
        }
        if self.read_timeout_secs == 0 || self.write_timeout_secs == 0 {
            return Err(Error::config("timeouts must be at least 1 second"));
        }

        Ok(())
    }

    /// Per-operation read timeout
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Per-operation write timeout
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

/// Credentials are interpolated into protocol lines, so a value with an
/// embedded line break could smuggle a bare-dot terminator into a block.
/// Rejected here instead of silently corrupting the framing.
fn validate_credential(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::config(format!("{} cannot be empty", name)));
    }
    if value.contains(['\r', '\n']) {
        return Err(Error::config(format!(
            "{} must not contain line breaks",
            name
        )));
    }
    Ok(())
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_insecure_skip_verify() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("user01", "secret");
        assert_eq!(config.server, DEFAULT_SERVER);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.read_timeout(), Duration::from_secs(60));
        assert_eq!(config.write_timeout(), Duration::from_secs(60));
        assert!(config.insecure_skip_verify);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(ClientConfig::new("", "secret").validate().is_err());
        assert!(ClientConfig::new("user01", "").validate().is_err());
    }

    #[test]
    fn test_credentials_with_line_breaks_rejected() {
        let config = ClientConfig::new("user01", "pass\nword");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ClientConfig::new("user01", "secret");
        config.read_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_defaults_fill_in() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"user_id":"user01","password":"secret"}"#).unwrap();
        assert_eq!(config.server, DEFAULT_SERVER);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.insecure_skip_verify);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"user_id":"user01","password":"secret","port":7070,"insecure_skip_verify":false}}"#
        )
        .unwrap();

        let config = ClientConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.port, 7070);
        assert!(!config.insecure_skip_verify);
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = ClientConfig::from_json_file("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
