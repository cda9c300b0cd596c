//! Public client facade
//!
//! [`DdnsClient`] is the single entry point for callers: it validates the
//! configuration up front, builds the TLS connector, and exposes the one
//! operation the protocol supports. Every failure surfaces as the library
//! [`Error`] type; a protocol rejection keeps its response code reachable
//! through [`Error::response_code`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use onamae_client::{ClientConfig, DdnsClient};
//!
//! #[tokio::main]
//! async fn main() -> onamae_client::Result<()> {
//!     let config = ClientConfig::new("user01", "secret");
//!     let client = DdnsClient::from_config(config)?;
//!     client
//!         .update("www", "example.jp", "203.0.113.7".parse().unwrap())
//!         .await?;
//!     Ok(())
//! }
//! ```

use crate::config::ClientConfig;
use crate::engine::UpdateEngine;
use crate::error::Result;
use crate::session::TlsSessionConnector;
use crate::traits::SessionConnector;
use std::net::IpAddr;

/// Dynamic-DNS update client
///
/// One client may perform any number of updates; each call runs as an
/// independent transaction on its own connection, so a client shared
/// behind an `Arc` can serve concurrent callers without locking.
pub struct DdnsClient {
    engine: UpdateEngine,
}

impl DdnsClient {
    /// Build a client over the TLS transport
    ///
    /// Fails if the configuration does not validate; nothing is connected
    /// yet.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let connector = Box::new(TlsSessionConnector::new(config.clone()));
        Ok(Self {
            engine: UpdateEngine::new(connector, &config),
        })
    }

    /// Build a client over a caller-supplied transport
    ///
    /// Used by contract tests to substitute scripted sessions, and by
    /// embedders with their own transport stack.
    pub fn with_connector(config: ClientConfig, connector: Box<dyn SessionConnector>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: UpdateEngine::new(connector, &config),
        })
    }

    /// Point `host_name.domain_name` at `address`
    ///
    /// Runs the whole login → update → logout exchange as one transaction.
    /// `address` must be IPv4; anything else is an input error reported
    /// before any connection is opened.
    pub async fn update(&self, host_name: &str, domain_name: &str, address: IpAddr) -> Result<()> {
        self.engine.run(host_name, domain_name, address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = ClientConfig::new("", "secret");
        assert!(DdnsClient::from_config(config).is_err());
    }

    #[test]
    fn test_valid_config_accepted() {
        let config = ClientConfig::new("user01", "secret");
        assert!(DdnsClient::from_config(config).is_ok());
    }
}
