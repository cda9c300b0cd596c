//! Update transaction engine
//!
//! The engine drives one update transaction end to end:
//!
//! ```text
//! Init ──▶ Connected ──▶ LoggedIn ──▶ Updated ──▶ LoggedOut
//!   │          │             │           │
//!   └──────────┴─────────────┴───────────┴──▶ Failed
//! ```
//!
//! ## Failure policy
//!
//! A command rejected after the session is up triggers one best-effort
//! LOGOUT on the same connection before the original failure propagates;
//! the compensating logout's own outcome is discarded and can never mask
//! the triggering error. Transport faults skip the compensation (the
//! connection is already unusable) and propagate directly. Nothing is
//! retried, and the session is released exactly once on every exit path.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::proto::Command;
use crate::traits::{CommandSession, SessionConnector};
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, info, warn};

/// Progress of a single update transaction, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
    Init,
    Connected,
    LoggedIn,
    Updated,
    LoggedOut,
    Failed,
}

/// Drives the login → update → logout transaction
///
/// Owns the connector and the credentials; each [`UpdateEngine::run`] call
/// is one independent transaction on its own session. The engine holds no
/// mutable state, so independent transactions may run concurrently from
/// separate engine instances.
pub struct UpdateEngine {
    /// Opens one session per transaction
    connector: Box<dyn SessionConnector>,

    /// Account user id
    user_id: String,

    /// Account password
    password: String,
}

impl UpdateEngine {
    /// Create an engine from a connector and credentials
    pub fn new(connector: Box<dyn SessionConnector>, config: &ClientConfig) -> Self {
        Self {
            connector,
            user_id: config.user_id.clone(),
            password: config.password.clone(),
        }
    }

    /// Run one update transaction
    ///
    /// Validates the inputs first; a validation failure never opens a
    /// connection. The address must be IPv4; the protocol has no record
    /// type for anything else.
    pub async fn run(&self, host_name: &str, domain_name: &str, address: IpAddr) -> Result<()> {
        let address = validate_inputs(host_name, domain_name, address)?;

        let mut session = self.connector.connect().await.inspect_err(|e| {
            warn!(state = ?TransactionState::Init, "session setup failed: {}", e);
        })?;
        debug!(state = ?TransactionState::Connected, host_name, domain_name, "starting transaction");

        let outcome = self
            .run_commands(session.as_mut(), host_name, domain_name, address)
            .await;

        // Sole release point once a session exists; close is idempotent.
        session.close().await;

        match &outcome {
            Ok(()) => info!(host_name, domain_name, %address, "update committed"),
            Err(e) => warn!(state = ?TransactionState::Failed, "transaction failed: {}", e),
        }
        outcome
    }

    async fn run_commands(
        &self,
        session: &mut dyn CommandSession,
        host_name: &str,
        domain_name: &str,
        address: Ipv4Addr,
    ) -> Result<()> {
        let login = Command::Login {
            user_id: self.user_id.clone(),
            password: self.password.clone(),
        };
        self.checked(session, &login, TransactionState::LoggedIn)
            .await?;

        let modify = Command::ModifyIp {
            host_name: host_name.to_string(),
            domain_name: domain_name.to_string(),
            address,
        };
        self.checked(session, &modify, TransactionState::Updated)
            .await?;

        // The closing LOGOUT is a real protocol step: its failure is the
        // transaction's outcome, with no further compensation behind it.
        let response = session.send_command(&Command::Logout).await?;
        if response.code.is_success() {
            debug!(state = ?TransactionState::LoggedOut, "transaction complete");
            Ok(())
        } else {
            Err(Error::command(response.code))
        }
    }

    /// Send a command and require success, compensating on rejection
    async fn checked(
        &self,
        session: &mut dyn CommandSession,
        command: &Command,
        next: TransactionState,
    ) -> Result<()> {
        let response = session.send_command(command).await?;
        if response.code.is_success() {
            debug!(command = command.name(), state = ?next, "command accepted");
            return Ok(());
        }

        warn!(
            command = command.name(),
            code = response.code.as_i32(),
            "command rejected"
        );
        logout_discarding_outcome(session).await;
        Err(Error::command(response.code))
    }
}

/// Best-effort LOGOUT after a failed command, fire and forget
///
/// The server may already consider the session dead, so whatever comes
/// back (a rejection, a transport fault) is logged at debug level and
/// discarded. The triggering failure is what the caller propagates.
async fn logout_discarding_outcome(session: &mut dyn CommandSession) {
    match session.send_command(&Command::Logout).await {
        Ok(response) if !response.code.is_success() => {
            debug!(
                code = response.code.as_i32(),
                "compensating logout rejected; outcome discarded"
            );
        }
        Ok(_) => debug!("compensating logout accepted"),
        Err(e) => debug!("compensating logout failed; outcome discarded: {}", e),
    }
}

/// Check the update arguments before any network activity
fn validate_inputs(host_name: &str, domain_name: &str, address: IpAddr) -> Result<Ipv4Addr> {
    validate_field("host name", host_name)?;
    validate_field("domain name", domain_name)?;
    match address {
        IpAddr::V4(v4) => Ok(v4),
        IpAddr::V6(_) => Err(Error::invalid_input(
            "only IPv4 addresses can be published",
        )),
    }
}

/// Field values are interpolated into protocol lines; an embedded line
/// break could smuggle a bare-dot terminator into the command block.
fn validate_field(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_input(format!("{} cannot be empty", what)));
    }
    if value.contains(['\r', '\n']) {
        return Err(Error::invalid_input(format!(
            "{} must not contain line breaks",
            what
        )));
    }
    Ok(())
}
