// # Session Traits
//
// Defines the interface between the transaction engine and the transport.
//
// ## Implementations
//
// - TLS transport: `crate::session::{TlsSession, TlsSessionConnector}`
// - Scripted doubles: `tests/common/mod.rs`

use crate::error::Result;
use crate::proto::{Command, Response};
use async_trait::async_trait;

/// A connected protocol session
///
/// A session value exists only after a successful connect (the greeting has
/// already been read and checked). It owns its connection exclusively; the
/// engine drives it from a single task, so no internal locking is required.
///
/// # Lifecycle
///
/// `close()` releases the underlying connection. It must be safe to call
/// more than once: the first call releases, later calls are no-ops. A
/// command sent after `close()` is an invalid-state error, not a protocol
/// error.
#[async_trait]
pub trait CommandSession: Send {
    /// Send one command and read exactly one response block
    async fn send_command(&mut self, command: &Command) -> Result<Response>;

    /// Release the underlying connection
    async fn close(&mut self);
}

/// Opens sessions for the transaction engine
///
/// `connect()` performs the full session setup including the mandatory
/// greeting exchange: a returned session is ready for LOGIN. A non-success
/// greeting or any setup fault is reported here, with all partially
/// acquired resources already released.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Open a new session
    async fn connect(&self) -> Result<Box<dyn CommandSession>>;
}
