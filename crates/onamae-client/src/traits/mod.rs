//! Trait definitions for the session seam
//!
//! The transaction engine talks to the server through these traits so that
//! contract tests can substitute scripted sessions for the TLS transport.

pub mod session;

pub use session::{CommandSession, SessionConnector};
