// # onamae-client
//
// Client library for the Onamae dynamic-DNS update protocol: a
// line-oriented, dot-terminated ASCII protocol carried over TLS.
//
// ## Architecture Overview
//
// - **proto**: typed commands and responses and their wire text form
// - **session**: TLS transport with dot-terminated block framing
// - **engine**: the login → update → logout transaction and its
//   compensating-logout failure policy
// - **client**: the public facade (input validation, configuration, one
//   uniform error type)
//
// ## Design Principles
//
// 1. **One transaction per session**: a session is created, driven, and
//    released within a single update call
// 2. **Closed command set**: adding a command kind is a compile-time change
// 3. **Traits at the transport seam**: contract tests script the session,
//    production uses TLS
// 4. **Release exactly once**: every exit path closes the session; double
//    release is a no-op

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod proto;
pub mod session;
pub mod traits;

// Re-export core types for convenience
pub use client::DdnsClient;
pub use config::ClientConfig;
pub use engine::UpdateEngine;
pub use error::{Error, Result};
pub use proto::{Command, Response, ResponseCode};
pub use session::{TlsSession, TlsSessionConnector};
pub use traits::{CommandSession, SessionConnector};
