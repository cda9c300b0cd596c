//! Test doubles and common utilities for transaction contract tests
//!
//! The doubles script the server side of the exchange: a connect outcome
//! and a queue of per-command replies. Everything observable (commands
//! sent, sessions opened, sessions closed) is recorded through shared
//! counters so tests can assert on ordering and resource discipline.

use async_trait::async_trait;
use onamae_client::ClientConfig;
use onamae_client::error::{Error, Result};
use onamae_client::proto::{Command, Response, ResponseCode};
use onamae_client::traits::{CommandSession, SessionConnector};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A minimal valid configuration for driving the facade in tests
pub fn test_config() -> ClientConfig {
    ClientConfig::new("user01", "secret")
}

/// Shared record of everything the scripted transport observed
#[derive(Default)]
pub struct SessionLog {
    /// Command verbs in send order
    sent: Mutex<Vec<String>>,
    /// Number of close() calls across all sessions
    close_count: AtomicUsize,
}

impl SessionLog {
    /// Command verbs sent so far, in order
    pub fn sent_commands(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// How many times a session was closed
    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}

/// Scripted reply to a single command
pub enum ScriptedReply {
    /// Answer `0 OK`
    Accept,
    /// Answer with the given non-success code
    Reject(ResponseCode),
    /// Fail the exchange at the transport level
    TransportError,
}

/// Scripted outcome for one connect() call
pub enum ConnectScript {
    /// Session established; commands answered from the reply queue
    /// (an exhausted queue keeps answering `0 OK`)
    Accept(Vec<ScriptedReply>),
    /// Greeting carried a non-success code; no session value is produced
    Refuse(ResponseCode),
    /// Socket-level failure during setup
    Fail,
}

/// A session whose replies come from a script
pub struct ScriptedSession {
    replies: VecDeque<ScriptedReply>,
    log: Arc<SessionLog>,
}

#[async_trait]
impl CommandSession for ScriptedSession {
    async fn send_command(&mut self, command: &Command) -> Result<Response> {
        self.log
            .sent
            .lock()
            .unwrap()
            .push(command.name().to_string());

        match self.replies.pop_front().unwrap_or(ScriptedReply::Accept) {
            ScriptedReply::Accept => Ok(Response::parse(&["0 OK".to_string()])),
            ScriptedReply::Reject(code) => Ok(Response::parse(&[format!(
                "{} scripted rejection",
                code.as_i32()
            )])),
            ScriptedReply::TransportError => Err(Error::from(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "scripted transport failure",
            ))),
        }
    }

    async fn close(&mut self) {
        self.log.close_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// A connector whose connect() outcomes come from a script
pub struct ScriptedConnector {
    script: Mutex<VecDeque<ConnectScript>>,
    connect_count: Arc<AtomicUsize>,
    log: Arc<SessionLog>,
}

impl ScriptedConnector {
    /// Create a connector with a queue of connect outcomes
    ///
    /// Returns the connector plus the shared log and connect counter the
    /// test keeps for assertions.
    pub fn new(script: Vec<ConnectScript>) -> (Self, Arc<SessionLog>, Arc<AtomicUsize>) {
        let log = Arc::new(SessionLog::default());
        let connect_count = Arc::new(AtomicUsize::new(0));
        let connector = Self {
            script: Mutex::new(VecDeque::from(script)),
            connect_count: Arc::clone(&connect_count),
            log: Arc::clone(&log),
        };
        (connector, log, connect_count)
    }

    /// Convenience for the common one-transaction case
    pub fn single(outcome: ConnectScript) -> (Self, Arc<SessionLog>, Arc<AtomicUsize>) {
        Self::new(vec![outcome])
    }
}

#[async_trait]
impl SessionConnector for ScriptedConnector {
    async fn connect(&self) -> Result<Box<dyn CommandSession>> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("connect() called more times than scripted");

        match next {
            ConnectScript::Accept(replies) => Ok(Box::new(ScriptedSession {
                replies: VecDeque::from(replies),
                log: Arc::clone(&self.log),
            })),
            ConnectScript::Refuse(code) => Err(Error::command(code)),
            ConnectScript::Fail => Err(Error::from(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "scripted connect failure",
            ))),
        }
    }
}
