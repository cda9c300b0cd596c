//! Wire protocol types and their text encoding
//!
//! The update protocol is line-oriented ASCII. A client command is a short
//! sequence of content lines; the transport appends the dot terminator. A
//! server response is a block of lines whose joined text starts with an
//! integer code, a space, and an optional message.
//!
//! Everything in this module is pure: encoding produces lines, parsing
//! consumes lines, and neither touches the network.

use std::fmt;
use std::net::Ipv4Addr;

/// A protocol command, immutable once constructed
///
/// The command set is closed. Each variant encodes to a fixed line sequence
/// via [`Command::to_lines`]; the dot terminator is owned by the transport
/// write path, not by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Authenticate the session
    Login {
        /// Account user id
        user_id: String,
        /// Account password
        password: String,
    },

    /// Point `host_name.domain_name` at a new IPv4 address
    ModifyIp {
        /// Host label(s) within the domain
        host_name: String,
        /// Registered domain name
        domain_name: String,
        /// New record value
        address: Ipv4Addr,
    },

    /// End the session
    Logout,
}

impl Command {
    /// Encode this command into its ordered wire line sequence
    ///
    /// No line produced here is ever a single dot: every field value is
    /// prefixed with its key. Field values containing line breaks would
    /// still corrupt the framing; rejecting those is the caller's input
    /// validation, not the codec's.
    pub fn to_lines(&self) -> Vec<String> {
        match self {
            Command::Login { user_id, password } => vec![
                "LOGIN".to_string(),
                format!("USERID:{}", user_id),
                format!("PASSWORD:{}", password),
            ],
            Command::ModifyIp {
                host_name,
                domain_name,
                address,
            } => vec![
                "MODIP".to_string(),
                format!("HOSTNAME:{}", host_name),
                format!("DOMNAME:{}", domain_name),
                format!("IPV4:{}", address),
            ],
            Command::Logout => vec!["LOGOUT".to_string()],
        }
    }

    /// The command verb, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "LOGIN",
            Command::ModifyIp { .. } => "MODIP",
            Command::Logout => "LOGOUT",
        }
    }
}

/// Response code space
///
/// Zero is success; positive values are server-defined failures. The two
/// negative values never cross the wire: they are produced locally when a
/// response block is missing or cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// Response block could not be parsed (client-local sentinel, -2)
    InvalidResponse,
    /// No response block was received before end-of-stream (client-local
    /// sentinel, -1)
    NoResponse,
    /// Command accepted (0)
    Success,
    /// Generic server failure (1)
    Error,
    /// Authentication failed (2)
    LoginError,
    /// Server-side database failure (3)
    DbError,
    /// Submitted address rejected (4)
    InvalidIpAddress,
    /// Server-side connection failure (5)
    ConnectionError,
    /// Host or domain name rejected (6)
    InvalidHostOrDomain,
    /// A code outside the documented set
    Other(i32),
}

impl ResponseCode {
    /// Map a wire integer onto the known code space
    pub fn from_wire(code: i32) -> Self {
        match code {
            -2 => ResponseCode::InvalidResponse,
            -1 => ResponseCode::NoResponse,
            0 => ResponseCode::Success,
            1 => ResponseCode::Error,
            2 => ResponseCode::LoginError,
            3 => ResponseCode::DbError,
            4 => ResponseCode::InvalidIpAddress,
            5 => ResponseCode::ConnectionError,
            6 => ResponseCode::InvalidHostOrDomain,
            other => ResponseCode::Other(other),
        }
    }

    /// The numeric value of this code
    pub fn as_i32(self) -> i32 {
        match self {
            ResponseCode::InvalidResponse => -2,
            ResponseCode::NoResponse => -1,
            ResponseCode::Success => 0,
            ResponseCode::Error => 1,
            ResponseCode::LoginError => 2,
            ResponseCode::DbError => 3,
            ResponseCode::InvalidIpAddress => 4,
            ResponseCode::ConnectionError => 5,
            ResponseCode::InvalidHostOrDomain => 6,
            ResponseCode::Other(code) => code,
        }
    }

    /// Whether this code denotes success
    pub fn is_success(self) -> bool {
        self == ResponseCode::Success
    }

    fn describe(self) -> &'static str {
        match self {
            ResponseCode::InvalidResponse => "invalid response",
            ResponseCode::NoResponse => "no response",
            ResponseCode::Success => "success",
            ResponseCode::Error => "error",
            ResponseCode::LoginError => "login error",
            ResponseCode::DbError => "database error",
            ResponseCode::InvalidIpAddress => "invalid ip address",
            ResponseCode::ConnectionError => "connection error",
            ResponseCode::InvalidHostOrDomain => "invalid host or domain name",
            ResponseCode::Other(_) => "unrecognized code",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_i32(), self.describe())
    }
}

/// A parsed server response
///
/// Produced only by [`Response::parse`]; callers never construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Parsed response code (or a client-local sentinel)
    pub code: ResponseCode,
    /// Message text after the code; may be empty
    pub message: String,
}

impl Response {
    /// Parse a received block into a response
    ///
    /// An empty block yields [`ResponseCode::NoResponse`]. A block whose
    /// joined text has no space, starts with a space, or has a non-integer
    /// prefix yields [`ResponseCode::InvalidResponse`] with the raw joined
    /// text as the message. This never fails: malformed input becomes a
    /// sentinel code the orchestrator treats like any other non-success.
    pub fn parse(lines: &[String]) -> Self {
        if lines.is_empty() {
            return Self {
                code: ResponseCode::NoResponse,
                message: String::new(),
            };
        }

        let text = lines.join("\n");
        match text.find(' ') {
            Some(at) if at > 0 => match text[..at].parse::<i32>() {
                Ok(code) => Self {
                    code: ResponseCode::from_wire(code),
                    message: text[at + 1..].to_string(),
                },
                Err(_) => Self {
                    code: ResponseCode::InvalidResponse,
                    message: text,
                },
            },
            _ => Self {
                code: ResponseCode::InvalidResponse,
                message: text,
            },
        }
    }
}
