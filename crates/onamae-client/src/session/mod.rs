//! TLS transport session
//!
//! Owns the layered connection resources, acquired in sequence:
//!
//! ```text
//! TCP socket ──▶ TLS stream ──▶ block framing (read half / write half)
//! ```
//!
//! All of them are released together, exactly once: either when a
//! partial acquisition fails during [`TlsSession::connect`] (the
//! half-built value is dropped before the error propagates) or when the
//! engine calls `close()`. A second `close()` is a no-op.
//!
//! The server speaks first: one greeting block arrives immediately after
//! the handshake, and a non-success greeting tears the session down before
//! any command is sent.

pub mod framing;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::proto::{Command, Response};
use crate::traits::{CommandSession, SessionConnector};
use async_trait::async_trait;
use framing::BlockStream;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::WebPkiSupportedAlgorithms;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// A connected TLS session
///
/// Created only by [`TlsSession::connect`], so an unconnected session value
/// cannot exist. After `close()` the stream is gone and further commands
/// report [`Error::InvalidState`].
pub struct TlsSession {
    stream: Option<BlockStream<tokio_rustls::client::TlsStream<TcpStream>>>,
}

impl TlsSession {
    /// Open a socket, perform the TLS handshake, and read the greeting
    ///
    /// The write timeout bounds the TCP connect and the handshake; the
    /// read timeout bounds the greeting. On any failure the partially
    /// acquired resources are dropped before the error is returned.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        debug!(server = %config.server, port = config.port, "connecting");

        let tcp = timeout(
            config.write_timeout(),
            TcpStream::connect((config.server.as_str(), config.port)),
        )
        .await
        .map_err(|_| Error::timeout("TCP connect"))??;

        let server_name = ServerName::try_from(config.server.clone())
            .map_err(|e| Error::tls(format!("invalid server name {:?}: {}", config.server, e)))?;
        let connector = tls_connector(config.insecure_skip_verify);

        let tls = timeout(config.write_timeout(), connector.connect(server_name, tcp))
            .await
            .map_err(|_| Error::timeout("TLS handshake"))?
            .map_err(|e| Error::tls(format!("handshake failed: {}", e)))?;

        let mut stream = BlockStream::new(tls, config.read_timeout(), config.write_timeout());

        // The greeting is mandatory; a refusal releases the session here.
        let greeting = Response::parse(&stream.read_block().await?);
        if !greeting.code.is_success() {
            warn!(code = greeting.code.as_i32(), "server refused session");
            return Err(Error::command(greeting.code));
        }

        info!(server = %config.server, "session established");
        Ok(Self {
            stream: Some(stream),
        })
    }
}

#[async_trait]
impl CommandSession for TlsSession {
    async fn send_command(&mut self, command: &Command) -> Result<Response> {
        let stream = self.stream.as_mut().ok_or(Error::InvalidState)?;
        stream.write_block(&command.to_lines()).await?;
        Ok(Response::parse(&stream.read_block().await?))
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("close notify failed: {}", e);
            }
            debug!("session closed");
        }
    }
}

/// Opens [`TlsSession`]s from a client configuration
pub struct TlsSessionConnector {
    config: ClientConfig,
}

impl TlsSessionConnector {
    /// Create a connector for the configured endpoint
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionConnector for TlsSessionConnector {
    async fn connect(&self) -> Result<Box<dyn CommandSession>> {
        Ok(Box::new(TlsSession::connect(&self.config).await?))
    }
}

/// Build the TLS connector for one of the two verification modes
fn tls_connector(insecure_skip_verify: bool) -> tokio_rustls::TlsConnector {
    let config = if insecure_skip_verify {
        rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert::new()))
            .with_no_client_auth()
    } else {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth()
    };
    tokio_rustls::TlsConnector::from(Arc::new(config))
}

/// Certificate verifier that accepts any server certificate
///
/// The production update server presents a certificate that does not chain
/// to a public root, so peer identity is not validated in the default
/// configuration. Handshake signatures are still checked; only the chain
/// and name validation are skipped. Selected by
/// `ClientConfig::insecure_skip_verify`.
#[derive(Debug)]
struct AcceptAnyServerCert {
    algorithms: WebPkiSupportedAlgorithms,
}

impl AcceptAnyServerCert {
    fn new() -> Self {
        Self {
            algorithms: rustls::crypto::ring::default_provider().signature_verification_algorithms,
        }
    }
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}
