// # onamae-update - DDNS update tool
//
// Thin integration layer over the onamae-client library:
// 1. Reading configuration from environment variables
// 2. Validating it before any network activity
// 3. Initializing the runtime
// 4. Running exactly one update transaction
//
// All protocol and failure-policy logic lives in onamae-client; this
// binary only wires configuration to the facade. One invocation performs
// one update; scheduling repeated updates belongs to cron or a systemd
// timer, not to this tool.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Credentials
// - `ONAMAE_USER_ID`: Account user id
// - `ONAMAE_PASSWORD`: Account password
//
// ### Update target
// - `ONAMAE_HOST_NAME`: Host label(s) to update (e.g. "www")
// - `ONAMAE_DOMAIN_NAME`: Registered domain (e.g. "example.jp")
// - `ONAMAE_IPV4`: New IPv4 address for the record
//
// ### Endpoint
// - `ONAMAE_SERVER`: Update server host (default: ddnsclient.onamae.com)
// - `ONAMAE_PORT`: Update server TLS port (default: 65010)
// - `ONAMAE_READ_TIMEOUT_SECS` / `ONAMAE_WRITE_TIMEOUT_SECS`: Per-operation
//   timeouts (default: 60)
// - `ONAMAE_INSECURE_SKIP_VERIFY`: Accept any server certificate
//   (default: true; the production server does not chain to a public root)
//
// ### Misc
// - `ONAMAE_CONFIG`: Optional path to a JSON client config file; individual
//   environment variables override its values
// - `ONAMAE_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export ONAMAE_USER_ID=user01
// export ONAMAE_PASSWORD=secret
// export ONAMAE_HOST_NAME=www
// export ONAMAE_DOMAIN_NAME=example.jp
// export ONAMAE_IPV4=203.0.113.7
//
// onamae-update
// ```

use anyhow::Result;
use onamae_client::{ClientConfig, DdnsClient};
use std::env;
use std::net::IpAddr;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Update committed
/// - 1: Configuration or validation error
/// - 2: Update transaction failed
#[derive(Debug, Clone, Copy)]
enum UpdateExitCode {
    /// Update committed
    Success = 0,
    /// Configuration error (nothing was sent)
    ConfigError = 1,
    /// The transaction failed (rejected command or transport fault)
    UpdateError = 2,
}

impl From<UpdateExitCode> for ExitCode {
    fn from(code: UpdateExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    client: ClientConfig,
    host_name: String,
    domain_name: String,
    address: IpAddr,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `ONAMAE_CONFIG` (a JSON file) seeds the client configuration;
    /// individual variables override it.
    fn from_env() -> Result<Self> {
        let mut client = match env::var("ONAMAE_CONFIG") {
            Ok(path) => ClientConfig::from_json_file(&path)
                .map_err(|e| anyhow::anyhow!("ONAMAE_CONFIG: {}", e))?,
            Err(_) => {
                let user_id = env::var("ONAMAE_USER_ID").map_err(|_| {
                    anyhow::anyhow!(
                        "ONAMAE_USER_ID is required. \
                        Set it via: export ONAMAE_USER_ID=your_user_id"
                    )
                })?;
                let password = env::var("ONAMAE_PASSWORD").map_err(|_| {
                    anyhow::anyhow!(
                        "ONAMAE_PASSWORD is required. \
                        Set it via: export ONAMAE_PASSWORD=your_password"
                    )
                })?;
                ClientConfig::new(user_id, password)
            }
        };

        if let Ok(user_id) = env::var("ONAMAE_USER_ID") {
            client.user_id = user_id;
        }
        if let Ok(password) = env::var("ONAMAE_PASSWORD") {
            client.password = password;
        }
        if let Ok(server) = env::var("ONAMAE_SERVER") {
            client.server = server;
        }
        if let Ok(port) = env::var("ONAMAE_PORT") {
            client.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("ONAMAE_PORT must be a port number. Got: {}", port))?;
        }
        if let Ok(secs) = env::var("ONAMAE_READ_TIMEOUT_SECS") {
            client.read_timeout_secs = secs.parse().map_err(|_| {
                anyhow::anyhow!("ONAMAE_READ_TIMEOUT_SECS must be a number. Got: {}", secs)
            })?;
        }
        if let Ok(secs) = env::var("ONAMAE_WRITE_TIMEOUT_SECS") {
            client.write_timeout_secs = secs.parse().map_err(|_| {
                anyhow::anyhow!("ONAMAE_WRITE_TIMEOUT_SECS must be a number. Got: {}", secs)
            })?;
        }
        if let Ok(flag) = env::var("ONAMAE_INSECURE_SKIP_VERIFY") {
            client.insecure_skip_verify = match flag.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => anyhow::bail!(
                    "ONAMAE_INSECURE_SKIP_VERIFY must be true or false. Got: {}",
                    flag
                ),
            };
        }

        let host_name = env::var("ONAMAE_HOST_NAME").map_err(|_| {
            anyhow::anyhow!(
                "ONAMAE_HOST_NAME is required. \
                Set it via: export ONAMAE_HOST_NAME=www"
            )
        })?;
        let domain_name = env::var("ONAMAE_DOMAIN_NAME").map_err(|_| {
            anyhow::anyhow!(
                "ONAMAE_DOMAIN_NAME is required. \
                Set it via: export ONAMAE_DOMAIN_NAME=example.jp"
            )
        })?;
        let raw_address = env::var("ONAMAE_IPV4").map_err(|_| {
            anyhow::anyhow!(
                "ONAMAE_IPV4 is required. \
                Set it via: export ONAMAE_IPV4=203.0.113.7"
            )
        })?;
        let address: IpAddr = raw_address.parse().map_err(|_| {
            anyhow::anyhow!("ONAMAE_IPV4 is not an IP address. Got: {}", raw_address)
        })?;

        Ok(Self {
            client,
            host_name,
            domain_name,
            address,
            log_level: env::var("ONAMAE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Everything here fails before a socket is opened: required fields,
    /// name syntax, numeric ranges, and the address family.
    fn validate(&self) -> Result<()> {
        self.client.validate()?;

        if !self.address.is_ipv4() {
            anyhow::bail!(
                "ONAMAE_IPV4 must be an IPv4 address; the protocol has no \
                IPv6 record support. Got: {}",
                self.address
            );
        }

        validate_domain_name(&self.domain_name)
            .map_err(|e| anyhow::anyhow!("ONAMAE_DOMAIN_NAME: {}", e))?;
        validate_domain_name(&self.host_name)
            .map_err(|e| anyhow::anyhow!("ONAMAE_HOST_NAME: {}", e))?;

        if !(1..=600).contains(&self.client.read_timeout_secs) {
            anyhow::bail!(
                "ONAMAE_READ_TIMEOUT_SECS must be between 1 and 600 seconds. Got: {}",
                self.client.read_timeout_secs
            );
        }
        if !(1..=600).contains(&self.client.write_timeout_secs) {
            anyhow::bail!(
                "ONAMAE_WRITE_TIMEOUT_SECS must be between 1 and 600 seconds. Got: {}",
                self.client.write_timeout_secs
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ONAMAE_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

/// Validate that a string is a valid domain name
///
/// This implements basic DNS domain name validation per RFC 1035.
/// It's not comprehensive but catches common errors.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("name cannot be empty");
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        anyhow::bail!(
            "name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    // Split into labels and validate each
    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        // Check for valid characters (alphanumeric and hyphen)
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            anyhow::bail!(
                "label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }

        // Label cannot start or end with hyphen
        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!("label cannot start or end with hyphen. Label: '{}'", label);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return UpdateExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return UpdateExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return UpdateExitCode::ConfigError.into();
    }

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return UpdateExitCode::UpdateError.into();
        }
    };

    rt.block_on(async {
        match run_update(config).await {
            Ok(()) => UpdateExitCode::Success,
            Err(e) => {
                error!("Update failed: {}", e);
                UpdateExitCode::UpdateError
            }
        }
    })
    .into()
}

/// Run one update transaction
async fn run_update(config: Config) -> onamae_client::Result<()> {
    info!(
        "Updating {}.{} -> {} via {}:{}",
        config.host_name,
        config.domain_name,
        config.address,
        config.client.server,
        config.client.port
    );

    let client = DdnsClient::from_config(config.client)?;
    client
        .update(&config.host_name, &config.domain_name, config.address)
        .await?;

    info!("Update committed");
    Ok(())
}
