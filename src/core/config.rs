use crate::core::error::{AppError, AppResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

const DEFAULT_STATUS_COMMAND: &str = "upsc";
const DEFAULT_STATUS_TIMEOUT_SECS: u64 = 5;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_SMTP_SERVER: &str = "localhost";
const DEFAULT_SMTP_PORT: u16 = 25;
const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 10;

/// Raw on-disk configuration. All fields are optional; defaults and validation are
/// applied when building [`AppConfig`]. Ports, intervals and the TLS flag are typed
/// here, so a quoted number or a "yes" string is rejected at parse time.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    ups: UpsSection,
    #[serde(default)]
    email: EmailSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpsSection {
    name: Option<String>,
    command: Option<String>,
    timeout: Option<u64>,
    poll_interval: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EmailSection {
    to: Option<String>,
    from: Option<String>,
    server: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    pass: Option<String>,
    tls: Option<bool>,
    timeout: Option<u64>,
}

/// UPS polling configuration
#[derive(Clone, Debug)]
pub struct UpsConfig {
    pub name: String,
    pub command: String,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

/// SMTP notification endpoint. Present only when a recipient is configured.
#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub to: String,
    pub from: String,
    pub server: String,
    pub port: u16,
    /// Username/password pair; auth is attempted only when both are configured.
    pub credentials: Option<(String, String)>,
    pub tls: bool,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub ups: UpsConfig,
    pub email: Option<EmailConfig>,
}

impl AppConfig {
    /// Pure constructor for testing
    pub fn new(ups: UpsConfig, email: Option<EmailConfig>) -> Self {
        Self { ups, email }
    }

    /// Load configuration from a TOML file, with the UPS name optionally overridden
    /// from the command line and SMTP credentials optionally overridden from the
    /// environment (`UPSWATCH_EMAIL_USER` / `UPSWATCH_EMAIL_PASS`).
    ///
    /// A missing file is treated as an empty configuration; the load still fails
    /// unless the UPS name arrives via the override.
    pub fn load(path: &Path, ups_override: Option<String>) -> AppResult<Self> {
        dotenv::dotenv().ok();

        let file = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str::<FileConfig>(&raw)?
        } else {
            warn!("Config file {:?} not found, using defaults", path);
            FileConfig::default()
        };

        Self::resolve(file, ups_override)
    }

    fn resolve(file: FileConfig, ups_override: Option<String>) -> AppResult<Self> {
        let name = ups_override
            .or(file.ups.name)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                AppError::Config("UPS name not found in config file or command line".to_string())
            })?;

        let ups = UpsConfig {
            name,
            command: file
                .ups
                .command
                .unwrap_or_else(|| DEFAULT_STATUS_COMMAND.to_string()),
            timeout: Duration::from_secs(file.ups.timeout.unwrap_or(DEFAULT_STATUS_TIMEOUT_SECS)),
            poll_interval: Duration::from_secs(
                file.ups.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            ),
        };

        if ups.poll_interval.is_zero() {
            return Err(AppError::Config(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        let email = Self::resolve_email(file.email)?;

        Ok(Self { ups, email })
    }

    /// Notification is enabled as a unit by the presence of a recipient. A recipient
    /// without a sender, or exactly one of user/pass, is a fatal configuration error.
    fn resolve_email(section: EmailSection) -> AppResult<Option<EmailConfig>> {
        let Some(to) = section.to else {
            return Ok(None);
        };

        let from = section.from.ok_or_else(|| {
            AppError::Config("Email 'from' address is required when 'to' is set".to_string())
        })?;

        let user = std::env::var("UPSWATCH_EMAIL_USER").ok().or(section.user);
        let pass = std::env::var("UPSWATCH_EMAIL_PASS").ok().or(section.pass);
        let credentials = match (user, pass) {
            (Some(u), Some(p)) => Some((u, p)),
            (None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "Email 'user' and 'pass' must be set together".to_string(),
                ))
            }
        };

        Ok(Some(EmailConfig {
            to,
            from,
            server: section
                .server
                .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
            port: section.port.unwrap_or(DEFAULT_SMTP_PORT),
            credentials,
            tls: section.tls.unwrap_or(false),
            timeout: Duration::from_secs(section.timeout.unwrap_or(DEFAULT_SMTP_TIMEOUT_SECS)),
        }))
    }
}
