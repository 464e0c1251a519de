//! # API Configuration Module
//!
//! Loads the settings of the Mentorunden API server from environment
//! variables, with defaults where a value is optional.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: host address to bind to (default: "0.0.0.0")
//! - `API_PORT`: port to listen on (default: 4000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated allowed origins (default: "http://localhost:3000")
//! - `API_REQUEST_TIMEOUT_SECONDS`: per-request timeout (default: 30)
//! - `APP_TIMEZONE`: IANA zone mentors declare their hours in (default: "UTC")
//! - `NOTIFICATION_TIMEOUT_SECONDS`: upper bound on sending one email (default: 10)
//! - `EMAIL_API_URL` / `EMAIL_API_KEY`: transactional email endpoint; emails are only logged when unset
//! - `EMAIL_FROM`: sender address (default: "Mentorunden <no-reply@mentorunden.local>")
//! - `WEB_URL`: frontend base URL used in email links (default: "http://localhost:3000")

use chrono_tz::Tz;
use eyre::{Result, WrapErr, eyre};
use std::env;
use tracing::Level;

const DEFAULT_EMAIL_FROM: &str = "Mentorunden <no-reply@mentorunden.local>";
const DEFAULT_WEB_URL: &str = "http://localhost:3000";

/// Configuration for the Mentorunden API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use mentorunden_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}", config.server_addr());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins; no CORS layer is installed when empty
    pub cors_origins: Vec<String>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Zone in which weekly availability is interpreted
    pub timezone: Tz,

    /// Upper bound in seconds on delivering one notification
    pub notification_timeout: u64,

    /// Outbound email API, if configured
    pub email: Option<EmailConfig>,

    /// Sender used for outgoing email
    pub email_from: String,

    /// Frontend base URL, linked from emails
    pub web_url: String,
}

/// Transactional email API credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - The APP_TIMEZONE value is not a known IANA zone
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // Network settings
        let host = var("API_HOST", "0.0.0.0");
        let port = var("API_PORT", "4000")
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;

        // Logging settings
        let log_level = match var("LOG_LEVEL", "info").to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = var("API_CORS_ORIGINS", DEFAULT_WEB_URL)
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Performance settings
        let request_timeout = var("API_REQUEST_TIMEOUT_SECONDS", "30").parse().unwrap_or(30);
        let notification_timeout = var("NOTIFICATION_TIMEOUT_SECONDS", "10").parse().unwrap_or(10);

        // Scheduling settings
        let timezone_name = var("APP_TIMEZONE", "UTC");
        let timezone = timezone_name
            .parse::<Tz>()
            .map_err(|e| eyre!("Invalid APP_TIMEZONE value '{}': {}", timezone_name, e))?;

        // Email settings
        let email = match (lookup("EMAIL_API_URL"), lookup("EMAIL_API_KEY")) {
            (Some(api_url), Some(api_key)) if !api_url.is_empty() && !api_key.is_empty() => {
                Some(EmailConfig { api_url, api_key })
            }
            _ => None,
        };
        let email_from = var("EMAIL_FROM", DEFAULT_EMAIL_FROM);
        let web_url = var("WEB_URL", DEFAULT_WEB_URL).trim_end_matches('/').to_string();

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            timezone,
            notification_timeout,
            email,
            email_from,
            web_url,
        })
    }

    /// Returns the server address as a string
    ///
    /// # Returns
    ///
    /// * `String` - Formatted server address (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
