//! The configuration structs used to build the AppConfig, and their impls.
use std::{fmt, net::SocketAddr, str::FromStr};

use axum::http::HeaderValue;
use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgConnectOptions, ConnectOptions};
use strum_macros::AsRefStr;

use crate::config::{ConfigError, ConfigResult};

// ###################################
// ->   STRUCTS
// ###################################
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub waitlist_config: WaitlistConfig,
    pub db_config: DbConfig,
}

/// The part of `AppConfig` that comes from files and `APP_` variables.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub(super) struct Settings {
    #[serde(default)]
    pub net_config: NetConfig,
    #[serde(default)]
    pub waitlist_config: WaitlistConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
    /// Origins the CORS layer lets through. Everything else gets no CORS headers.
    pub allowed_origins: Vec<String>,
}

/// How the `/submit` handler behaves and answers.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WaitlistConfig {
    /// Reject submissions without a non-empty `name`.
    pub require_name: bool,
    pub error_format: ErrorFormat,
    /// Also reject emails that are not syntactically valid.
    pub strict_email: bool,
}

/// Body format of `/submit` responses.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorFormat {
    /// `{"error": "..."}` for failures and `{"message": "..."}` for success.
    /// A successful submission is answered with a JSON object as well, never a bare text body.
    #[default]
    Json,
    /// The bare message as `text/plain`.
    Text,
}

/// Connection settings parsed from `DATABASE_URL`.
///
/// `db_name` starts out as the database named in the URL and can be overridden,
/// everything else (credentials, host, port, `sslmode`, ...) is kept as sqlx parsed it.
#[derive(Clone)]
pub struct DbConfig {
    options: PgConnectOptions,
    pub db_name: String,
}

// ###################################
// ->   IMPLs
// ###################################
impl Default for NetConfig {
    fn default() -> Self {
        NetConfig {
            host: [0, 0, 0, 0],
            app_port: 8080,
            allowed_origins: vec![
                "https://whisperly.com".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

impl NetConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.app_port))
    }

    /// Parses `allowed_origins` into header values for the CORS layer.
    /// An origin is `scheme://host[:port]` with no path and no wildcard.
    pub fn cors_origins(&self) -> ConfigResult<Vec<HeaderValue>> {
        self.allowed_origins
            .iter()
            .map(|origin| {
                if !regex_is_match!(r#"^https?://[^\s/*]+$"#, origin) {
                    return Err(ConfigError::InvalidOrigin(origin.clone()));
                }
                HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin(origin.clone()))
            })
            .collect()
    }
}

impl DbConfig {
    /// Options for `db_name`.
    pub fn connection_options(&self) -> PgConnectOptions {
        self.server_options().database(&self.db_name)
    }

    /// Options for the database named in the URL, ignoring any `db_name` override.
    /// Used to create databases.
    pub fn server_options(&self) -> PgConnectOptions {
        self.options
            .clone()
            .log_statements(tracing::log::LevelFilter::Trace)
    }
}

// The password never shows up in logs.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.options.get_host())
            .field("port", &self.options.get_port())
            .field("username", &self.options.get_username())
            .field("db_name", &self.db_name)
            .field("ssl_mode", &self.options.get_ssl_mode())
            .finish_non_exhaustive()
    }
}

// ###################################
// ->   TRY FROMs
// ###################################

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}

impl TryFrom<&str> for DbConfig {
    type Error = ConfigError;

    /// `postgres://{username}:{password}@{hostname}[:{port}]/{database}[?{options}]`
    ///
    /// Credentials may be percent-encoded. An unknown `sslmode` is an error.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if !regex_is_match!(r#"^postgres(?:ql)?://"#, value) {
            return Err(Self::Error::InvalidDatabaseUrl(
                "expected a postgres:// or postgresql:// scheme".into(),
            ));
        }

        let options = PgConnectOptions::from_str(value)
            .map_err(|er| Self::Error::InvalidDatabaseUrl(er.to_string()))?;

        let db_name = match options.get_database() {
            Some(db_name) if !db_name.contains('/') => db_name.to_string(),
            Some(db_name) => {
                return Err(Self::Error::InvalidDatabaseUrl(format!(
                    "invalid database name: {db_name}"
                )))
            }
            None => return Err(Self::Error::InvalidDatabaseUrl("missing database name".into())),
        };

        Ok(DbConfig { options, db_name })
    }
}

// ###################################
// ->   TESTS
// ###################################
