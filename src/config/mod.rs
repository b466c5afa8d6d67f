//! Builds the `AppConfig` from layered sources, later ones win:
//! built-in defaults, `config/base.toml`, `config/{environment}.toml`, `APP_` prefixed variables.
//! Nested keys are separated by `__`, e.g. `APP_NET_CONFIG__APP_PORT=9000`.
//!
//! The database connection string only ever comes from `DATABASE_URL`.

mod error;
mod types;

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use types::Settings;

// Re-export config structs
pub use error::{ConfigError, ConfigResult};
pub use types::{
    AppConfig, DbConfig, Environment, ErrorFormat, NetConfig, WaitlistConfig,
};

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const ENVIRONMENT_ENV: &str = "APP_ENVIRONMENT";

impl AppConfig {
    /// Loads the configuration from the `config` directory in the current working directory.
    pub fn load() -> ConfigResult<Self> {
        let config_dir = std::env::current_dir()?.join("config");
        Self::load_from(config_dir)
    }

    /// Missing config files are skipped, a missing `DATABASE_URL` is an error.
    pub fn load_from(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let config_dir = config_dir.as_ref();
        let environment: Environment = std::env::var(ENVIRONMENT_ENV)
            .unwrap_or_else(|_| "local".into())
            .try_into()?;
        info!(
            "{:<20} - Loading the {} configuration",
            "load_config",
            environment.as_ref()
        );
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()?;

        let database_url = std::env::var(DATABASE_URL_ENV)
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingDatabaseUrl)?;
        let db_config = DbConfig::try_from(database_url.expose_secret())?;

        Ok(AppConfig {
            net_config: settings.net_config,
            waitlist_config: settings.waitlist_config,
            db_config,
        })
    }
}
