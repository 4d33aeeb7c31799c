//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml`, then from `LEDGER__*` environment variables.
//!
//! See `settings.example.toml` for every key.
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use engine::{DEFAULT_IO_TIMEOUT, Partner, PartnerRoster};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
    /// IANA name, e.g. `Asia/Tehran`.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub currency_label: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
            timezone: None,
            currency_label: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    #[serde(default = "default_storage_path")]
    pub path: String,
    #[serde(default)]
    pub io_timeout_secs: Option<u64>,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            io_timeout_secs: None,
        }
    }
}

fn default_storage_path() -> String {
    "ledger.json".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
    #[serde(default)]
    pub download_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub partners: Vec<Partner>,
    pub telegram: Option<Telegram>,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("LEDGER")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("telegram.allowed_users"),
            )
            // Hosting platforms hand out the HTTP port this way.
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?;

        settings.try_deserialize()
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        match self.app.timezone.as_deref() {
            None => Ok(Tz::UTC),
            Some(name) => name
                .parse::<Tz>()
                .map_err(|err| ConfigError::Message(format!("invalid timezone {name}: {err}"))),
        }
    }

    /// The configured partners, or the default equal split when none are set.
    pub fn roster(&self) -> Result<PartnerRoster, ConfigError> {
        if self.partners.is_empty() {
            return Ok(PartnerRoster::default());
        }
        PartnerRoster::new(self.partners.clone()).map_err(|err| ConfigError::Message(err.to_string()))
    }

    pub fn io_timeout(&self) -> Duration {
        self.storage
            .io_timeout_secs
            .map_or(DEFAULT_IO_TIMEOUT, Duration::from_secs)
    }
}
