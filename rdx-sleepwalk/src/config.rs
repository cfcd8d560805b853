//! Defines the configuration for the sleepwalk engine.
//!
//! The struct is deserialized with `serde` from layered sources: an optional
//! TOML file, `SLEEPWALK_*` environment variables, and finally command-line
//! flags. It is read once at startup, validated, and then passed by reference
//! to the engine and the gateway. Nothing re-reads it while running.

use crate::cli::Cli;
use crate::error::ConfigError;
use chrono_tz::Tz;
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The top-level configuration for the `SleepwalkEngine`.
#[derive(Debug, Clone, Deserialize)]
pub struct SleepwalkConfig {
    /// Base URL of the cluster whose settings are managed.
    #[serde(default = "default_address")]
    pub address: String,

    /// Seconds between reconciliation passes.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Directory scanned for `*.conf` templates at startup.
    #[serde(default = "default_templates")]
    pub templates: PathBuf,

    /// Upper bound in seconds on every fetch or push.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// The timezone windows are evaluated in. Uses the string names from the
    /// IANA Time Zone Database (e.g. "America/New_York"). When absent the
    /// process-local zone is used.
    #[serde(default)]
    pub timezone: Option<Tz>,
}

impl SleepwalkConfig {
    /// Builds the configuration from `cli.config` (if given), the environment
    /// and the flags in `cli`, in increasing order of precedence.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        Self::load_with_env(cli, Environment::with_prefix("SLEEPWALK"))
    }

    fn load_with_env(cli: &Cli, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        let config: Self = builder
            .add_source(env.try_parsing(true))
            .set_override_option("address", cli.address.clone())?
            .set_override_option("interval", cli.interval.map(|secs| secs.to_string()))?
            .set_override_option(
                "templates",
                cli.templates.as_ref().map(|dir| dir.display().to_string()),
            )?
            .set_override_option("request_timeout", cli.timeout.map(|secs| secs.to_string()))?
            .set_override_option("timezone", cli.timezone.clone())?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        match reqwest::Url::parse(&self.address) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            _ => Err(ConfigError::InvalidAddress(self.address.clone())),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

// --- Default value functions for serde ---

fn default_address() -> String {
    "http://localhost:9200".to_string()
}

fn default_interval() -> u64 {
    300
}

fn default_templates() -> PathBuf {
    PathBuf::from("./templates")
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for SleepwalkConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            interval: default_interval(),
            templates: default_templates(),
            request_timeout: default_request_timeout(),
            timezone: None,
        }
    }
}
