//! Droplift configuration
//!
//! Every setting comes from a named variable. In production the lookup is the
//! process environment (after the binary has loaded `.env`); tests pass a
//! closure instead.

pub mod error;

pub use error::*;

use droplift_cloud::WaitConfig;
use droplift_core::{DownConfig, UpConfig};
use std::str::FromStr;
use std::time::Duration;

pub const DIGITALOCEAN_TOKEN: &str = "DIGITALOCEAN_TOKEN";
pub const DROPLET_NAME: &str = "DROPLET_NAME";
/// Older spelling of `DROPLET_NAME`, still honored when the new one is unset
pub const LEGACY_DROPLET_NAME: &str = "COPROSERVER_NAME";
pub const SNAPSHOT_NAME: &str = "SNAPSHOT_NAME";
pub const DOMAIN_NAME: &str = "DOMAIN_NAME";
pub const HOST_NAME: &str = "HOST_NAME";
pub const PROJECT_NAME: &str = "PROJECT_NAME";
pub const REGION: &str = "REGION";
pub const SIZE: &str = "SIZE";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const POLL_INTERVAL_SECS: &str = "POLL_INTERVAL_SECS";
pub const WAIT_TIMEOUT_SECS: &str = "WAIT_TIMEOUT_SECS";

/// Named-variable lookup
pub struct Source<F> {
    lookup: F,
}

impl<F> Source<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Value of `name`; blank counts as unset
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String> {
        self.get(name).ok_or(ConfigError::MissingVar(name))
    }

    /// Like `required`, but accepts `legacy` when `name` is unset
    fn required_or_legacy(&self, name: &'static str, legacy: &'static str) -> Result<String> {
        if let Some(value) = self.get(name) {
            return Ok(value);
        }
        match self.get(legacy) {
            Some(value) => {
                tracing::warn!("{} is deprecated, rename it to {}", legacy, name);
                Ok(value)
            }
            None => Err(ConfigError::MissingVar(name)),
        }
    }

    fn parsed<T>(&self, name: &'static str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };

        value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidVar {
                name,
                value: value.clone(),
                reason: e.to_string(),
            })
    }
}

/// Source reading the process environment
pub fn process_env() -> Source<fn(&str) -> Option<String>> {
    Source::new(env_var as fn(&str) -> Option<String>)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Settings shared by every mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_token: String,
    pub wait: WaitConfig,
    pub down: DownConfig,
}

impl Settings {
    pub fn load<F>(source: &Source<F>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = source.required(DIGITALOCEAN_TOKEN)?;

        let down = DownConfig {
            droplet_name: source.required_or_legacy(DROPLET_NAME, LEGACY_DROPLET_NAME)?,
            snapshot_name: source.required(SNAPSHOT_NAME)?,
            domain_name: source.required(DOMAIN_NAME)?,
            host_name: source.required(HOST_NAME)?,
        };

        let mut wait = WaitConfig::default();
        if let Some(secs) = source.parsed::<u64>(POLL_INTERVAL_SECS)? {
            if secs == 0 {
                return Err(ConfigError::InvalidVar {
                    name: POLL_INTERVAL_SECS,
                    value: secs.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            wait = wait.with_interval(Duration::from_secs(secs));
        }
        let timeout = source.parsed::<u64>(WAIT_TIMEOUT_SECS)?;
        wait = wait.with_timeout(timeout.map(Duration::from_secs));

        Ok(Self {
            api_token,
            wait,
            down,
        })
    }

    /// Inputs of the up workflow; needs the project, region and size on top
    pub fn up_config<F>(&self, source: &Source<F>) -> Result<UpConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(UpConfig {
            project_name: source.required(PROJECT_NAME)?,
            droplet_name: self.down.droplet_name.clone(),
            domain_name: self.down.domain_name.clone(),
            host_name: self.down.host_name.clone(),
            snapshot_name: self.down.snapshot_name.clone(),
            region: source.required(REGION)?,
            size: source.required(SIZE)?,
        })
    }
}

/// Bot credentials, the one chat it serves and the workflows it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub token: String,
    pub chat_id: i64,
    pub up: UpConfig,
    pub down: DownConfig,
}

impl Settings {
    pub fn bot_config<F>(&self, source: &Source<F>) -> Result<BotConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let up = self.up_config(source)?;
        let token = source.required(TELEGRAM_BOT_TOKEN)?;
        let chat_id = source
            .parsed::<i64>(TELEGRAM_CHAT_ID)?
            .ok_or(ConfigError::MissingVar(TELEGRAM_CHAT_ID))?;

        Ok(BotConfig {
            token,
            chat_id,
            up,
            down: self.down.clone(),
        })
    }
}
