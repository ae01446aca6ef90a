//! Process configuration from the environment

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{DEFAULT_LEDGER_RETENTION, DEFAULT_TICK_SECS};

const DEFAULT_PLATFORMS: &str = "TikTok,Instagram,YouTube Shorts,Twitter";

#[derive(Debug, Error)]
#[error("invalid value for {name}: {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub settings_path: PathBuf,
    /// Platforms posters are registered for
    pub platforms: Vec<String>,
    /// When set, every platform posts through this webhook
    pub platform_webhook_url: Option<String>,
    /// Success probability of the simulated posters
    pub platform_success_rate: f64,
    /// When set, transcripts come from this service instead of the sample
    pub transcript_service_url: Option<String>,
    pub scheduler_tick_secs: u64,
    pub ledger_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            settings_path: PathBuf::from("clipforge-automation-settings.json"),
            platforms: parse_platforms(DEFAULT_PLATFORMS),
            platform_webhook_url: None,
            platform_success_rate: 0.95,
            transcript_service_url: None,
            scheduler_tick_secs: DEFAULT_TICK_SECS,
            ledger_retention: DEFAULT_LEDGER_RETENTION,
        }
    }
}

fn parse_platforms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; unset and blank values take defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let rate = parse_or(&var, "PLATFORM_SUCCESS_RATE", defaults.platform_success_rate)?;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError {
                name: "PLATFORM_SUCCESS_RATE",
                value: rate.to_string(),
            });
        }

        let tick = parse_or(&var, "SCHEDULER_TICK_SECS", defaults.scheduler_tick_secs)?;
        if tick == 0 {
            return Err(ConfigError {
                name: "SCHEDULER_TICK_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            port: parse_or(&var, "PORT", defaults.port)?,
            settings_path: var("SETTINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.settings_path),
            platforms: var("CLIPFORGE_PLATFORMS")
                .map(|raw| parse_platforms(&raw))
                .unwrap_or(defaults.platforms),
            platform_webhook_url: var("PLATFORM_WEBHOOK_URL"),
            platform_success_rate: rate,
            transcript_service_url: var("TRANSCRIPT_SERVICE_URL"),
            scheduler_tick_secs: tick,
            ledger_retention: parse_or(&var, "LEDGER_RETENTION", defaults.ledger_retention)?,
        })
    }
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError { name, value }),
        None => Ok(default),
    }
}
