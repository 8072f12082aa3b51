// Every flag has an environment fallback for unattended runs.

use std::{path::PathBuf, time::Duration};

use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser};
use thiserror::Error;

use crate::{
    logging::LogFormat,
    pushplus::{self, PushSettings},
    storage,
};

#[derive(Debug, Parser)]
#[command(version, about = "Push reminders for macro calendar events due in 1-2 days")]
pub struct Cli {
    /// JSON file holding the event calendar
    #[arg(long, env = "EVENTS_FILE", default_value = storage::DEFAULT_EVENTS_FILE)]
    pub events: PathBuf,

    /// PushPlus token used to authenticate the send
    #[arg(long, env = "PUSHPLUS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Send a fixed sample notification instead of reading the calendar
    #[arg(
        long,
        env = "TEST_MODE",
        action = ArgAction::Set,
        value_parser = parse_flag,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub test_mode: bool,

    /// Print the rendered message instead of sending it
    #[arg(
        long,
        env = "DRY_RUN",
        action = ArgAction::Set,
        value_parser = parse_flag,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub dry_run: bool,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, env = "REMINDER_TODAY")]
    pub today: Option<String>,

    /// Push endpoint URL
    #[arg(long, env = "PUSHPLUS_ENDPOINT", default_value = pushplus::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// PushPlus group code receiving the broadcast
    #[arg(long, env = "PUSHPLUS_TOPIC", default_value = pushplus::DEFAULT_TOPIC)]
    pub topic: String,

    /// Delivery channel requested from PushPlus
    #[arg(long, env = "PUSHPLUS_CHANNEL", default_value = pushplus::DEFAULT_CHANNEL)]
    pub channel: String,

    /// Timeout for the outbound request, in seconds
    #[arg(long, env = "PUSHPLUS_TIMEOUT_SECS", default_value_t = pushplus::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Calendar,
    Test,
}

/// Resolved settings for a single run.
pub struct Config {
    pub events_path: PathBuf,
    pub token: Option<String>,
    pub mode: RunMode,
    pub dry_run: bool,
    pub today: NaiveDate,
    pub push: PushSettings,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let today = match cli.today.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ConfigError::InvalidToday(raw.to_owned()))?,
            _ => Local::now().date_naive(),
        };
        if cli.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if cli.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }

        Ok(Self {
            events_path: cli.events,
            token: cli.token.filter(|token| !token.trim().is_empty()),
            mode: if cli.test_mode {
                RunMode::Test
            } else {
                RunMode::Calendar
            },
            dry_run: cli.dry_run,
            today,
            push: PushSettings {
                endpoint: cli.endpoint.trim().to_owned(),
                topic: cli.topic,
                channel: cli.channel,
                timeout: Duration::from_secs(cli.timeout_secs),
            },
        })
    }
}

/// Only `true` (any case) switches a flag on; every other value leaves it off.
fn parse_flag(raw: &str) -> Result<bool, String> {
    Ok(raw.trim().eq_ignore_ascii_case("true"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--today must be a YYYY-MM-DD date, got `{0}`")]
    InvalidToday(String),
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
    #[error("push endpoint must not be empty")]
    EmptyEndpoint,
}
