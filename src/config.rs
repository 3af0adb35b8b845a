// src/config.rs
use chrono::{Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use log::{info, warn};
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::services::cache::DEFAULT_TTL_SECS;
use crate::services::feed::DEFAULT_FEED_URL;
use crate::services::normalizer::MalformedPolicy;
use crate::services::plates::DEFAULT_PLATES_URL;
use crate::services::window::DateBounds;

pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub feed_url: String,
    pub plates_url: String,
    pub timezone: Tz,
    pub cache_ttl_secs: i64,
    pub http_timeout_secs: u64,
    /// `None` follows the current calendar year in `timezone`, re-evaluated
    /// on every request.
    pub bounds: Option<DateBounds>,
    pub malformed_policy: MalformedPolicy,
}

impl AppConfig {
    /// Defaults for everything. The date bounds are left open and track the
    /// current year, so a long-running server rolls over at New Year.
    pub fn defaults() -> Self {
        AppConfig {
            port: DEFAULT_PORT,
            feed_url: DEFAULT_FEED_URL.to_string(),
            plates_url: DEFAULT_PLATES_URL.to_string(),
            timezone: DEFAULT_TIMEZONE,
            cache_ttl_secs: DEFAULT_TTL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            bounds: None,
            malformed_policy: MalformedPolicy::Strict,
        }
    }

    /// Read configuration from the process environment. Call `dotenv().ok()`
    /// first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::defaults();

        if let Some(port) = parse_var(&lookup, "PORT")? {
            config.port = port;
        } else {
            warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
        }
        if let Some(url) = lookup("FEED_URL") {
            config.feed_url = url;
        }
        if let Some(url) = lookup("PLATES_URL") {
            config.plates_url = url;
        }
        if let Some(tz) = lookup("QUAKE_TIMEZONE") {
            config.timezone = tz.parse::<Tz>().map_err(|e| ConfigError::Invalid {
                key: "QUAKE_TIMEZONE",
                value: tz.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(ttl) = parse_var::<i64, _>(&lookup, "CACHE_TTL_SECS")? {
            if ttl < 1 || Duration::try_seconds(ttl).is_none() {
                return Err(ConfigError::Invalid {
                    key: "CACHE_TTL_SECS",
                    value: ttl.to_string(),
                    reason: format!("must be between 1 and {}", i64::MAX / 1000),
                });
            }
            config.cache_ttl_secs = ttl;
        }
        if let Some(timeout) = parse_var(&lookup, "HTTP_TIMEOUT_SECS")? {
            config.http_timeout_secs = timeout;
        }
        let min_date = parse_var::<NaiveDate, _>(&lookup, "VALID_START_DATE")?;
        let max_date = parse_var::<NaiveDate, _>(&lookup, "VALID_END_DATE")?;
        if min_date.is_some() || max_date.is_some() {
            // A single explicit edge pins the other one to this year.
            let year = current_year_bounds(config.today().year());
            let bounds = DateBounds::new(min_date.unwrap_or(year.min_date), max_date.unwrap_or(year.max_date));
            if bounds.min_date > bounds.max_date {
                return Err(ConfigError::Invalid {
                    key: "VALID_START_DATE",
                    value: bounds.min_date.to_string(),
                    reason: format!("after VALID_END_DATE {}", bounds.max_date),
                });
            }
            config.bounds = Some(bounds);
        }
        if let Some(policy) = parse_var(&lookup, "MALFORMED_FEATURES")? {
            config.malformed_policy = policy;
        }

        let bounds = config.bounds_on(config.today());
        info!(
            "Config: feed={} tz={} ttl={}s bounds={}..={}{} policy={:?}",
            config.feed_url,
            config.timezone.name(),
            config.cache_ttl_secs,
            bounds.min_date,
            bounds.max_date,
            if config.bounds.is_none() { " (current year)" } else { "" },
            config.malformed_policy
        );
        Ok(config)
    }

    /// Today's date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    /// The valid date range as of `today`.
    pub fn bounds_on(&self, today: NaiveDate) -> DateBounds {
        self.bounds.unwrap_or_else(|| current_year_bounds(today.year()))
    }
}

fn current_year_bounds(year: i32) -> DateBounds {
    DateBounds::calendar_year(year).unwrap_or(DateBounds::new(NaiveDate::MIN, NaiveDate::MAX))
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
