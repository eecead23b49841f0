//! Engine configuration from environment variables.

use thiserror::Error;

use crate::geo::DEFAULT_NEARBY_RADIUS_M;
use crate::schedule::HORIZON_WEEK;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Tunables for the schedule, proximity, reminder, and news paths. Every
/// field has a default; nothing is required.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub horizon_days: usize,
    pub proximity_radius_m: u32,
    pub reminder_lead_minutes: i64,
    pub reminder_min_notice_minutes: i64,
    pub truck_alert_cooldown_minutes: i64,
    pub log_level: String,
    pub news_feed_url: Option<String>,
    pub news_cache_ttl_secs: u64,
    pub news_request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_days: HORIZON_WEEK,
            proximity_radius_m: DEFAULT_NEARBY_RADIUS_M,
            reminder_lead_minutes: 60,
            reminder_min_notice_minutes: 5,
            truck_alert_cooldown_minutes: 30,
            log_level: "info".to_string(),
            news_feed_url: None,
            news_cache_ttl_secs: 300,
            news_request_timeout_secs: 10,
        }
    }
}

/// Load engine configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env
/// vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set variable fails to parse.
pub fn load_engine_config() -> Result<EngineConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_engine_config_from_env()
}

/// Load engine configuration from env vars already in the process, without
/// touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a set variable fails to parse.
pub fn load_engine_config_from_env() -> Result<EngineConfig, ConfigError> {
    build_engine_config(|key| std::env::var(key))
}

/// Build configuration through the provided env-var lookup, decoupled from
/// the process environment so tests can drive it with a plain `HashMap`.
fn build_engine_config<F>(lookup: F) -> Result<EngineConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = EngineConfig::default();

    fn parse<T: std::str::FromStr>(
        var: &str,
        raw: Option<String>,
        default: T,
    ) -> Result<T, ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        match raw {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    let get = |var: &str| lookup(var).ok();

    Ok(EngineConfig {
        horizon_days: parse(
            "VATELANKA_HORIZON_DAYS",
            get("VATELANKA_HORIZON_DAYS"),
            defaults.horizon_days,
        )?,
        proximity_radius_m: parse(
            "VATELANKA_PROXIMITY_RADIUS_M",
            get("VATELANKA_PROXIMITY_RADIUS_M"),
            defaults.proximity_radius_m,
        )?,
        reminder_lead_minutes: parse(
            "VATELANKA_REMINDER_LEAD_MINUTES",
            get("VATELANKA_REMINDER_LEAD_MINUTES"),
            defaults.reminder_lead_minutes,
        )?,
        reminder_min_notice_minutes: parse(
            "VATELANKA_REMINDER_MIN_NOTICE_MINUTES",
            get("VATELANKA_REMINDER_MIN_NOTICE_MINUTES"),
            defaults.reminder_min_notice_minutes,
        )?,
        truck_alert_cooldown_minutes: parse(
            "VATELANKA_TRUCK_ALERT_COOLDOWN_MINUTES",
            get("VATELANKA_TRUCK_ALERT_COOLDOWN_MINUTES"),
            defaults.truck_alert_cooldown_minutes,
        )?,
        log_level: get("VATELANKA_LOG_LEVEL").unwrap_or(defaults.log_level),
        news_feed_url: get("VATELANKA_NEWS_FEED_URL"),
        news_cache_ttl_secs: parse(
            "VATELANKA_NEWS_CACHE_TTL_SECS",
            get("VATELANKA_NEWS_CACHE_TTL_SECS"),
            defaults.news_cache_ttl_secs,
        )?,
        news_request_timeout_secs: parse(
            "VATELANKA_NEWS_REQUEST_TIMEOUT_SECS",
            get("VATELANKA_NEWS_REQUEST_TIMEOUT_SECS"),
            defaults.news_request_timeout_secs,
        )?,
    })
}
