use std::{env, fmt::Display, str::FromStr};

use anyhow::{anyhow, bail, Context};
use chrono::{FixedOffset, Offset, Utc};
use tracing::{info, warn};

use crate::booking::{parse_day, parse_slot_time};

pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_ttl_secs: i64,
    pub schedule_days: Vec<String>,
    pub schedule_times: Vec<String>,
    pub session_minutes: i64,
    pub calendar_api_base: String,
    pub calendar_timezone: String,
    pub service_utc_offset: FixedOffset,
    pub onboarding_debug_skip: bool,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

const DEFAULT_DAYS: &str = "Monday,Tuesday,Wednesday,Thursday,Friday";
const DEFAULT_TIMES: &str = "09:00,10:00,11:00,13:00,14:00,15:00,16:00";
// Matches the default calendar zone, Asia/Bangkok.
const DEFAULT_UTC_OFFSET: &str = "+07:00";

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config = Self {
            database_url: try_load("DATABASE_URL", "counsel.db")?,
            bind_addr: try_load("BIND_ADDR", "127.0.0.1:3000")?,
            session_ttl_secs: try_load("SESSION_TTL_SECS", "3600")?,
            schedule_days: parse_list(&try_load::<String>("SCHEDULE_DAYS", DEFAULT_DAYS)?),
            schedule_times: parse_list(&try_load::<String>("SCHEDULE_TIMES", DEFAULT_TIMES)?),
            session_minutes: try_load("SESSION_MINUTES", "60")?,
            calendar_api_base: try_load(
                "CALENDAR_API_BASE",
                "https://www.googleapis.com/calendar/v3",
            )?,
            calendar_timezone: try_load("CALENDAR_TIMEZONE", "Asia/Bangkok")?,
            service_utc_offset: try_load("SERVICE_UTC_OFFSET", DEFAULT_UTC_OFFSET)?,
            onboarding_debug_skip: try_load("ONBOARDING_DEBUG_SKIP", "false")?,
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.schedule_days.is_empty() || self.schedule_times.is_empty() {
            bail!("Schedule needs at least one day and one time");
        }
        for day in &self.schedule_days {
            parse_day(day).context("SCHEDULE_DAYS")?;
        }
        for time in &self.schedule_times {
            parse_slot_time(time).context("SCHEDULE_TIMES")?;
        }
        if self.session_ttl_secs <= 0 || self.session_minutes <= 0 {
            bail!("SESSION_TTL_SECS and SESSION_MINUTES must be positive");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "counsel.db".to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            session_ttl_secs: 3600,
            schedule_days: parse_list(DEFAULT_DAYS),
            schedule_times: parse_list(DEFAULT_TIMES),
            session_minutes: 60,
            calendar_api_base: "https://www.googleapis.com/calendar/v3".to_string(),
            calendar_timezone: "Asia/Bangkok".to_string(),
            service_utc_offset: DEFAULT_UTC_OFFSET.parse().unwrap_or_else(|_| Utc.fix()),
            onboarding_debug_skip: false,
            admin_username: None,
            admin_password: None,
        }
    }
}

pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Invalid {}: {}", key, e)
    })
}
