//! Kickoff timestamps stored as Japan Standard Time wall-clock values.
//!
//! Every artifact written by this crate labels the JST numerics with a `Z`
//! suffix. Nothing here converts a [`KickoffJst`] back through UTC: consumers
//! read the digits as local Japanese time.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

const JST_OFFSET_HOURS: i64 = 9;
const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Sentinel the J.League site uses for fixtures without a confirmed date.
pub const UNDETERMINED_DATE: &str = "未定";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KickoffError {
    #[error("kickoff date is undetermined")]
    Undetermined,
    #[error("kickoff time is missing")]
    MissingTime,
    #[error("invalid date token: {0}")]
    InvalidDate(String),
    #[error("invalid time token: {0}")]
    InvalidTime(String),
    #[error("invalid UTC timestamp: {0}")]
    InvalidTimestamp(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KickoffJst(NaiveDateTime);

impl KickoffJst {
    /// Shift a genuine UTC instant into Japanese wall-clock time.
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self(instant.naive_utc() + Duration::hours(JST_OFFSET_HOURS))
    }

    /// Parse a UTC timestamp such as `2026-02-05T10:00:00Z`. A bare
    /// `YYYY-MM-DD` is read as midnight UTC.
    pub fn parse_utc(raw: &str) -> Result<Self, KickoffError> {
        let raw = raw.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Self::from_utc(instant.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|date| Self::from_utc(date.and_time(NaiveTime::MIN).and_utc()))
            .map_err(|_| KickoffError::InvalidTimestamp(raw.to_string()))
    }

    /// Parse the J.League pair of `26/02/06(金)` and `19:00`, which are
    /// already Japanese local time.
    pub fn parse_jleague(date: &str, time: &str) -> Result<Self, KickoffError> {
        let date_part = date.split('(').next().unwrap_or_default().trim();
        if date_part.is_empty() || date_part == UNDETERMINED_DATE {
            return Err(KickoffError::Undetermined);
        }

        let captures = date_token_pattern()
            .captures(date_part)
            .ok_or_else(|| KickoffError::InvalidDate(date.to_string()))?;
        let field = |i: usize| -> Result<u32, KickoffError> {
            captures[i]
                .parse::<u32>()
                .map_err(|_| KickoffError::InvalidDate(date.to_string()))
        };
        let year = 2000 + field(1)? as i32;
        let day = NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)
            .ok_or_else(|| KickoffError::InvalidDate(date.to_string()))?;

        let time = time.trim();
        if time.is_empty() || time == "-" {
            return Err(KickoffError::MissingTime);
        }
        let mut parts = time.split(':');
        let hour = parts
            .next()
            .and_then(|h| h.trim().parse::<u32>().ok())
            .ok_or_else(|| KickoffError::InvalidTime(time.to_string()))?;
        let minute = match parts.next() {
            Some(m) => m
                .trim()
                .parse::<u32>()
                .map_err(|_| KickoffError::InvalidTime(time.to_string()))?,
            None => 0,
        };
        let naive = day
            .and_hms_opt(hour, minute, 0)
            .ok_or_else(|| KickoffError::InvalidTime(time.to_string()))?;

        Ok(Self(naive))
    }

    /// Parse a stored `kickoff_datetime_jst` value, ignoring the `Z` label.
    pub fn parse_stored(raw: &str) -> Result<Self, KickoffError> {
        let trimmed = raw.trim().trim_end_matches('Z');
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .map(Self)
            .map_err(|_| KickoffError::InvalidTimestamp(raw.to_string()))
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Milliseconds of the JST numerics read as if they were UTC, used when
    /// synthesizing ids for scraped rows.
    pub fn label_millis(&self) -> i64 {
        self.0.and_utc().timestamp_millis()
    }
}

impl fmt::Display for KickoffJst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(STORAGE_FORMAT))
    }
}

impl Serialize for KickoffJst {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KickoffJst {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        KickoffJst::parse_stored(&raw).map_err(serde::de::Error::custom)
    }
}

fn date_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{1,2})$").expect("date token pattern is valid")
    })
}

/// The current instant as Japanese wall-clock time.
pub fn jst_now(now: DateTime<Utc>) -> NaiveDateTime {
    KickoffJst::from_utc(now).naive()
}
