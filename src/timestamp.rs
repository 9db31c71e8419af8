//! ISO-8601 timestamps as they appear across the three date sources.
//!
//! Dates reach the resolver in two shapes:
//!
//! - **Naive** wall-clock times from front-matter. Any offset written in the
//!   front-matter is discarded on parse, so `2024-01-10T09:00:00+08:00`
//!   becomes `2024-01-10T09:00:00`.
//! - **Zoned** times carrying a fixed UTC offset, from git (`%aI`) and from
//!   filesystem stamps converted into the local zone.
//!
//! Both serialize as ISO-8601 strings, which is also the representation
//! used in the cache file.

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, SecondsFormat,
    format::{Item, StrftimeItems},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("not an ISO-8601 date or date-time: {0:?}")]
pub struct TimestampError(pub String);

/// Date-time with an explicit offset.
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Date-time without an offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Parse an ISO-8601 date or date-time.
    ///
    /// Accepts RFC 3339, a space instead of `T`, minute precision, and bare
    /// dates (`2024-01-10` → midnight).
    pub fn parse(input: &str) -> Result<Self, TimestampError> {
        let s = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::Zoned(dt));
        }
        for fmt in ZONED_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Ok(Self::Zoned(dt));
            }
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Self::Naive(dt));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self::Naive)
            .ok_or_else(|| TimestampError(input.to_string()))
    }

    /// Current time in the local zone.
    pub fn now() -> Self {
        Self::Zoned(Local::now().fixed_offset())
    }

    /// Convert a filesystem stamp into a local-zone timestamp.
    pub fn from_system_time(time: SystemTime) -> Self {
        Self::Zoned(DateTime::<Local>::from(time).fixed_offset())
    }

    /// Wall-clock time with any offset dropped.
    pub fn naive(&self) -> NaiveDateTime {
        match self {
            Self::Naive(dt) => *dt,
            Self::Zoned(dt) => dt.naive_local(),
        }
    }

    /// The same wall-clock time without its offset.
    pub fn without_offset(self) -> Self {
        Self::Naive(self.naive())
    }

    /// Key for chronological ordering. Zoned values compare by instant,
    /// naive ones by wall clock.
    pub fn sort_key(&self) -> NaiveDateTime {
        match self {
            Self::Naive(dt) => *dt,
            Self::Zoned(dt) => dt.naive_utc(),
        }
    }

    pub fn to_iso(&self) -> String {
        match self {
            Self::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Self::Zoned(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        }
    }

    /// Render with a strftime pattern.
    ///
    /// Falls back to ISO-8601 if the pattern is invalid rather than
    /// panicking inside `Display`.
    pub fn format(&self, pattern: &str) -> String {
        if !is_valid_format(pattern) {
            return self.to_iso();
        }
        match self {
            Self::Naive(dt) => dt.format(pattern).to_string(),
            Self::Zoned(dt) => dt.format(pattern).to_string(),
        }
    }
}

/// Whether chrono understands every specifier in a strftime pattern.
pub fn is_valid_format(pattern: &str) -> bool {
    StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}
