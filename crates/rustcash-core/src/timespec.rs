//! GnuCash timestamps.
//!
//! A timestamp element wraps a `ts:date` child holding text such as
//! `2016-06-15 10:59:00 +0200`. Elements may also be absent, in which case
//! the value is *unset*; unset timestamps sort before every real instant.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// `chrono` format of the `ts:date` text.
pub const TIMESPEC_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Error returned when `ts:date` text does not match [`TIMESPEC_FORMAT`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp {input:?}: {source}")]
pub struct ParseTimespecError {
    /// The offending text.
    pub input: String,
    /// The chrono parse failure.
    #[source]
    pub source: chrono::ParseError,
}

/// An optional instant with the offset it was recorded in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timespec(Option<DateTime<FixedOffset>>);

impl Timespec {
    /// An unset timestamp.
    #[must_use]
    pub const fn unset() -> Self {
        Self(None)
    }

    /// The instant, if set.
    #[must_use]
    pub const fn get(&self) -> Option<&DateTime<FixedOffset>> {
        self.0.as_ref()
    }

    /// Whether the timestamp carries an instant.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// True if this timestamp is strictly before `t`. Unset is before everything.
    #[must_use]
    pub fn is_before(&self, t: &DateTime<FixedOffset>) -> bool {
        self.0.as_ref().map_or(true, |d| d < t)
    }

    /// `YYYY-MM-DD` in the recorded offset, or `""` if unset.
    #[must_use]
    pub fn ymd(&self) -> String {
        self.0
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

impl From<DateTime<FixedOffset>> for Timespec {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self(Some(dt))
    }
}

impl FromStr for Timespec {
    type Err = ParseTimespecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_str(s.trim(), TIMESPEC_FORMAT)
            .map(Self::from)
            .map_err(|source| ParseTimespecError {
                input: s.to_string(),
                source,
            })
    }
}

impl fmt::Display for Timespec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(d) => write!(f, "{}", d.format(TIMESPEC_FORMAT)),
            None => Ok(()),
        }
    }
}
