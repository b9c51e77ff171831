//! Constrained primitive types used by model properties.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

/// Integer strictly greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PositiveInteger(u32);

impl PositiveInteger {
    /// Create a value, returning `None` for zero.
    pub const fn new(value: u32) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(PositiveInteger(value))
        }
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for PositiveInteger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not an integer", s))?;
        if value <= 0 {
            return Err(format!("{} is not a positive integer", value));
        }
        u32::try_from(value)
            .map(PositiveInteger)
            .map_err(|_| format!("{} is out of range", value))
    }
}

impl fmt::Display for PositiveInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer greater than or equal to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NonNegativeInteger(u32);

impl NonNegativeInteger {
    pub const fn new(value: u32) -> Self {
        NonNegativeInteger(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for NonNegativeInteger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not an integer", s))?;
        if value < 0 {
            return Err(format!("{} is negative", value));
        }
        u32::try_from(value)
            .map(NonNegativeInteger)
            .map_err(|_| format!("{} is out of range", value))
    }
}

impl fmt::Display for NonNegativeInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO-8601 timestamp.
///
/// OME-XML timestamps may carry a UTC offset or none at all; both are
/// accepted. The original text is kept so that serialization writes back
/// exactly what was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Timestamp {
    text: String,
    utc: NaiveDateTime,
}

impl Timestamp {
    /// The timestamp normalized to UTC (offset-less input is taken as UTC).
    pub fn as_naive_utc(&self) -> NaiveDateTime {
        self.utc
    }

    /// The timestamp exactly as written in the document.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for Timestamp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let utc = match DateTime::parse_from_rfc3339(text) {
            Ok(with_offset) => with_offset.naive_utc(),
            Err(_) => NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .map_err(|e| format!("'{}' is not an ISO-8601 timestamp: {}", text, e))?,
        };
        Ok(Timestamp {
            text: text.to_string(),
            utc,
        })
    }
}

impl From<Timestamp> for String {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.text
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_positive_integer() {
        assert_eq!("512".parse::<PositiveInteger>().unwrap().get(), 512);
        assert!("0".parse::<PositiveInteger>().is_err());
        assert!("-3".parse::<PositiveInteger>().is_err());
        assert!("abc".parse::<PositiveInteger>().is_err());
        assert!(PositiveInteger::new(0).is_none());
    }

    #[test]
    fn test_non_negative_integer() {
        assert_eq!("0".parse::<NonNegativeInteger>().unwrap().get(), 0);
        assert!("-1".parse::<NonNegativeInteger>().is_err());
    }

    #[test]
    fn test_timestamp_without_offset() {
        let ts: Timestamp = "2010-02-23T12:51:30".parse().unwrap();
        assert_eq!(ts.as_naive_utc().year(), 2010);
        assert_eq!(ts.as_naive_utc().hour(), 12);
        assert_eq!(ts.to_string(), "2010-02-23T12:51:30");
    }

    #[test]
    fn test_timestamp_with_offset_normalizes_to_utc() {
        let ts: Timestamp = "2010-02-23T12:51:30+02:00".parse().unwrap();
        assert_eq!(ts.as_naive_utc().hour(), 10);
        // Original text is preserved
        assert_eq!(ts.as_str(), "2010-02-23T12:51:30+02:00");
    }

    #[test]
    fn test_timestamp_rejects_garbage() {
        assert!("yesterday".parse::<Timestamp>().is_err());
        assert!("2010-02-23".parse::<Timestamp>().is_err());
    }
}
