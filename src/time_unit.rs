use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const MILLIS_PER_SECOND: i64 = 1000;
const MILLIS_PER_MINUTE: i64 = MILLIS_PER_SECOND * 60;
const MILLIS_PER_HOUR: i64 = MILLIS_PER_MINUTE * 60;
const MILLIS_PER_DAY: i64 = MILLIS_PER_HOUR * 24;

#[derive(Error, Debug, PartialEq)]
#[error("ttlUnit must be valid: `{0}`")]
pub struct InvalidTimeUnit(pub String);

/// Units a credential time-to-live can be expressed in.
///
/// `Months` and `Years` are fixed approximations (30 and 365 days), not calendar arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Months,
    Years,
}

impl TimeUnit {
    /// Milliseconds represented by a single unit.
    pub fn millis(&self) -> i64 {
        match self {
            TimeUnit::Seconds => MILLIS_PER_SECOND,
            TimeUnit::Minutes => MILLIS_PER_MINUTE,
            TimeUnit::Hours => MILLIS_PER_HOUR,
            TimeUnit::Days => MILLIS_PER_DAY,
            TimeUnit::Months => MILLIS_PER_DAY * 30,
            TimeUnit::Years => MILLIS_PER_DAY * 365,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
            TimeUnit::Months => "months",
            TimeUnit::Years => "years",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = InvalidTimeUnit;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "seconds" => Ok(TimeUnit::Seconds),
            "minutes" => Ok(TimeUnit::Minutes),
            "hours" => Ok(TimeUnit::Hours),
            "days" => Ok(TimeUnit::Days),
            "months" => Ok(TimeUnit::Months),
            "years" => Ok(TimeUnit::Years),
            _ => Err(InvalidTimeUnit(value.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
