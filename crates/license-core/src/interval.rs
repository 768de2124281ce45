//! Interval Expressions
//!
//! Relative time expressions such as `"+1 hour"` or `"+2 days 6 hours"`,
//! used for check frequencies, retry back-off and offline grace periods.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{LicenseError, Result};

/// Calendar unit of an interval term
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Fortnight,
    Month,
    Year,
}

impl Unit {
    /// Length in seconds for fixed-size units
    const fn seconds(self) -> Option<i64> {
        match self {
            Self::Second => Some(1),
            Self::Minute => Some(60),
            Self::Hour => Some(3_600),
            Self::Day => Some(86_400),
            Self::Week => Some(604_800),
            Self::Fortnight => Some(1_209_600),
            Self::Month | Self::Year => None,
        }
    }
}

impl FromStr for Unit {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sec" | "secs" | "second" | "seconds" => Ok(Self::Second),
            "min" | "mins" | "minute" | "minutes" => Ok(Self::Minute),
            "hour" | "hours" => Ok(Self::Hour),
            "day" | "days" => Ok(Self::Day),
            "week" | "weeks" => Ok(Self::Week),
            "fortnight" | "fortnights" => Ok(Self::Fortnight),
            "month" | "months" => Ok(Self::Month),
            "year" | "years" => Ok(Self::Year),
            other => Err(LicenseError::InvalidInterval(format!("unknown unit '{other}'"))),
        }
    }
}

/// A relative time expression made of one or more `[+|-]N unit` terms
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Interval {
    terms: Vec<(i64, Unit)>,
    source: String,
}

impl Interval {
    /// Parse an expression like `"+1 hour"` or `"2 weeks 3 days"`
    pub fn parse(expr: &str) -> Result<Self> {
        let mut terms = Vec::new();
        let mut tokens = expr.split_whitespace();

        while let Some(token) = tokens.next() {
            let amount: i64 = token
                .strip_prefix('+')
                .unwrap_or(token)
                .parse()
                .map_err(|_| LicenseError::InvalidInterval(expr.to_string()))?;
            let unit = tokens
                .next()
                .ok_or_else(|| LicenseError::InvalidInterval(expr.to_string()))?
                .parse::<Unit>()
                .map_err(|_| LicenseError::InvalidInterval(expr.to_string()))?;
            terms.push((amount, unit));
        }

        if terms.is_empty() {
            return Err(LicenseError::InvalidInterval(expr.to_string()));
        }

        Ok(Self {
            terms,
            source: expr.trim().to_string(),
        })
    }

    /// Build a single-term interval
    pub fn of(amount: i64, unit: Unit) -> Self {
        let name = match unit {
            Unit::Second => "second",
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::Day => "day",
            Unit::Week => "week",
            Unit::Fortnight => "fortnight",
            Unit::Month => "month",
            Unit::Year => "year",
        };
        let plural = if amount.abs() == 1 { "" } else { "s" };
        Self {
            terms: vec![(amount, unit)],
            source: format!("{amount:+} {name}{plural}"),
        }
    }

    pub fn hours(amount: i64) -> Self {
        Self::of(amount, Unit::Hour)
    }

    pub fn days(amount: i64) -> Self {
        Self::of(amount, Unit::Day)
    }

    pub fn weeks(amount: i64) -> Self {
        Self::of(amount, Unit::Week)
    }

    /// Expression text as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Move `from` forward (or back) by this interval.
    ///
    /// Month and year terms follow calendar arithmetic; results that fall
    /// outside chrono's range saturate.
    pub fn apply(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        self.terms.iter().fold(from, |at, &(amount, unit)| {
            let shifted = match unit.seconds() {
                Some(secs) => amount
                    .checked_mul(secs)
                    .and_then(Duration::try_seconds)
                    .and_then(|d| at.checked_add_signed(d)),
                None => {
                    let months = if unit == Unit::Year {
                        amount.checked_mul(12)
                    } else {
                        Some(amount)
                    };
                    months.and_then(|m| {
                        let count = Months::new(u32::try_from(m.unsigned_abs()).ok()?);
                        if m >= 0 {
                            at.checked_add_months(count)
                        } else {
                            at.checked_sub_months(count)
                        }
                    })
                }
            };
            shifted.unwrap_or(if amount >= 0 {
                DateTime::<Utc>::MAX_UTC
            } else {
                DateTime::<Utc>::MIN_UTC
            })
        })
    }

    /// Epoch seconds of `now + self`
    pub fn epoch_from_now(&self) -> i64 {
        self.apply(Utc::now()).timestamp()
    }
}

impl FromStr for Interval {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Interval {
    type Error = LicenseError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.source
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// How often the remote service must be consulted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CheckFrequency {
    Daily,
    Hourly,
    Weekly,
    /// Literal interval expression, e.g. `"+3 days"`
    Custom(Interval),
}

impl CheckFrequency {
    pub const DAILY: &'static str = "daily";
    pub const HOURLY: &'static str = "hourly";
    pub const WEEKLY: &'static str = "weekly";

    /// Interval until the next remote check
    pub fn interval(&self) -> Interval {
        match self {
            Self::Daily => Interval::days(1),
            Self::Hourly => Interval::hours(1),
            Self::Weekly => Interval::weeks(1),
            Self::Custom(interval) => interval.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Daily => Self::DAILY,
            Self::Hourly => Self::HOURLY,
            Self::Weekly => Self::WEEKLY,
            Self::Custom(interval) => interval.as_str(),
        }
    }
}

impl Default for CheckFrequency {
    fn default() -> Self {
        Self::Daily
    }
}

impl FromStr for CheckFrequency {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            Self::DAILY => Ok(Self::Daily),
            Self::HOURLY => Ok(Self::Hourly),
            Self::WEEKLY => Ok(Self::Weekly),
            other => Interval::parse(other).map(Self::Custom),
        }
    }
}

impl TryFrom<String> for CheckFrequency {
    type Error = LicenseError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CheckFrequency> for String {
    fn from(frequency: CheckFrequency) -> Self {
        frequency.as_str().to_string()
    }
}

impl std::fmt::Display for CheckFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
