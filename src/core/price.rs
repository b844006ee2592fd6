//! History provider abstractions and the raw, provider-neutral series types

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Lookback window requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Range {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Range::OneDay => "1d",
                Range::FiveDays => "5d",
                Range::OneMonth => "1mo",
                Range::ThreeMonths => "3mo",
                Range::SixMonths => "6mo",
                Range::OneYear => "1y",
                Range::TwoYears => "2y",
                Range::FiveYears => "5y",
                Range::TenYears => "10y",
                Range::YearToDate => "ytd",
                Range::Max => "max",
            }
        )
    }
}

impl FromStr for Range {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1d" => Ok(Range::OneDay),
            "5d" => Ok(Range::FiveDays),
            "1mo" => Ok(Range::OneMonth),
            "3mo" => Ok(Range::ThreeMonths),
            "6mo" => Ok(Range::SixMonths),
            "1y" => Ok(Range::OneYear),
            "2y" => Ok(Range::TwoYears),
            "5y" => Ok(Range::FiveYears),
            "10y" => Ok(Range::TenYears),
            "ytd" => Ok(Range::YearToDate),
            "max" => Ok(Range::Max),
            _ => Err(anyhow!("Invalid range: {}", s)),
        }
    }
}

impl TryFrom<String> for Range {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Range> for String {
    fn from(value: Range) -> Self {
        value.to_string()
    }
}

/// Sampling interval of the requested bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    OneDay,
    OneWeek,
    OneMonth,
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Interval::OneDay => "1d",
                Interval::OneWeek => "1wk",
                Interval::OneMonth => "1mo",
            }
        )
    }
}

impl FromStr for Interval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1d" => Ok(Interval::OneDay),
            "1wk" => Ok(Interval::OneWeek),
            "1mo" => Ok(Interval::OneMonth),
            _ => Err(anyhow!("Invalid interval: {}", s)),
        }
    }
}

impl TryFrom<String> for Interval {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(value: Interval) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    pub range: Range,
    pub interval: Interval,
    /// Apply dividend and split adjustments to the closes.
    pub adjusted: bool,
}

/// Timestamp as reported by a provider. Naive values are taken as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTimestamp {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl RawTimestamp {
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            RawTimestamp::Naive(naive) => naive.and_utc(),
            RawTimestamp::Aware(aware) => aware.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    pub timestamp: RawTimestamp,
    pub value: Option<f64>,
}

impl RawPoint {
    pub fn new(timestamp: RawTimestamp, value: Option<f64>) -> Self {
        Self { timestamp, value }
    }
}

/// Time-indexed closes for one symbol, straight from the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub symbol: String,
    pub currency: Option<String>,
    pub points: Vec<RawPoint>,
}

impl RawSeries {
    pub fn new(symbol: &str, currency: Option<String>, points: Vec<RawPoint>) -> Self {
        Self {
            symbol: symbol.to_string(),
            currency,
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Name recorded as the `source` of published files.
    fn source(&self) -> &str;

    async fn fetch_history(&self, symbol: &str, request: &HistoryRequest) -> Result<RawSeries>;
}
