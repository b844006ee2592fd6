//! Single latest-price record.

use crate::core::normalize::{LATEST_PRICE_DECIMALS, latest_value};
use crate::core::price::RawSeries;
use anyhow::{Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestQuote {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub price: f64,
    pub currency: String,
    pub as_of_utc: String,
    pub last_updated_unix: i64,
}

/// How the record is labelled, independent of what was fetched.
#[derive(Debug, Clone, Default)]
pub struct QuoteLabels<'a> {
    pub display_symbol: &'a str,
    pub currency: Option<&'a str>,
    pub source: Option<&'a str>,
}

pub fn build_latest_quote(
    raw: &RawSeries,
    labels: &QuoteLabels<'_>,
    now: DateTime<Utc>,
) -> Result<LatestQuote> {
    let (as_of, price) = latest_value(raw, LATEST_PRICE_DECIMALS)
        .ok_or_else(|| anyhow!("No data returned for symbol: {}", raw.symbol))?;

    let currency = labels
        .currency
        .map(str::to_string)
        .or_else(|| raw.currency.clone())
        .ok_or_else(|| anyhow!("No currency known for symbol: {}", raw.symbol))?;

    Ok(LatestQuote {
        symbol: labels.display_symbol.to_string(),
        source: labels.source.map(str::to_string),
        price,
        currency,
        as_of_utc: as_of.to_rfc3339_opts(SecondsFormat::Secs, true),
        last_updated_unix: now.timestamp(),
    })
}
