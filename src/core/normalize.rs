//! Turns provider series into dated, rounded observations.

use crate::core::price::RawSeries;
use crate::core::series::{Observation, Series};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

/// Decimal places kept for historical prices.
pub const PRICE_DECIMALS: u32 = 4;
/// Decimal places kept for the single latest price.
pub const LATEST_PRICE_DECIMALS: u32 = 2;

/// Rounds `value` to `decimals` places using its exact binary value, ties to even.
///
/// Returns `None` for NaN and infinities.
pub fn round_to(value: f64, decimals: u32) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    match Decimal::from_f64_retain(value) {
        Some(exact) => {
            let rounded =
                exact.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven);
            rounded.to_string().parse().ok()
        }
        // Out of decimal range: large magnitudes have no fractional digits left,
        // tiny ones round to zero.
        None if value.abs() < 1.0 => Some(0.0),
        None => Some(value),
    }
}

/// Drops missing values, converts timestamps to UTC dates and rounds.
///
/// The output is ascending by date. When several points fall on the same UTC
/// date the latest timestamp wins.
pub fn normalize(raw: &RawSeries, decimals: u32) -> Series {
    let mut by_date: BTreeMap<_, (DateTime<Utc>, f64)> = BTreeMap::new();

    for point in &raw.points {
        let Some(value) = point.value.and_then(|v| round_to(v, decimals)) else {
            continue;
        };
        let timestamp = point.timestamp.to_utc();
        let date = timestamp.date_naive();
        match by_date.get(&date) {
            Some((existing, _)) if *existing > timestamp => {}
            _ => {
                by_date.insert(date, (timestamp, value));
            }
        }
    }

    by_date
        .into_iter()
        .map(|(date, (_, value))| Observation::new(date, value))
        .collect()
}

/// Most recent non-missing value with its UTC timestamp.
pub fn latest_value(raw: &RawSeries, decimals: u32) -> Option<(DateTime<Utc>, f64)> {
    raw.points
        .iter()
        .filter_map(|point| {
            let value = point.value.and_then(|v| round_to(v, decimals))?;
            Some((point.timestamp.to_utc(), value))
        })
        .max_by_key(|(timestamp, _)| *timestamp)
}
