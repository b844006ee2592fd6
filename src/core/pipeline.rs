//! Builds the published datasets from fetched series.

use crate::core::normalize::{PRICE_DECIMALS, normalize};
use crate::core::price::RawSeries;
use crate::core::rebase::rebase_100;
use crate::core::resample::{MonthLabel, monthly_last};
use crate::core::series::{Dataset, Metadata};
use anyhow::{Result, bail};
use tracing::debug;

/// The three history datasets written by one run.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryDatasets {
    pub daily: Dataset,
    pub monthly: Dataset,
    pub perf100: Dataset,
}

/// Normalizes, resamples and rebases every fetched series.
///
/// Fails when the provider returned no points at all, so nothing gets written.
pub fn build_history(
    raw: &[RawSeries],
    meta: Metadata,
    label: MonthLabel,
) -> Result<HistoryDatasets> {
    if raw.iter().all(RawSeries::is_empty) {
        bail!("No data returned from {}", meta.source);
    }

    let mut daily = Dataset::new(meta.clone());
    for series in raw {
        daily.insert(&series.symbol, normalize(series, PRICE_DECIMALS));
    }

    let mut monthly = Dataset::new(meta.clone());
    for (ticker, series) in daily.iter().filter(|(_, s)| !s.is_empty()) {
        monthly.insert(ticker, monthly_last(series, label));
    }

    let mut perf100 = Dataset::new(meta);
    for (ticker, series) in monthly.iter() {
        match rebase_100(series) {
            Some(rebased) => perf100.insert(ticker, rebased),
            None => debug!(ticker, "Skipping rebase for zero or missing base"),
        }
    }

    Ok(HistoryDatasets {
        daily,
        monthly,
        perf100,
    })
}
