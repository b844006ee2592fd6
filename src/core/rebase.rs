//! Rebasing series to 100 at their first observation.

use crate::core::normalize::{PRICE_DECIMALS, round_to};
use crate::core::series::{Observation, Series};
use tracing::warn;

/// Rescales `series` so the first value is 100.
///
/// Returns `None` when the series is empty, its first value is zero or a ratio
/// overflows. Such tickers are left out of the rebased output.
pub fn rebase_100(series: &Series) -> Option<Series> {
    let base = series.first()?.value;
    if base == 0.0 {
        return None;
    }

    let mut rebased = Vec::with_capacity(series.len());
    for obs in series.iter() {
        let Some(value) = round_to(obs.value / base * 100.0, PRICE_DECIMALS) else {
            warn!(date = %obs.date, value = obs.value, base, "Value cannot be rebased");
            return None;
        };
        rebased.push(Observation::new(obs.date, value));
    }
    Some(Series::new(rebased))
}
