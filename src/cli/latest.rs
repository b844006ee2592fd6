use super::ui;
use crate::core::HistoryProvider;
use crate::core::config::AppConfig;
use crate::core::latest::{LatestQuote, build_latest_quote};
use crate::store;
use anyhow::Result;
use chrono::Utc;
use tracing::info;

/// Fetches the trailing window for the configured symbol and writes its latest close.
pub async fn run(
    config: &AppConfig,
    provider: &(dyn HistoryProvider + Send + Sync),
) -> Result<LatestQuote> {
    let latest = &config.latest;
    info!(symbol = %latest.symbol, range = %latest.range, "Fetching latest price");

    let raw = provider
        .fetch_history(&latest.symbol, &latest.request())
        .await?;
    let quote = build_latest_quote(&raw, &latest.labels(provider.source()), Utc::now())?;

    let path = config.latest_path();
    store::write_latest(&path, &quote)?;

    println!(
        "Wrote {}: {} {} {} as of {}",
        path.display(),
        quote.symbol,
        ui::style_text(&format!("{:.2}", quote.price), ui::StyleType::Success),
        quote.currency,
        quote.as_of_utc
    );
    Ok(quote)
}
