use super::ui;
use crate::core::config::AppConfig;
use crate::core::pipeline::{HistoryDatasets, build_history};
use crate::core::{HistoryProvider, HistoryRequest, Metadata, RawSeries};
use crate::store;
use anyhow::Result;
use chrono::Utc;
use comfy_table::Cell;
use futures::future::join_all;
use tracing::{info, warn};

/// Fetches every symbol concurrently. Failed symbols are logged and left out.
///
/// The result keeps the order of `symbols`.
pub async fn fetch_all(
    provider: &(dyn HistoryProvider + Send + Sync),
    symbols: &[String],
    request: &HistoryRequest,
) -> Vec<RawSeries> {
    let pb = ui::new_progress_bar(symbols.len() as u64);
    pb.set_message("Fetching");
    let futures = symbols.iter().map(|symbol| {
        let pb = pb.clone();
        async move {
            let res = provider.fetch_history(symbol, request).await;
            pb.inc(1);
            (symbol, res)
        }
    });
    let results = join_all(futures).await;
    pb.finish_and_clear();

    results
        .into_iter()
        .filter_map(|(symbol, res)| match res {
            Ok(series) => Some(series),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Skipping ticker");
                None
            }
        })
        .collect()
}

/// Fetches the configured tickers and writes the daily, monthly and rebased files.
pub async fn run(
    config: &AppConfig,
    provider: &(dyn HistoryProvider + Send + Sync),
) -> Result<HistoryDatasets> {
    let request = config.history.request();
    info!(tickers = config.tickers.len(), range = %request.range, "Fetching price history");

    let fetched = fetch_all(provider, &config.tickers, &request).await;
    let meta = Metadata::new(provider.source(), Utc::now());
    let datasets = build_history(&fetched, meta, config.history.monthly_label)?;

    let daily_path = config.daily_path();
    let monthly_path = config.monthly_path();
    let perf100_path = config.perf100_path();
    // Nothing is replaced until all three files are fully written.
    let staged = [
        store::stage_dataset(&daily_path, &datasets.daily)?,
        store::stage_dataset(&monthly_path, &datasets.monthly)?,
        store::stage_dataset(&perf100_path, &datasets.perf100)?,
    ];
    for file in staged {
        file.commit()?;
    }

    println!(
        "Wrote: {} {} {}",
        daily_path.display(),
        monthly_path.display(),
        perf100_path.display()
    );
    println!("{}", summary_table(&config.tickers, &datasets));

    Ok(datasets)
}

fn summary_table(tickers: &[String], datasets: &HistoryDatasets) -> String {
    let mut table = ui::new_styled_table(&["Ticker", "Daily pts", "Monthly pts", "Perf 100"]);

    for ticker in tickers {
        let Some(daily) = datasets.daily.get(ticker) else {
            table.add_row(vec![
                Cell::new(ui::style_text(ticker, ui::StyleType::Error)),
                ui::na_cell(true),
                ui::na_cell(true),
                ui::na_cell(true),
            ]);
            continue;
        };

        let monthly_points = datasets.monthly.get(ticker).map_or(0, |s| s.len());
        let perf = match datasets.perf100.get(ticker).and_then(|s| s.last()) {
            Some(last) => ui::number_cell(format!("{:.2}", last.value)),
            None => ui::na_cell(false),
        };
        table.add_row(vec![
            Cell::new(ticker),
            ui::number_cell(daily.len()),
            ui::number_cell(monthly_points),
            perf,
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::{Interval, Range, RawPoint, RawTimestamp};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    struct StubProvider {
        series: HashMap<String, RawSeries>,
    }

    #[async_trait]
    impl HistoryProvider for StubProvider {
        fn source(&self) -> &str {
            "stub"
        }

        async fn fetch_history(
            &self,
            symbol: &str,
            _request: &HistoryRequest,
        ) -> Result<RawSeries> {
            self.series
                .get(symbol)
                .cloned()
                .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))
        }
    }

    fn stub(symbols: &[&str]) -> StubProvider {
        let series = symbols
            .iter()
            .map(|s| {
                let ts = Utc.with_ymd_and_hms(2024, 1, 31, 14, 30, 0).unwrap();
                let point = RawPoint::new(RawTimestamp::Aware(ts.fixed_offset()), Some(10.0));
                (s.to_string(), RawSeries::new(s, None, vec![point]))
            })
            .collect();
        StubProvider { series }
    }

    fn request() -> HistoryRequest {
        HistoryRequest {
            range: Range::Max,
            interval: Interval::OneDay,
            adjusted: true,
        }
    }

    #[tokio::test]
    async fn test_fetch_all_skips_failures_and_keeps_order() {
        let provider = stub(&["VT", "VOO"]);
        let symbols = vec!["VOO".to_string(), "MISSING".to_string(), "VT".to_string()];

        let fetched = fetch_all(&provider, &symbols, &request()).await;

        let names: Vec<&str> = fetched.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(names, vec!["VOO", "VT"]);
    }

    #[tokio::test]
    async fn test_run_writes_nothing_when_no_data() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            tickers: vec!["MISSING".to_string()],
            output_dir: temp_dir.path().join("data"),
            ..AppConfig::default()
        };

        let err = run(&config, &stub(&[])).await.unwrap_err();
        assert_eq!(err.to_string(), "No data returned from stub");
        assert!(!config.output_dir.exists());
    }

    #[tokio::test]
    async fn test_run_writes_three_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            tickers: vec!["VOO".to_string(), "AOR".to_string()],
            output_dir: temp_dir.path().to_path_buf(),
            ..AppConfig::default()
        };

        let datasets = run(&config, &stub(&["VOO", "AOR"])).await.unwrap();

        assert_eq!(store::read_dataset(&config.daily_path()).unwrap(), datasets.daily);
        assert_eq!(
            store::read_dataset(&config.monthly_path()).unwrap(),
            datasets.monthly
        );
        assert_eq!(
            store::read_dataset(&config.perf100_path()).unwrap(),
            datasets.perf100
        );
        assert_eq!(datasets.perf100.get("AOR").unwrap().first().unwrap().value, 100.0);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig {
            tickers: vec!["VOO".to_string()],
            output_dir: temp_dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        // the monthly file's directory cannot be created
        std::fs::write(temp_dir.path().join("blocked"), "").unwrap();
        config.file_names.monthly = "blocked/prices_monthly.json".to_string();
        std::fs::write(config.daily_path(), "old").unwrap();

        let err = run(&config, &stub(&["VOO"])).await.unwrap_err();

        assert!(err.to_string().contains("Failed to create directory"));
        assert_eq!(std::fs::read_to_string(config.daily_path()).unwrap(), "old");
        assert!(!config.perf100_path().exists());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_summary_table_marks_missing_tickers() {
        let fetched: Vec<RawSeries> = stub(&["VOO"]).series.into_values().collect();
        let datasets = build_history(
            &fetched,
            Metadata::new("stub", Utc::now()),
            Default::default(),
        )
        .unwrap();

        let table = summary_table(&["VOO".to_string(), "GONE".to_string()], &datasets);
        assert!(table.contains("VOO"));
        assert!(table.contains("GONE"));
        assert!(table.contains("N/A"));
        assert!(table.contains("100.00"));
    }
}
