use super::ui;
use crate::core::Dataset;
use crate::core::config::AppConfig;
use crate::store;
use anyhow::Result;
use comfy_table::Cell;
use std::path::Path;
use tracing::debug;

/// Prints what the published files currently contain.
pub fn run(config: &AppConfig) -> Result<()> {
    let files = [
        ("Daily", config.daily_path()),
        ("Monthly", config.monthly_path()),
        ("Perf 100", config.perf100_path()),
    ];

    for (title, path) in &files {
        println!("\n{}", ui::style_text(title, ui::StyleType::Title));
        match read_if_present(path)? {
            Some(dataset) => println!("{}", dataset_table(&dataset)),
            None => println!(
                "{}",
                ui::style_text(
                    &format!("{} not found", path.display()),
                    ui::StyleType::Subtle
                )
            ),
        }
    }

    let latest_path = config.latest_path();
    println!("\n{}", ui::style_text("Latest", ui::StyleType::Title));
    if latest_path.exists() {
        let quote = store::read_latest(&latest_path)?;
        println!(
            "{}: {:.2} {} as of {}",
            quote.symbol, quote.price, quote.currency, quote.as_of_utc
        );
    } else {
        println!(
            "{}",
            ui::style_text(
                &format!("{} not found", latest_path.display()),
                ui::StyleType::Subtle
            )
        );
    }

    Ok(())
}

fn read_if_present(path: &Path) -> Result<Option<Dataset>> {
    if !path.exists() {
        debug!("Skipping missing file {}", path.display());
        return Ok(None);
    }
    store::read_dataset(path).map(Some)
}

fn dataset_table(dataset: &Dataset) -> String {
    let mut table = ui::new_styled_table(&["Ticker", "Points", "First", "Last", "Last value"]);

    for (ticker, series) in dataset.iter() {
        match (series.first(), series.last()) {
            (Some(first), Some(last)) => table.add_row(vec![
                Cell::new(ticker),
                ui::number_cell(series.len()),
                Cell::new(first.date),
                Cell::new(last.date),
                ui::number_cell(format!("{:.4}", last.value)),
            ]),
            _ => table.add_row(vec![
                Cell::new(ticker),
                ui::number_cell(0),
                ui::na_cell(false),
                ui::na_cell(false),
                ui::na_cell(false),
            ]),
        };
    }

    format!(
        "{}\n{}",
        table,
        ui::style_text(
            &format!(
                "source: {}, updated: {}",
                dataset.meta.source, dataset.meta.last_updated_utc
            ),
            ui::StyleType::Subtle
        )
    )
}
