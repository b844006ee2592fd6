use super::ui;
use crate::core::config::AppConfig;
use anyhow::{Context, Result, bail};
use std::path::Path;

/// Example configuration shipped in the binary. It spells out the built-in defaults.
pub const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example configuration to the default config location.
pub fn run() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    write_example_config(&path)?;
    println!(
        "Created configuration at {}",
        ui::style_text(&path.display().to_string(), ui::StyleType::Title)
    );
    Ok(())
}

/// Writes the example configuration to `path`. Never overwrites an existing file.
pub fn write_example_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
