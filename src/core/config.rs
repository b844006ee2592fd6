use crate::core::latest::QuoteLabels;
use crate::core::price::{HistoryRequest, Interval, Range};
use crate::core::resample::MonthLabel;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_TICKERS: [&str; 6] = ["VWCE.MI", "V60A.AS", "CSPX.AS", "VOO", "VT", "AOR"];

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FileNames {
    pub daily: String,
    pub monthly: String,
    pub perf100: String,
    pub latest: String,
}

impl Default for FileNames {
    fn default() -> Self {
        FileNames {
            daily: "prices_daily.json".to_string(),
            monthly: "prices_monthly.json".to_string(),
            perf100: "perf100_monthly.json".to_string(),
            latest: "sp500.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub range: Range,
    pub interval: Interval,
    pub adjusted: bool,
    pub monthly_label: MonthLabel,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            range: Range::Max,
            interval: Interval::OneDay,
            adjusted: true,
            monthly_label: MonthLabel::LastObservation,
        }
    }
}

impl HistoryConfig {
    pub fn request(&self) -> HistoryRequest {
        HistoryRequest {
            range: self.range,
            interval: self.interval,
            adjusted: self.adjusted,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LatestConfig {
    /// Symbol requested from the provider.
    pub symbol: String,
    /// Symbol written to the output record.
    pub display_symbol: String,
    /// Overrides the currency reported by the provider.
    pub currency: Option<String>,
    pub range: Range,
    pub include_source: bool,
}

impl Default for LatestConfig {
    fn default() -> Self {
        LatestConfig {
            symbol: "^GSPC".to_string(),
            display_symbol: "SPX".to_string(),
            currency: Some("USD".to_string()),
            range: Range::FiveDays,
            include_source: true,
        }
    }
}

impl LatestConfig {
    pub fn request(&self) -> HistoryRequest {
        HistoryRequest {
            range: self.range,
            interval: Interval::OneDay,
            adjusted: true,
        }
    }

    pub fn labels<'a>(&'a self, source: &'a str) -> QuoteLabels<'a> {
        QuoteLabels {
            display_symbol: &self.display_symbol,
            currency: self.currency.as_deref(),
            source: self.include_source.then_some(source),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub tickers: Vec<String>,
    pub output_dir: PathBuf,
    pub file_names: FileNames,
    pub history: HistoryConfig,
    pub latest: LatestConfig,
    pub providers: ProvidersConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            output_dir: PathBuf::from("public/data"),
            file_names: FileNames::default(),
            history: HistoryConfig::default(),
            latest: LatestConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "pricefeed", "pricefeed")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn yahoo_base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or("https://query1.finance.yahoo.com", |p| &p.base_url)
    }

    pub fn daily_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_names.daily)
    }

    pub fn monthly_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_names.monthly)
    }

    pub fn perf100_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_names.perf100)
    }

    pub fn latest_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_names.latest)
    }
}
