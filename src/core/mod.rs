//! Core pipeline: types, normalization, resampling, rebasing

pub mod config;
pub mod latest;
pub mod log;
pub mod normalize;
pub mod pipeline;
pub mod price;
pub mod rebase;
pub mod resample;
pub mod series;

// Re-export main types for cleaner imports
pub use latest::LatestQuote;
pub use price::{HistoryProvider, HistoryRequest, RawSeries};
pub use series::{Dataset, Metadata, Observation, Series};
