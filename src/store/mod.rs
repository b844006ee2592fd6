//! Published JSON files on disk.

pub mod json;

pub use json::{
    StagedFile, read_dataset, read_latest, stage_dataset, write_dataset, write_latest,
};
