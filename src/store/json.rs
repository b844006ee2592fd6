use crate::core::{Dataset, LatestQuote};
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Compact,
    Pretty,
}

/// A fully written temporary file next to its target.
///
/// `commit` renames it over the target. Dropping it uncommitted removes it.
#[derive(Debug)]
pub struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.temp, &self.target)
            .with_context(|| format!("Failed to replace file: {}", self.target.display()))?;
        self.committed = true;
        debug!("Wrote {}", self.target.display());
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed && fs::remove_file(&self.temp).is_ok() {
            debug!("Discarded {}", self.temp.display());
        }
    }
}

fn stage_json<T: Serialize>(path: &Path, payload: &T, layout: Layout) -> Result<StagedFile> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut temp_name = OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".tmp");
    let staged = StagedFile {
        temp: path.with_file_name(temp_name),
        target: path.to_path_buf(),
        committed: false,
    };

    let file = File::create(&staged.temp)
        .with_context(|| format!("Failed to create file: {}", staged.temp.display()))?;
    let mut writer = BufWriter::new(file);
    let written = match layout {
        Layout::Compact => serde_json::to_writer(&mut writer, payload),
        Layout::Pretty => serde_json::to_writer_pretty(&mut writer, payload),
    };
    written.with_context(|| format!("Failed to serialize JSON to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write file: {}", staged.temp.display()))?;

    Ok(staged)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file: {}", path.display()))
}

/// Writes a dataset as compact JSON to a temporary file beside `path`.
pub fn stage_dataset(path: &Path, dataset: &Dataset) -> Result<StagedFile> {
    stage_json(path, dataset, Layout::Compact)
}

/// Writes a dataset as compact JSON, replacing any previous file.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    stage_dataset(path, dataset)?.commit()
}

pub fn read_dataset(path: &Path) -> Result<Dataset> {
    read_json(path)
}

/// Writes the latest-price record indented for readability.
pub fn write_latest(path: &Path, quote: &LatestQuote) -> Result<()> {
    stage_json(path, quote, Layout::Pretty)?.commit()
}

pub fn read_latest(path: &Path) -> Result<LatestQuote> {
    read_json(path)
}
