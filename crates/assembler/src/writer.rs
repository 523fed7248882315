//! Comparison dataset output.
//!
//! The dataset is serialized in full and written in one step: a sibling
//! temporary file is written and synced, then renamed over the target.

use recon_core::{ComparisonDataset, Error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Serialize the dataset to a JSON string.
pub fn to_json_string(dataset: &ComparisonDataset, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(dataset)?
    } else {
        serde_json::to_string(dataset)?
    };
    Ok(text)
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::config(format!("invalid output path {}", path.display())))?;
    Ok(path.with_file_name(format!(".{name}.tmp")))
}

/// Write the dataset to `path`, replacing any previous file atomically.
///
/// The parent directory must already exist.
pub fn write_dataset(path: &Path, dataset: &ComparisonDataset, pretty: bool) -> Result<()> {
    let text = to_json_string(dataset, pretty)?;
    let tmp = temp_path(path)?;

    let written = File::create(&tmp).and_then(|mut file| {
        file.write_all(text.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    info!(
        path = %path.display(),
        bytes = text.len(),
        addresses = dataset.address_count(),
        records = dataset.record_count(),
        "comparison dataset written"
    );
    Ok(())
}
