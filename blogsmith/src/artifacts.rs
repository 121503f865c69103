//! Timestamped JSON and HTML artifacts in the output directory.
//!
//! Every CLI step writes what it produced so the next step can pick it up
//! with `--outline`, `--article` or `--images`.

use anyhow::{Context, Result};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

fn timestamped(output_dir: &Path, kind: &str, extension: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d-%H%M%S%3f");
    output_dir.join(format!("{kind}-{stamp}.{extension}"))
}

fn write(path: PathBuf, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {parent:?}"))?;
    }
    fs::write(&path, content).with_context(|| format!("Failed to write artifact {path:?}"))?;
    info!(artifact = ?path, "Artifact saved");
    Ok(path)
}

/// Saves `value` as pretty JSON named `<kind>-<timestamp>.json`.
pub fn save_json<T: Serialize>(output_dir: &Path, kind: &str, value: &T) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {kind}"))?;
    write(timestamped(output_dir, kind, "json"), &json)
}

pub fn save_html(output_dir: &Path, kind: &str, html: &str) -> Result<PathBuf> {
    write(timestamped(output_dir, kind, "html"), html)
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read artifact {path:?}"))?;
    serde_json::from_str(&content).with_context(|| format!("Artifact {path:?} is not valid JSON"))
}
