//! `load_config` module: loads the static YAML config and merges environment
//! overrides into a [`CliConfig`].
//!
//! The YAML file carries no secrets. API keys are read from the environment
//! by each client's `new_from_env` through [`require_env`]; WordPress
//! credentials live in the blog store.
//!
//! # Accepted schema
//!
//! ```yaml
//! output_dir: ./output
//! blogs_file: ./blogs.yaml        # optional, defaults to blogs.yaml
//! image_provider: unsplash        # unsplash | pexels, optional
//! openai_base_url: https://...    # optional
//! generation:
//!   model: gpt-4o                 # optional
//!   min_images: 4                 # optional, MIN_IMAGES_PER_POST overrides
//! ```
use anyhow::Result;
use blogsmith_core::model::{GenerationSettings, PhotoSource, DEFAULT_MIN_IMAGES, DEFAULT_MODEL};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

pub const MIN_IMAGES_ENV: &str = "MIN_IMAGES_PER_POST";
pub const DEFAULT_BLOGS_FILE: &str = "blogs.yaml";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub output_dir: PathBuf,
    pub blogs_file: PathBuf,
    pub image_provider: PhotoSource,
    pub openai_base_url: String,
    pub settings: GenerationSettings,
}

#[derive(Debug, Default, Deserialize)]
struct GenerationSection {
    model: Option<String>,
    min_images: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    output_dir: PathBuf,
    blogs_file: Option<PathBuf>,
    image_provider: Option<String>,
    openai_base_url: Option<String>,
    #[serde(default)]
    generation: GenerationSection,
}

#[derive(Debug, Error)]
#[error("{0} missing in environment")]
pub struct MissingEnvVar(pub &'static str);

/// Reads a required secret, treating an empty value as missing.
pub fn require_env(name: &'static str) -> Result<String, MissingEnvVar> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => {
            error!(variable = name, "Required environment variable is not set");
            Err(MissingEnvVar(name))
        }
    }
}

/// Loads a static YAML config file and applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let image_provider = match raw.image_provider.as_deref() {
        None => PhotoSource::Unsplash,
        Some(name) => name.parse::<PhotoSource>().map_err(|e| {
            error!(image_provider = name, "Unknown image provider in config");
            anyhow::anyhow!(e)
        })?,
    };

    let mut min_images = raw.generation.min_images.unwrap_or(DEFAULT_MIN_IMAGES);
    if let Ok(value) = env::var(MIN_IMAGES_ENV) {
        match value.trim().parse::<usize>() {
            Ok(n) => {
                info!(min_images = n, "Minimum images overridden from environment");
                min_images = n;
            }
            Err(e) => {
                warn!(error = %e, raw = %value, "Ignoring invalid {MIN_IMAGES_ENV}");
            }
        }
    }

    let config = CliConfig {
        output_dir: raw.output_dir,
        blogs_file: raw
            .blogs_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOGS_FILE)),
        image_provider,
        openai_base_url: raw
            .openai_base_url
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        settings: GenerationSettings {
            model: raw
                .generation
                .model
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            min_images,
        },
    };
    info!(
        output_dir = ?config.output_dir,
        image_provider = %config.image_provider,
        model = %config.settings.model,
        min_images = config.settings.min_images,
        "Configuration loaded"
    );
    Ok(config)
}
