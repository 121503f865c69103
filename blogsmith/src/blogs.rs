//! Flat-file store of the WordPress blogs the CLI can publish to.
//!
//! The whole file is read and written at once; there is no locking, so two
//! concurrent `blogs add` invocations can lose an update.

use blogsmith_core::model::BrandVoice;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogRecord {
    pub id: String,
    pub name: String,
    pub site_url: String,
    pub username: String,
    pub app_password: String,
    /// Accept self-signed certificates, for staging sites.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub brand_voice: BrandVoice,
}

impl BlogRecord {
    pub fn api_base(&self) -> String {
        format!("{}/wp-json/wp/v2", self.site_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Error)]
pub enum BlogStoreError {
    #[error("no blog with id \"{id}\" in the blog store")]
    NotFound { id: String },

    #[error("a blog with id \"{id}\" already exists")]
    Duplicate { id: String },

    #[error("failed to access blog store {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("blog store is not valid YAML: {0}")]
    Format(#[from] serde_yaml::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BlogFile {
    #[serde(default)]
    blogs: Vec<BlogRecord>,
}

#[derive(Debug)]
pub struct BlogStore {
    path: PathBuf,
    blogs: Vec<BlogRecord>,
}

impl BlogStore {
    /// Opens the store; a missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BlogStoreError> {
        let path = path.as_ref().to_path_buf();
        let blogs = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_yaml::from_str::<BlogFile>(&content)?.blogs,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = ?path, "Blog store not found, starting empty");
                Vec::new()
            }
            Err(source) => return Err(BlogStoreError::Io { path, source }),
        };
        info!(path = ?path, blogs = blogs.len(), "Blog store loaded");
        Ok(Self { path, blogs })
    }

    pub fn save(&self) -> Result<(), BlogStoreError> {
        let yaml = serde_yaml::to_string(&BlogFile {
            blogs: self.blogs.clone(),
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| BlogStoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, yaml).map_err(|source| BlogStoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = ?self.path, blogs = self.blogs.len(), "Blog store saved");
        Ok(())
    }

    pub fn blogs(&self) -> &[BlogRecord] {
        &self.blogs
    }

    pub fn get(&self, id: &str) -> Result<&BlogRecord, BlogStoreError> {
        self.blogs
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| BlogStoreError::NotFound { id: id.to_string() })
    }

    pub fn add(&mut self, record: BlogRecord) -> Result<(), BlogStoreError> {
        if self.blogs.iter().any(|b| b.id == record.id) {
            return Err(BlogStoreError::Duplicate { id: record.id });
        }
        self.blogs.push(record);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<BlogRecord, BlogStoreError> {
        let index = self
            .blogs
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| BlogStoreError::NotFound { id: id.to_string() })?;
        Ok(self.blogs.remove(index))
    }
}
