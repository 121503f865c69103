//! # contract: interfaces to every external collaborator
//!
//! Three traits cover everything the pipeline talks to:
//! - [`CompletionClient`]: one prompt in, raw model text out.
//! - [`PhotoProvider`]: stock-photo search, normalised to [`CandidatePhoto`].
//! - [`CmsClient`]: taxonomy, media and post endpoints of the publishing
//!   target.
//!
//! Real HTTP implementations live in the `blogsmith` crate. Each trait is
//! annotated for `mockall`, and the mocks are exported behind the default
//! `test-export-mocks` feature so downstream tests can use them.
//!
//! Every method fails with [`ServiceError`], which keeps authentication
//! failures and rate limiting distinguishable from generic errors.

use async_trait::async_trait;
use mockall::automock;

use crate::error::ServiceError;
use crate::model::{CandidatePhoto, PublishMode};

/// One completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// `None` lets the client use its configured default model.
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: Option<String>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            max_tokens: 4000,
            temperature: 0.7,
            system_prompt: None,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the model's raw text. Callers strip code fences themselves.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Squarish,
}

impl Orientation {
    /// Query value understood by both photo providers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Squarish => "squarish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub per_page: u32,
    pub orientation: Orientation,
}

impl SearchOptions {
    pub fn landscape(per_page: u32) -> Self {
        Self {
            per_page,
            orientation: Orientation::Landscape,
        }
    }
}

/// A stock-photo search backend.
///
/// Download accounting is optional: only candidates that carry a
/// `download_location` are ever passed to [`PhotoProvider::track_download`],
/// and providers without the requirement keep the default no-op.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PhotoProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<CandidatePhoto>, ServiceError>;

    async fn track_download(&self, _download_location: &str) -> Result<(), ServiceError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taxonomy {
    Category,
    Tag,
}

impl Taxonomy {
    /// REST collection name.
    pub fn collection(&self) -> &'static str {
        match self {
            Taxonomy::Category => "categories",
            Taxonomy::Tag => "tags",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: u64,
    pub name: String,
}

/// Media to upload; the client fetches the bytes from `source_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedia {
    pub source_url: String,
    pub alt_text: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub id: u64,
    /// URL of the uploaded copy on the CMS.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub mode: PublishMode,
    pub categories: Vec<u64>,
    pub tags: Vec<u64>,
    pub featured_media: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    pub status: String,
    pub link: Option<String>,
    pub date: Option<String>,
    pub edit_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub id: u64,
    pub title: String,
    pub modified: String,
    pub edit_url: String,
}

/// The publishing target. One client is bound to one blog's credentials.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Terms whose name matches `name` (server-side search).
    async fn find_terms(&self, taxonomy: Taxonomy, name: &str) -> Result<Vec<Term>, ServiceError>;

    async fn create_term(&self, taxonomy: Taxonomy, name: &str) -> Result<Term, ServiceError>;

    async fn upload_media(&self, media: NewMedia) -> Result<Media, ServiceError>;

    async fn create_post(&self, post: NewPost) -> Result<Post, ServiceError>;

    async fn update_post_status(&self, post_id: u64, mode: PublishMode) -> Result<Post, ServiceError>;

    /// Most recently modified drafts first.
    async fn list_drafts(&self, per_page: u32) -> Result<Vec<PostSummary>, ServiceError>;

    async fn delete_post(&self, post_id: u64) -> Result<(), ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let req = CompletionRequest::new("hi")
            .model("gpt-4o-mini")
            .max_tokens(500)
            .temperature(0.5)
            .system_prompt("be brief");
        assert_eq!(req.prompt, "hi");
        assert_eq!(req.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(req.max_tokens, 500);
        assert_eq!(req.temperature, 0.5);
        assert_eq!(req.system_prompt.as_deref(), Some("be brief"));
    }

    struct SearchOnly;

    #[async_trait]
    impl PhotoProvider for SearchOnly {
        async fn search(
            &self,
            _query: &str,
            _options: SearchOptions,
        ) -> Result<Vec<CandidatePhoto>, ServiceError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_default_track_download_is_noop() {
        let provider = SearchOnly;
        assert!(provider.track_download("https://example.test/dl").await.is_ok());
        assert_eq!(Orientation::Landscape.as_str(), "landscape");
        assert_eq!(Taxonomy::Tag.collection(), "tags");
    }
}
