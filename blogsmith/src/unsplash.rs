//! Unsplash search client.
//!
//! Unsplash answers an exhausted hourly quota with 403, so that status is
//! reported as rate limiting rather than a generic failure.

use async_trait::async_trait;
use blogsmith_core::contract::{PhotoProvider, SearchOptions};
use blogsmith_core::error::ServiceError;
use blogsmith_core::model::{CandidatePhoto, PhotoSource, PhotoUrls};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::http::{ensure_success, network, read_json};
use crate::load_config::{require_env, MissingEnvVar};

const SERVICE: &str = "Unsplash";
pub const UNSPLASH_API: &str = "https://api.unsplash.com";
pub const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

pub struct UnsplashClient {
    http: reqwest::Client,
    base_url: String,
    access_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    id: String,
    urls: UnsplashUrls,
    description: Option<String>,
    alt_description: Option<String>,
    user: UnsplashUser,
    #[serde(default)]
    links: PhotoLinks,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    #[serde(default)]
    full: String,
    #[serde(default)]
    regular: String,
    #[serde(default)]
    thumb: String,
}

#[derive(Debug, Deserialize)]
struct UnsplashUser {
    name: String,
    #[serde(default)]
    links: UserLinks,
}

#[derive(Debug, Default, Deserialize)]
struct UserLinks {
    #[serde(default)]
    html: String,
}

#[derive(Debug, Default, Deserialize)]
struct PhotoLinks {
    download_location: Option<String>,
}

impl From<UnsplashPhoto> for CandidatePhoto {
    fn from(photo: UnsplashPhoto) -> Self {
        CandidatePhoto {
            id: photo.id,
            urls: PhotoUrls {
                full: photo.urls.full,
                regular: photo.urls.regular,
                thumb: photo.urls.thumb,
            },
            description: photo.description.or(photo.alt_description),
            photographer_name: photo.user.name,
            photographer_url: photo.user.links.html,
            download_location: photo.links.download_location,
            source: PhotoSource::Unsplash,
        }
    }
}

impl UnsplashClient {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self::with_base_url(UNSPLASH_API, access_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_key: access_key.into(),
        }
    }

    pub fn new_from_env() -> Result<Self, MissingEnvVar> {
        let access_key = require_env(ACCESS_KEY_ENV)?;
        tracing::info!("Initialized UnsplashClient from environment");
        Ok(Self::new(access_key))
    }

    fn authorization(&self) -> String {
        format!("Client-ID {}", self.access_key)
    }

    async fn checked(&self, response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        if response.status() == StatusCode::FORBIDDEN {
            tracing::warn!("Unsplash refused the request, hourly quota likely exhausted");
            return Err(ServiceError::RateLimited { service: SERVICE });
        }
        ensure_success(SERVICE, response).await
    }
}

#[async_trait]
impl PhotoProvider for UnsplashClient {
    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<CandidatePhoto>, ServiceError> {
        tracing::debug!(query, per_page = options.per_page, "Searching Unsplash");
        let per_page = options.per_page.to_string();
        let response = self
            .http
            .get(format!("{}/search/photos", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", options.orientation.as_str()),
            ])
            .send()
            .await
            .map_err(|e| network(SERVICE, e))?;
        let response = self.checked(response).await?;
        let parsed: SearchResponse = read_json(SERVICE, response).await?;
        Ok(parsed.results.into_iter().map(CandidatePhoto::from).collect())
    }

    async fn track_download(&self, download_location: &str) -> Result<(), ServiceError> {
        let response = self
            .http
            .get(download_location)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(|e| network(SERVICE, e))?;
        self.checked(response).await?;
        tracing::debug!(download_location, "Unsplash download tracked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = r#"{
      "total": 1,
      "results": [{
        "id": "abc123",
        "description": null,
        "alt_description": "person typing on laptop",
        "urls": {"raw": "r", "full": "f", "regular": "reg", "small": "s", "thumb": "t"},
        "links": {"self": "x", "download_location": "https://api.unsplash.com/photos/abc123/download"},
        "user": {"name": "Ana Lee", "links": {"html": "https://unsplash.com/@ana"}}
      }]
    }"#;

    #[test]
    fn test_search_result_normalization() {
        let parsed: SearchResponse = serde_json::from_str(SEARCH).unwrap();
        let photo = CandidatePhoto::from(parsed.results.into_iter().next().unwrap());
        assert_eq!(photo.id, "abc123");
        assert_eq!(photo.urls.regular, "reg");
        assert_eq!(photo.description.as_deref(), Some("person typing on laptop"));
        assert_eq!(photo.photographer_url, "https://unsplash.com/@ana");
        assert!(photo.download_location.is_some());
        assert_eq!(photo.credit(), "Photo by Ana Lee on Unsplash");
    }

    #[test]
    fn test_authorization_header_format() {
        let client = UnsplashClient::new("key-1");
        assert_eq!(client.authorization(), "Client-ID key-1");
    }
}
