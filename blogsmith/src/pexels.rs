//! Pexels search client. Pexels has no download tracking, so the default
//! no-op `track_download` applies and candidates carry no handle.

use async_trait::async_trait;
use blogsmith_core::contract::{PhotoProvider, SearchOptions};
use blogsmith_core::error::ServiceError;
use blogsmith_core::model::{CandidatePhoto, PhotoSource, PhotoUrls};
use serde::Deserialize;

use crate::http::{ensure_success, network, read_json};
use crate::load_config::{require_env, MissingEnvVar};

const SERVICE: &str = "Pexels";
pub const PEXELS_API: &str = "https://api.pexels.com/v1";
pub const API_KEY_ENV: &str = "PEXELS_API_KEY";

pub struct PexelsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    id: u64,
    alt: Option<String>,
    photographer: String,
    #[serde(default)]
    photographer_url: String,
    src: PexelsSrc,
}

#[derive(Debug, Deserialize)]
struct PexelsSrc {
    #[serde(default)]
    original: String,
    #[serde(default)]
    large: String,
    #[serde(default)]
    medium: String,
}

fn normalize(photo: PexelsPhoto, query: &str) -> CandidatePhoto {
    let description = photo
        .alt
        .filter(|alt| !alt.trim().is_empty())
        .unwrap_or_else(|| query.to_string());
    CandidatePhoto {
        id: photo.id.to_string(),
        urls: PhotoUrls {
            full: photo.src.original,
            regular: photo.src.large,
            thumb: photo.src.medium,
        },
        description: Some(description),
        photographer_name: photo.photographer,
        photographer_url: photo.photographer_url,
        download_location: None,
        source: PhotoSource::Pexels,
    }
}

impl PexelsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(PEXELS_API, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn new_from_env() -> Result<Self, MissingEnvVar> {
        let api_key = require_env(API_KEY_ENV)?;
        tracing::info!("Initialized PexelsClient from environment");
        Ok(Self::new(api_key))
    }
}

#[async_trait]
impl PhotoProvider for PexelsClient {
    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<CandidatePhoto>, ServiceError> {
        tracing::debug!(query, per_page = options.per_page, "Searching Pexels");
        let per_page = options.per_page.to_string();
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", options.orientation.as_str()),
            ])
            .send()
            .await
            .map_err(|e| network(SERVICE, e))?;
        let response = ensure_success(SERVICE, response).await?;
        let parsed: SearchResponse = read_json(SERVICE, response).await?;
        Ok(parsed
            .photos
            .into_iter()
            .map(|photo| normalize(photo, query))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_become_strings_and_alt_falls_back_to_query() {
        let parsed: SearchResponse = serde_json::from_str(
            r#"{"page":1,"per_page":2,"total_results":2,"photos":[
                {"id": 2014422, "alt": "", "photographer": "Joey", "photographer_url": "https://www.pexels.com/@joey",
                 "src": {"original": "o.jpg", "large": "l.jpg", "medium": "m.jpg"}},
                {"id": 7, "alt": "barista pouring", "photographer": "Kim",
                 "src": {"original": "o2.jpg", "large": "l2.jpg", "medium": "m2.jpg"}}
            ]}"#,
        )
        .unwrap();
        let photos: Vec<CandidatePhoto> = parsed
            .photos
            .into_iter()
            .map(|p| normalize(p, "coffee shop"))
            .collect();

        assert_eq!(photos[0].id, "2014422");
        assert_eq!(photos[0].description.as_deref(), Some("coffee shop"));
        assert_eq!(photos[0].urls.regular, "l.jpg");
        assert_eq!(photos[0].download_location, None);
        assert_eq!(photos[1].description.as_deref(), Some("barista pouring"));
        assert_eq!(photos[1].credit(), "Photo by Kim on Pexels");
    }
}
