//! Data model for one generation request: brief in, outline, article with
//! image placements, selected images and the publish result out.
//!
//! Field names serialise in camelCase because the same structs are parsed
//! straight out of model responses and written back as JSON artifacts.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Caller-supplied description of the post to write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    pub topic: String,
    #[serde(default)]
    pub angle: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// Per-blog voice used to shape every prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrandVoice {
    /// Company or publication name the writer speaks for.
    pub name: String,
    /// One-line description of what the company does.
    pub description: String,
    pub tone: String,
    pub values: Vec<String>,
    pub avoid: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    /// Minimum number of image placements (featured included) per article.
    pub min_images: usize,
}

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MIN_IMAGES: usize = 4;

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            min_images: DEFAULT_MIN_IMAGES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Outline {
    pub headline: String,
    pub alternative_headlines: Vec<String>,
    pub intro_hook: String,
    pub sections: Vec<OutlineSection>,
    pub conclusion: String,
    pub cta: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineSection {
    pub heading: String,
    pub points: Vec<String>,
}

/// Where an image renders: the featured (hero) slot or inline in the body.
///
/// Serialised as `"featured"` / `"inline-N"`. Labels the model invents are
/// kept verbatim and treated as inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    Featured,
    Inline(usize),
    Other(String),
}

impl Default for Position {
    fn default() -> Self {
        Position::Other(String::new())
    }
}

impl Position {
    pub fn is_featured(&self) -> bool {
        matches!(self, Position::Featured)
    }
}

impl From<String> for Position {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("featured") {
            return Position::Featured;
        }
        match trimmed
            .strip_prefix("inline-")
            .and_then(|n| n.parse::<usize>().ok())
        {
            Some(n) => Position::Inline(n),
            None => Position::Other(raw),
        }
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.to_string()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Featured => f.write_str("featured"),
            Position::Inline(n) => write!(f, "inline-{n}"),
            Position::Other(label) => f.write_str(label),
        }
    }
}

/// One declared image slot of an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePlacement {
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub alt_text: String,
    /// Exact `[IMAGE: ...]` token inside the article content; `None` for the
    /// featured image.
    #[serde(default)]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    /// HTML body, possibly containing placeholder tokens.
    pub content: String,
    pub excerpt: String,
    pub seo_keywords: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub image_placements: Vec<ImagePlacement>,
}

impl Article {
    pub fn featured_placement(&self) -> Option<&ImagePlacement> {
        self.image_placements
            .iter()
            .find(|p| p.position.is_featured())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSource {
    Unsplash,
    Pexels,
}

impl PhotoSource {
    pub fn display_name(&self) -> &'static str {
        match self {
            PhotoSource::Unsplash => "Unsplash",
            PhotoSource::Pexels => "Pexels",
        }
    }
}

impl fmt::Display for PhotoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PhotoSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unsplash" => Ok(PhotoSource::Unsplash),
            "pexels" => Ok(PhotoSource::Pexels),
            other => Err(format!("unknown image provider: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoUrls {
    pub full: String,
    pub regular: String,
    pub thumb: String,
}

/// A search hit, normalised across providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePhoto {
    pub id: String,
    pub urls: PhotoUrls,
    pub description: Option<String>,
    pub photographer_name: String,
    pub photographer_url: String,
    /// Download-tracking handle; only providers that require download
    /// accounting set it.
    pub download_location: Option<String>,
    pub source: PhotoSource,
}

impl CandidatePhoto {
    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No description")
    }

    pub fn credit(&self) -> String {
        format!(
            "Photo by {} on {}",
            self.photographer_name,
            self.source.display_name()
        )
    }
}

/// A candidate offered to the user for the featured slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedCandidate {
    pub id: String,
    pub url: String,
    pub thumb_url: String,
    pub alt_text: String,
    pub description: String,
    pub credit: String,
    pub credit_link: String,
    pub photographer_name: String,
    pub source: PhotoSource,
}

/// A placement resolved to a concrete photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedImage {
    pub position: Position,
    pub url: String,
    pub alt_text: String,
    pub credit: String,
    pub credit_link: String,
    pub photographer_name: String,
    pub image_id: String,
    pub placeholder: Option<String>,
    pub source: PhotoSource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageSelection {
    pub featured_image: Option<SelectedImage>,
    pub inline_images: Vec<SelectedImage>,
    pub all_images: Vec<SelectedImage>,
}

impl ImageSelection {
    /// Partitions selected images: the featured slot is the image with
    /// position `featured`, else the first one selected.
    pub fn from_selected(all_images: Vec<SelectedImage>) -> Self {
        let featured_image = all_images
            .iter()
            .find(|img| img.position.is_featured())
            .or_else(|| all_images.first())
            .cloned();
        let inline_images = all_images
            .iter()
            .filter(|img| !img.position.is_featured())
            .cloned()
            .collect();
        Self {
            featured_image,
            inline_images,
            all_images,
        }
    }
}

/// Requested post status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "date", rename_all = "lowercase")]
pub enum PublishMode {
    Draft,
    Publish,
    Schedule(NaiveDateTime),
}

impl PublishMode {
    /// Status string understood by the CMS.
    pub fn status(&self) -> &'static str {
        match self {
            PublishMode::Draft => "draft",
            PublishMode::Publish => "publish",
            PublishMode::Schedule(_) => "future",
        }
    }

    pub fn schedule_date(&self) -> Option<NaiveDateTime> {
        match self {
            PublishMode::Schedule(date) => Some(*date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub post_id: u64,
    pub status: String,
    pub edit_url: String,
    pub preview_url: Option<String>,
    /// Set only when the post went live immediately.
    pub publish_url: Option<String>,
    pub scheduled_date: Option<String>,
    pub media_uploaded: usize,
    /// Inline images that could not be placed in the body.
    pub images_dropped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_round_trips_known_labels() {
        assert_eq!(Position::from("featured".to_string()), Position::Featured);
        assert_eq!(Position::from("inline-3".to_string()), Position::Inline(3));
        assert_eq!(Position::Inline(2).to_string(), "inline-2");
        assert_eq!(
            Position::from("sidebar".to_string()),
            Position::Other("sidebar".to_string())
        );
    }

    #[test]
    fn test_article_parses_camel_case_model_output() {
        let json = r#"{
            "title": "T",
            "content": "<p>x</p>",
            "imagePlacements": [
                {"position": "featured", "searchQuery": "q", "altText": "a"}
            ]
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.image_placements.len(), 1);
        assert!(article.image_placements[0].position.is_featured());
        assert_eq!(article.image_placements[0].placeholder, None);
        assert!(article.tags.is_empty());
    }

    #[test]
    fn test_selection_falls_back_to_first_image_for_featured() {
        let img = SelectedImage {
            position: Position::Inline(1),
            url: "u".into(),
            alt_text: "a".into(),
            credit: "c".into(),
            credit_link: "l".into(),
            photographer_name: "p".into(),
            image_id: "1".into(),
            placeholder: Some("[IMAGE: x]".into()),
            source: PhotoSource::Pexels,
        };
        let selection = ImageSelection::from_selected(vec![img.clone()]);
        assert_eq!(selection.featured_image, Some(img.clone()));
        assert_eq!(selection.inline_images, vec![img]);
    }

    #[test]
    fn test_publish_mode_status_strings() {
        let date = NaiveDateTime::parse_from_str("2026-01-02 09:30:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert_eq!(PublishMode::Draft.status(), "draft");
        assert_eq!(PublishMode::Publish.status(), "publish");
        assert_eq!(PublishMode::Schedule(date).status(), "future");
        assert_eq!(PublishMode::Schedule(date).schedule_date(), Some(date));
    }
}
