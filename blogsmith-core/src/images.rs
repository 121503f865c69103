//! Image reconciliation: resolves every image placement of an article to a
//! concrete photo.
//!
//! Placements are processed strictly in list order because the used-id set
//! built along the way decides which candidates later placements may take.
//! Each stage with a safe fallback absorbs its failure:
//! - search error or no results: the placement is skipped,
//! - unusable model ranking: the first candidate wins,
//! - failed download tracking: logged and ignored.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::contract::{CompletionClient, CompletionRequest, PhotoProvider, SearchOptions};
use crate::error::SelectionError;
use crate::json_extract::parse_json;
use crate::model::{
    Article, Brief, CandidatePhoto, FeaturedCandidate, GenerationSettings, ImagePlacement,
    ImageSelection, SelectedImage,
};
use crate::prompts;

pub const SEARCH_PER_PAGE: u32 = 10;
pub const FEATURED_CANDIDATES_PER_PAGE: u32 = 6;
pub const CONTEXT_RADIUS: usize = 250;
pub const CONTEXT_FALLBACK_CHARS: usize = 500;
pub const SELECTION_MAX_TOKENS: u32 = 500;
pub const SELECTION_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Deserialize)]
struct ImagePick {
    #[serde(rename = "imageNumber")]
    image_number: i64,
    #[serde(default)]
    reason: String,
}

/// Resolves each placement of `article` to a photo.
///
/// `selected_featured_id` is the user's pick for the featured slot; it wins
/// over model ranking when the featured search returns that id.
pub async fn select_images(
    completion: &dyn CompletionClient,
    photos: &dyn PhotoProvider,
    article: &Article,
    brief: &Brief,
    selected_featured_id: Option<&str>,
    settings: &GenerationSettings,
) -> ImageSelection {
    let total = article.image_placements.len();
    info!(placements = total, "[IMAGES] Selecting images for article");

    let mut used: HashSet<String> = HashSet::new();
    let mut selected: Vec<SelectedImage> = Vec::new();

    for (i, placement) in article.image_placements.iter().enumerate() {
        info!(
            n = i + 1,
            of = total,
            query = %placement.search_query,
            "[IMAGES] Searching for placement"
        );

        let candidates = match photos
            .search(&placement.search_query, SearchOptions::landscape(SEARCH_PER_PAGE))
            .await
        {
            Ok(candidates) if !candidates.is_empty() => candidates,
            Ok(_) => {
                warn!(query = %placement.search_query, "[IMAGES] No images found, skipping placement");
                continue;
            }
            Err(e) => {
                warn!(query = %placement.search_query, error = %e, "[IMAGES] Search failed, skipping placement");
                continue;
            }
        };

        let user_pick = selected_featured_id
            .filter(|_| placement.position.is_featured())
            .and_then(|id| candidates.iter().position(|c| c.id == id));

        let ranked = match user_pick {
            Some(index) => {
                info!(index, "[IMAGES] Using the user's featured image");
                index
            }
            None => {
                let context = context_around(&article.content, placement.placeholder.as_deref());
                select_best_image(completion, &candidates, &context, &brief.topic, settings).await
            }
        };

        let index = dedupe_index(&candidates, ranked, &used);
        let photo = &candidates[index];
        used.insert(photo.id.clone());

        if let Some(location) = photo.download_location.as_deref() {
            if let Err(e) = photos.track_download(location).await {
                warn!(error = %e, image_id = %photo.id, "[IMAGES] Download tracking failed");
            }
        }

        info!(
            image_id = %photo.id,
            photographer = %photo.photographer_name,
            source = %photo.source,
            "[IMAGES] Selected image"
        );
        selected.push(to_selected(placement, photo));
    }

    info!(selected = selected.len(), "[IMAGES] Image selection finished");
    ImageSelection::from_selected(selected)
}

fn to_selected(placement: &ImagePlacement, photo: &CandidatePhoto) -> SelectedImage {
    let alt_text = if placement.alt_text.trim().is_empty() {
        photo.description_or_default().to_string()
    } else {
        placement.alt_text.clone()
    };
    SelectedImage {
        position: placement.position.clone(),
        url: photo.urls.regular.clone(),
        alt_text,
        credit: photo.credit(),
        credit_link: photo.photographer_url.clone(),
        photographer_name: photo.photographer_name.clone(),
        image_id: photo.id.clone(),
        placeholder: placement.placeholder.clone(),
        source: photo.source,
    }
}

/// Asks the model to rank `candidates` for the given context and returns a
/// 0-based index. Any failure falls back to 0.
pub async fn select_best_image(
    completion: &dyn CompletionClient,
    candidates: &[CandidatePhoto],
    context: &str,
    topic: &str,
    settings: &GenerationSettings,
) -> usize {
    let request = CompletionRequest::new(prompts::image_selection_prompt(candidates, context, topic))
        .model(settings.model.clone())
        .max_tokens(SELECTION_MAX_TOKENS)
        .temperature(SELECTION_TEMPERATURE);

    let raw = match completion.complete(request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "[IMAGES] Ranking request failed, using first result");
            return 0;
        }
    };

    match parse_json::<ImagePick>(&raw) {
        Ok(pick) if pick.image_number >= 1 && (pick.image_number as usize) <= candidates.len() => {
            debug!(number = pick.image_number, reason = %pick.reason, "[IMAGES] Model picked image");
            (pick.image_number - 1) as usize
        }
        Ok(pick) => {
            warn!(number = pick.image_number, "[IMAGES] Invalid image selection, using first result");
            0
        }
        Err(e) => {
            warn!(error = %e, "[IMAGES] Could not parse image selection, using first result");
            0
        }
    }
}

/// First index at or after `selected` (wrapping) whose id is unused. When
/// every candidate is used the original pick is kept.
pub fn dedupe_index(candidates: &[CandidatePhoto], selected: usize, used: &HashSet<String>) -> usize {
    let len = candidates.len();
    if len == 0 || !used.contains(&candidates[selected % len].id) {
        return selected;
    }
    for attempts in 1..=len {
        let index = (selected + attempts) % len;
        if !used.contains(&candidates[index].id) {
            debug!(from = selected, to = index, "[IMAGES] Image already used, picked alternative");
            return index;
        }
    }
    warn!(image_id = %candidates[selected % len].id, "[IMAGES] All candidates used, allowing duplicate");
    selected % len
}

/// Text around the placeholder (up to 250 bytes either side), or the start
/// of the content when the placeholder is absent.
pub fn context_around(content: &str, placeholder: Option<&str>) -> String {
    let Some(at) = placeholder
        .filter(|p| !p.is_empty())
        .and_then(|p| content.find(p))
    else {
        return content.chars().take(CONTEXT_FALLBACK_CHARS).collect();
    };

    let mut start = at.saturating_sub(CONTEXT_RADIUS);
    while !content.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (at + CONTEXT_RADIUS).min(content.len());
    while !content.is_char_boundary(end) {
        end += 1;
    }
    content[start..end].to_string()
}

/// Candidates for the featured slot, offered to the user before selection.
pub async fn featured_candidates(
    photos: &dyn PhotoProvider,
    article: &Article,
) -> Result<Vec<FeaturedCandidate>, SelectionError> {
    let placement = article
        .featured_placement()
        .ok_or(SelectionError::NoFeaturedPlacement)?;

    info!(query = %placement.search_query, "[IMAGES] Finding featured image candidates");
    let results = photos
        .search(
            &placement.search_query,
            SearchOptions::landscape(FEATURED_CANDIDATES_PER_PAGE),
        )
        .await?;

    if results.is_empty() {
        return Err(SelectionError::NoResults {
            query: placement.search_query.clone(),
        });
    }

    let candidates: Vec<FeaturedCandidate> = results
        .iter()
        .map(|photo| FeaturedCandidate {
            id: photo.id.clone(),
            url: photo.urls.regular.clone(),
            thumb_url: photo.urls.thumb.clone(),
            alt_text: if placement.alt_text.trim().is_empty() {
                photo.description_or_default().to_string()
            } else {
                placement.alt_text.clone()
            },
            description: photo.description_or_default().to_string(),
            credit: photo.credit(),
            credit_link: photo.photographer_url.clone(),
            photographer_name: photo.photographer_name.clone(),
            source: photo.source,
        })
        .collect();

    info!(count = candidates.len(), "[IMAGES] Found featured image candidates");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PhotoSource, PhotoUrls};

    fn photo(id: &str) -> CandidatePhoto {
        CandidatePhoto {
            id: id.to_string(),
            urls: PhotoUrls::default(),
            description: None,
            photographer_name: "P".into(),
            photographer_url: "https://p.example".into(),
            download_location: None,
            source: PhotoSource::Pexels,
        }
    }

    #[test]
    fn test_dedupe_steps_forward_and_wraps() {
        let candidates = vec![photo("a"), photo("b"), photo("c")];
        let used: HashSet<String> = ["b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(dedupe_index(&candidates, 0, &used), 0);
        assert_eq!(dedupe_index(&candidates, 1, &used), 0);
        assert_eq!(dedupe_index(&candidates, 2, &used), 0);
    }

    #[test]
    fn test_dedupe_accepts_duplicate_when_exhausted() {
        let candidates = vec![photo("a"), photo("b")];
        let used: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(dedupe_index(&candidates, 1, &used), 1);
    }

    #[test]
    fn test_context_around_token() {
        let content = format!("{}[IMAGE: x]{}", "a".repeat(300), "b".repeat(300));
        let context = context_around(&content, Some("[IMAGE: x]"));
        assert_eq!(context.len(), 500);
        assert!(context.starts_with('a'));
        assert!(context.contains("[IMAGE: x]"));
    }

    #[test]
    fn test_context_without_token_uses_content_start() {
        let content = "é".repeat(600);
        assert_eq!(context_around(&content, None).chars().count(), 500);
        assert_eq!(
            context_around(&content, Some("[IMAGE: missing]")).chars().count(),
            500
        );
    }

    #[test]
    fn test_context_respects_char_boundaries() {
        let content = format!("{}[IMAGE: x]{}", "é".repeat(200), "ü".repeat(200));
        let context = context_around(&content, Some("[IMAGE: x]"));
        assert!(context.contains("[IMAGE: x]"));
    }
}
