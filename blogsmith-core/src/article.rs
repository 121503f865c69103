//! Article generation and image-placement reconciliation.
//!
//! After the model answers, the article goes through these steps:
//! 1. parse (or fall back to a degraded article built from the raw text),
//! 2. extract placements from content tokens when the model declared none,
//! 3. normalise the featured slot to exactly one placement,
//! 4. give every inline placement its own distinct token in the content,
//! 5. backfill generic placements up to the configured minimum.
//!
//! A placeholder token directly following an H2 marks that heading as
//! consumed; insertion always targets the next unconsumed heading.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::contract::{CompletionClient, CompletionRequest};
use crate::error::GenerationError;
use crate::json_extract::parse_json;
use crate::model::{Article, BrandVoice, Brief, GenerationSettings, ImagePlacement, Outline, Position};
use crate::placeholder::{self, token_for};
use crate::prompts;
use crate::seo;

pub const ARTICLE_MAX_TOKENS: u32 = 4000;
pub const ARTICLE_TEMPERATURE: f32 = 0.7;
pub const EXCERPT_MAX_CHARS: usize = 155;

/// Writes the article for `outline` and reconciles its image placements.
///
/// Only a failed completion call is an error; an unparseable response
/// yields the degraded article from [`fallback_article`].
pub async fn generate_article(
    completion: &dyn CompletionClient,
    outline: &Outline,
    brief: &Brief,
    brand: &BrandVoice,
    settings: &GenerationSettings,
) -> Result<Article, GenerationError> {
    info!(headline = %outline.headline, "[ARTICLE] Writing full article");

    let request = CompletionRequest::new(prompts::article_prompt(
        outline,
        brief,
        brand,
        settings.min_images,
    ))
    .model(settings.model.clone())
    .max_tokens(ARTICLE_MAX_TOKENS)
    .temperature(ARTICLE_TEMPERATURE);

    let raw = completion.complete(request).await.map_err(|e| {
        error!(error = %e, "[ARTICLE][ERROR] Completion failed");
        e
    })?;

    let mut article = parse_article(&raw, outline, brief);
    reconcile_placements(&mut article, brief, settings.min_images);

    let report = seo::review(&article);
    for advisory in &report.advisories {
        warn!(advisory = %advisory, "[ARTICLE][SEO] Recommendation");
    }
    info!(
        title = %article.title,
        words = report.word_count,
        placements = article.image_placements.len(),
        "[ARTICLE] Article written"
    );
    debug!(placements = ?article.image_placements, "[ARTICLE] Final image placements");
    Ok(article)
}

pub fn parse_article(raw: &str, outline: &Outline, brief: &Brief) -> Article {
    match parse_json::<Article>(raw) {
        Ok(article) => article,
        Err(e) => {
            warn!(error = %e, "[ARTICLE] Could not parse article JSON, using raw response as content");
            fallback_article(raw, outline, brief)
        }
    }
}

/// Degraded article: the raw model text as content, outline headline as
/// title, topic prefix as excerpt.
pub fn fallback_article(raw: &str, outline: &Outline, brief: &Brief) -> Article {
    Article {
        title: outline.headline.clone(),
        content: raw.to_string(),
        excerpt: brief.topic.chars().take(EXCERPT_MAX_CHARS).collect(),
        ..Default::default()
    }
}

/// Steps 2-5 of the module docs. Safe to run on an already reconciled
/// article: nothing changes the second time.
pub fn reconcile_placements(article: &mut Article, brief: &Brief, min_images: usize) {
    if article.image_placements.is_empty() {
        article.image_placements = extract_placements(&mut article.content);
        debug!(
            extracted = article.image_placements.len(),
            "[ARTICLE] Extracted placements from content tokens"
        );
    }

    if !article.image_placements.is_empty() || min_images > 0 {
        normalize_featured(&mut article.image_placements, brief);
    }
    attach_tokens(article, brief);
    backfill(article, brief, min_images);
}

/// Builds placements from the tokens already in `content`. The first token
/// becomes the featured image and is removed from the body.
pub fn extract_placements(content: &mut String) -> Vec<ImagePlacement> {
    let found: Vec<(String, String)> = placeholder::tokens(content)
        .into_iter()
        .map(|t| (t.literal.to_string(), t.query.to_string()))
        .collect();

    let mut placements = Vec::with_capacity(found.len());
    for (index, (literal, query)) in found.into_iter().enumerate() {
        if index == 0 {
            *content = content.replacen(&literal, "", 1);
            placements.push(ImagePlacement {
                position: Position::Featured,
                search_query: query.clone(),
                alt_text: query,
                placeholder: None,
            });
        } else {
            placements.push(ImagePlacement {
                position: Position::Inline(index),
                search_query: query.clone(),
                alt_text: query,
                placeholder: Some(literal),
            });
        }
    }
    placements
}

/// Keeps the first featured placement, demotes any others to inline and
/// synthesises one from the topic when none exists.
pub fn normalize_featured(placements: &mut Vec<ImagePlacement>, brief: &Brief) {
    let mut seen_featured = false;
    for (index, placement) in placements.iter_mut().enumerate() {
        let replacement = match &placement.position {
            Position::Featured if !seen_featured => {
                seen_featured = true;
                None
            }
            Position::Featured => {
                debug!(index, "[ARTICLE] Demoting surplus featured placement");
                Some(Position::Inline(index))
            }
            Position::Other(label) if label.trim().is_empty() => Some(Position::Inline(index)),
            _ => None,
        };
        if let Some(position) = replacement {
            placement.position = position;
        }
        if placement.position.is_featured() {
            placement.placeholder = None;
        }
    }

    if !seen_featured {
        info!("[ARTICLE] No featured placement, adding one from the topic");
        placements.insert(
            0,
            ImagePlacement {
                position: Position::Featured,
                search_query: format!("{} business professional", brief.topic),
                alt_text: format!("{} - professional business setting", brief.topic),
                placeholder: None,
            },
        );
    }
}

/// Gives each inline placement a token that occurs in the content: an
/// existing `[IMAGE: <query>]` is adopted, otherwise one is inserted after
/// the next unconsumed heading. Placements left over once headings run out
/// keep no token.
fn attach_tokens(article: &mut Article, brief: &Brief) {
    let mut claimed: HashSet<String> = HashSet::new();

    for placement in article.image_placements.iter_mut() {
        if placement.position.is_featured() {
            placement.placeholder = None;
            continue;
        }

        if placement.search_query.trim().is_empty() {
            placement.search_query = if placement.alt_text.trim().is_empty() {
                brief.topic.clone()
            } else {
                placement.alt_text.clone()
            };
        }

        if let Some(existing) = placement.placeholder.as_deref() {
            if !existing.is_empty()
                && article.content.contains(existing)
                && claimed.insert(existing.to_string())
            {
                continue;
            }
            debug!(placeholder = %existing, "[ARTICLE] Declared placeholder not in content");
        }

        let token = token_for(&placement.search_query);
        if article.content.contains(&token) && claimed.insert(token.clone()) {
            placement.placeholder = Some(token);
            continue;
        }

        let token = placeholder::unique_token_for(&article.content, &placement.search_query);
        if placeholder::insert_after_next_heading(&mut article.content, &token) {
            claimed.insert(token.clone());
            placement.placeholder = Some(token);
        } else {
            warn!(
                position = %placement.position,
                "[ARTICLE] No free heading left for placement"
            );
            placement.placeholder = None;
        }
    }
}

/// Generic search phrases used to top up an article's images.
pub fn backfill_queries(brief: &Brief) -> Vec<String> {
    let audience = match brief.audience.trim() {
        "" => "professionals",
        audience => audience,
    };
    let first_word = brief.topic.split_whitespace().next().unwrap_or("business");
    vec![
        format!("{audience} using technology"),
        "small business customer service".to_string(),
        format!("professional {first_word} solution"),
        "AI assistant helping business owner".to_string(),
        "happy customer interaction".to_string(),
    ]
}

/// Adds inline placements until `min_images` is met. Tokens go after free
/// headings first, then before a Conclusion heading, the closing
/// `</article>` or the end of the content.
pub fn backfill(article: &mut Article, brief: &Brief, min_images: usize) {
    let start = article.image_placements.len();
    if start >= min_images {
        return;
    }
    info!(
        current = start,
        minimum = min_images,
        "[ARTICLE] Adding images to meet the minimum"
    );

    let pool = backfill_queries(brief);
    let mut next = 0usize;
    while article.image_placements.len() < min_images {
        let query = pool[next % pool.len()].clone();
        next += 1;

        // The pool wraps for large minimums; the literal must still be unique.
        let token = placeholder::unique_token_for(&article.content, &query);
        if !placeholder::insert_after_next_heading(&mut article.content, &token) {
            placeholder::insert_before_conclusion_or_end(&mut article.content, &token);
        }

        let position = Position::Inline(article.image_placements.len());
        article.image_placements.push(ImagePlacement {
            position,
            search_query: query.clone(),
            alt_text: query,
            placeholder: Some(token),
        });
    }

    info!(
        added = article.image_placements.len() - start,
        total = article.image_placements.len(),
        "[ARTICLE] Backfill complete"
    );
}
