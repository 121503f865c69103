//! Outline generation. Unlike the article step there is no degraded
//! fallback: an unparseable outline fails the request.

use tracing::{error, info, warn};

use crate::contract::{CompletionClient, CompletionRequest};
use crate::error::GenerationError;
use crate::json_extract::parse_json;
use crate::model::{BrandVoice, Brief, GenerationSettings, Outline, OutlineSection};
use crate::prompts;

pub const OUTLINE_MAX_TOKENS: u32 = 2000;
pub const OUTLINE_TEMPERATURE: f32 = 0.8;

pub const MAX_HEADLINE_CHARS: usize = 60;
pub const MIN_SECTIONS: usize = 5;
pub const MAX_SECTIONS: usize = 7;

pub async fn generate_outline(
    completion: &dyn CompletionClient,
    brief: &Brief,
    brand: &BrandVoice,
    settings: &GenerationSettings,
) -> Result<Outline, GenerationError> {
    info!(topic = %brief.topic, "[OUTLINE] Generating article outline");

    let request = CompletionRequest::new(prompts::outline_prompt(brief, brand))
        .model(settings.model.clone())
        .max_tokens(OUTLINE_MAX_TOKENS)
        .temperature(OUTLINE_TEMPERATURE);

    let raw = completion.complete(request).await.map_err(|e| {
        error!(error = %e, "[OUTLINE][ERROR] Completion failed");
        e
    })?;

    let outline: Outline = parse_json(&raw).map_err(|e| {
        let head: String = raw.chars().take(200).collect();
        error!(error = %e, raw = %head, "[OUTLINE][ERROR] Could not parse outline from model response");
        e
    })?;

    for advisory in outline_advisories(&outline) {
        warn!(advisory = %advisory, "[OUTLINE] Advisory");
    }
    info!(
        headline = %outline.headline,
        sections = outline.sections.len(),
        "[OUTLINE] Outline generated"
    );
    Ok(outline)
}

/// Non-blocking shape checks: headline length and section count.
pub fn outline_advisories(outline: &Outline) -> Vec<String> {
    let mut advisories = Vec::new();
    let headline_len = outline.headline.chars().count();
    if headline_len > MAX_HEADLINE_CHARS {
        advisories.push(format!(
            "Headline too long ({headline_len} chars, should be <= {MAX_HEADLINE_CHARS})"
        ));
    }
    let sections = outline.sections.len();
    if !(MIN_SECTIONS..=MAX_SECTIONS).contains(&sections) {
        advisories.push(format!(
            "Outline has {sections} sections (expected {MIN_SECTIONS}-{MAX_SECTIONS})"
        ));
    }
    advisories
}

/// Rewrites one outline section according to user feedback.
pub async fn revise_section(
    completion: &dyn CompletionClient,
    section: &OutlineSection,
    feedback: &str,
    settings: &GenerationSettings,
) -> Result<OutlineSection, GenerationError> {
    info!(heading = %section.heading, "[OUTLINE] Revising section");
    let request = CompletionRequest::new(prompts::section_edit_prompt(section, feedback))
        .model(settings.model.clone())
        .max_tokens(1000)
        .temperature(OUTLINE_TEMPERATURE);
    let raw = completion.complete(request).await?;
    let revised: OutlineSection = parse_json(&raw)?;
    Ok(revised)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline_with(headline: &str, sections: usize) -> Outline {
        Outline {
            headline: headline.to_string(),
            sections: (0..sections)
                .map(|i| OutlineSection {
                    heading: format!("S{i}"),
                    points: vec![],
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_advisories_accept_well_formed_outline() {
        assert!(outline_advisories(&outline_with("Short headline", 5)).is_empty());
        assert!(outline_advisories(&outline_with("Short headline", 7)).is_empty());
    }

    #[test]
    fn test_advisories_flag_long_headline_and_section_count() {
        let long = "x".repeat(61);
        let advisories = outline_advisories(&outline_with(&long, 3));
        assert_eq!(advisories.len(), 2);
        assert!(advisories[0].contains("61 chars"));
        assert!(advisories[1].contains("3 sections"));
    }
}
