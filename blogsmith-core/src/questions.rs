//! Clarifying questions about a brief, asked before outlining.

use tracing::{info, warn};

use crate::contract::{CompletionClient, CompletionRequest};
use crate::error::GenerationError;
use crate::json_extract::parse_json;
use crate::model::{BrandVoice, Brief, GenerationSettings};
use crate::prompts;

pub const MAX_QUESTIONS: usize = 3;

pub async fn generate_questions(
    completion: &dyn CompletionClient,
    brief: &Brief,
    brand: &BrandVoice,
    settings: &GenerationSettings,
) -> Result<Vec<String>, GenerationError> {
    info!(topic = %brief.topic, "[QUESTIONS] Asking for follow-up questions");
    let request = CompletionRequest::new(prompts::clarification_prompt(brief, brand))
        .model(settings.model.clone())
        .max_tokens(500)
        .temperature(0.7);

    let raw = completion.complete(request).await?;
    let questions: Vec<String> = parse_json(&raw).map_err(|e| {
        warn!(error = %e, "[QUESTIONS] Response was not a JSON array of questions");
        e
    })?;

    Ok(questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .take(MAX_QUESTIONS)
        .collect())
}
