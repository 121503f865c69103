//! End-to-end run for one brief: outline → article → images → (optional)
//! publish.
//!
//! Every step is awaited in order; nothing runs concurrently. Stages with a
//! local fallback (article parsing, image search and ranking, taxonomy and
//! media upload) never abort the run. Outline failure, completion failure
//! and post creation failure do.

use serde::Serialize;
use tracing::{error, info};

use crate::article::generate_article;
use crate::contract::{CmsClient, CompletionClient, PhotoProvider};
use crate::error::PipelineError;
use crate::images::select_images;
use crate::model::{
    Article, BrandVoice, Brief, GenerationSettings, ImageSelection, Outline, PublishMode,
    PublishResult,
};
use crate::outline::generate_outline;
use crate::publish::publish;
use crate::seo::{self, SeoReport};

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub brand: BrandVoice,
    pub settings: GenerationSettings,
    /// User's pick for the featured image, if any.
    pub selected_featured_id: Option<String>,
    /// `None` stops after image selection.
    pub publish: Option<PublishMode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub outline: Outline,
    pub article: Article,
    pub seo: SeoReport,
    pub images: ImageSelection,
    pub published: Option<PublishResult>,
}

pub async fn run(
    config: &PipelineConfig,
    brief: &Brief,
    completion: &dyn CompletionClient,
    photos: &dyn PhotoProvider,
    cms: Option<&dyn CmsClient>,
) -> Result<PipelineReport, PipelineError> {
    info!(topic = %brief.topic, "[PIPELINE] Starting content pipeline");

    let outline = generate_outline(completion, brief, &config.brand, &config.settings)
        .await
        .map_err(|e| {
            error!(error = %e, "[PIPELINE][ERROR] Outline stage failed");
            PipelineError::Outline(e)
        })?;

    let article = generate_article(completion, &outline, brief, &config.brand, &config.settings)
        .await
        .map_err(|e| {
            error!(error = %e, "[PIPELINE][ERROR] Article stage failed");
            PipelineError::Article(e)
        })?;
    let seo = seo::review(&article);

    let images = select_images(
        completion,
        photos,
        &article,
        brief,
        config.selected_featured_id.as_deref(),
        &config.settings,
    )
    .await;

    let published = match (config.publish, cms) {
        (Some(mode), Some(cms)) => Some(publish(cms, &article, &images, mode).await?),
        (Some(_), None) => {
            info!("[PIPELINE] No publishing target configured, skipping publish");
            None
        }
        (None, _) => None,
    };

    info!(
        placements = article.image_placements.len(),
        images = images.all_images.len(),
        published = published.is_some(),
        "[PIPELINE] Pipeline finished"
    );

    Ok(PipelineReport {
        outline,
        article,
        seo,
        images,
        published,
    })
}
