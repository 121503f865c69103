//! Publishing: uploads the selected images, substitutes the inline ones into
//! the body and creates the post. Also the small post-management
//! operations used after a post exists.
//!
//! Taxonomy and media failures are absorbed (the post is created with
//! whatever resolved); only the post call itself can fail the publish.

use tracing::{debug, error, info, warn};

use crate::contract::{CmsClient, NewMedia, NewPost, Post, PostSummary, Taxonomy};
use crate::error::{PublishError, ServiceError};
use crate::model::{Article, ImageSelection, PublishMode, PublishResult, SelectedImage};
use crate::placeholder::{figure_markup, strip_placeholders};

const SCHEDULE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub async fn publish(
    cms: &dyn CmsClient,
    article: &Article,
    images: &ImageSelection,
    mode: PublishMode,
) -> Result<PublishResult, PublishError> {
    info!(title = %article.title, status = mode.status(), "[PUBLISH] Creating post");

    let categories = resolve_terms(cms, Taxonomy::Category, &article.categories).await;
    let tags = resolve_terms(cms, Taxonomy::Tag, &article.tags).await;
    info!(
        categories = categories.len(),
        tags = tags.len(),
        "[PUBLISH] Categories and tags processed"
    );

    let mut media_uploaded = 0usize;
    let mut featured_media = None;
    if let Some(featured) = &images.featured_image {
        info!(image_id = %featured.image_id, "[PUBLISH] Uploading featured image");
        match cms.upload_media(new_media(featured)).await {
            Ok(media) => {
                media_uploaded += 1;
                featured_media = Some(media.id);
            }
            Err(e) => warn!(error = %e, "[PUBLISH] Featured image upload failed, continuing without it"),
        }
    }

    let mut content = article.content.clone();
    let mut images_dropped = 0usize;
    for image in &images.inline_images {
        match substitute_inline(cms, &mut content, image).await {
            Ok(()) => media_uploaded += 1,
            Err(reason) => {
                images_dropped += 1;
                warn!(
                    position = %image.position,
                    placeholder = ?image.placeholder,
                    reason = %reason,
                    "[PUBLISH] Inline image dropped from body"
                );
            }
        }
    }
    let content = strip_placeholders(&content);

    let post = cms
        .create_post(NewPost {
            title: article.title.clone(),
            content,
            excerpt: article.excerpt.clone(),
            mode,
            categories,
            tags,
            featured_media,
        })
        .await
        .map_err(|e| {
            error!(error = %e, "[PUBLISH][ERROR] Failed to create post");
            e
        })?;

    info!(post_id = post.id, status = %post.status, edit_url = %post.edit_url, "[PUBLISH] Post created");
    Ok(to_result(post, mode, media_uploaded, images_dropped))
}

fn new_media(image: &SelectedImage) -> NewMedia {
    NewMedia {
        source_url: image.url.clone(),
        alt_text: image.alt_text.clone(),
        caption: image.credit.clone(),
    }
}

/// Uploads one inline image and swaps its token for figure markup. The
/// token is checked first so no upload is wasted on an image that cannot
/// be placed.
async fn substitute_inline(
    cms: &dyn CmsClient,
    content: &mut String,
    image: &SelectedImage,
) -> Result<(), String> {
    let token = image
        .placeholder
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "image has no placeholder".to_string())?;
    if !content.contains(token) {
        return Err("placeholder not found in content".to_string());
    }

    let media = cms
        .upload_media(new_media(image))
        .await
        .map_err(|e| format!("upload failed: {e}"))?;

    let markup = figure_markup(&media.url, &image.alt_text, &image.credit);
    *content = content.replacen(token, &markup, 1);
    debug!(placeholder = %token, media_id = media.id, "[PUBLISH] Replaced placeholder");
    Ok(())
}

fn to_result(post: Post, mode: PublishMode, media_uploaded: usize, images_dropped: usize) -> PublishResult {
    let scheduled_date = mode.schedule_date().map(|date| {
        post.date
            .clone()
            .unwrap_or_else(|| date.format(SCHEDULE_FORMAT).to_string())
    });
    let publish_url = match mode {
        PublishMode::Publish => post.link.clone(),
        _ => None,
    };
    PublishResult {
        post_id: post.id,
        status: post.status,
        edit_url: post.edit_url,
        preview_url: post.link,
        publish_url,
        scheduled_date,
        media_uploaded,
        images_dropped,
    }
}

/// Maps names to term ids, creating missing terms. A name that fails is
/// skipped.
pub async fn resolve_terms(cms: &dyn CmsClient, taxonomy: Taxonomy, names: &[String]) -> Vec<u64> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        match resolve_term(cms, taxonomy, name).await {
            Ok(id) => ids.push(id),
            Err(e) => warn!(
                taxonomy = taxonomy.collection(),
                term = name,
                error = %e,
                "[PUBLISH] Could not process term, skipping"
            ),
        }
    }
    ids
}

async fn resolve_term(cms: &dyn CmsClient, taxonomy: Taxonomy, name: &str) -> Result<u64, ServiceError> {
    let found = cms.find_terms(taxonomy, name).await?;
    let existing = found
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .or_else(|| found.first());
    match existing {
        Some(term) => Ok(term.id),
        None => {
            debug!(taxonomy = taxonomy.collection(), term = name, "[PUBLISH] Creating term");
            Ok(cms.create_term(taxonomy, name).await?.id)
        }
    }
}

/// Moves an existing post to `mode` (typically publish or schedule).
pub async fn promote(cms: &dyn CmsClient, post_id: u64, mode: PublishMode) -> Result<Post, PublishError> {
    info!(post_id, status = mode.status(), "[PUBLISH] Updating post status");
    let post = cms.update_post_status(post_id, mode).await.map_err(|e| {
        error!(post_id, error = %e, "[PUBLISH][ERROR] Failed to update post status");
        e
    })?;
    Ok(post)
}

pub async fn recent_drafts(cms: &dyn CmsClient, per_page: u32) -> Result<Vec<PostSummary>, PublishError> {
    let drafts = cms.list_drafts(per_page).await?;
    info!(count = drafts.len(), "[PUBLISH] Fetched recent drafts");
    Ok(drafts)
}

pub async fn delete_post(cms: &dyn CmsClient, post_id: u64) -> Result<(), PublishError> {
    cms.delete_post(post_id).await?;
    info!(post_id, "[PUBLISH] Post deleted");
    Ok(())
}
