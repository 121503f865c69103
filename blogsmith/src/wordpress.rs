//! WordPress REST client backing [`CmsClient`].
//!
//! One client is built per blog record and carries that blog's credentials.
//! Media uploads fetch the source image into memory and post it as multipart
//! form data under a random file name.

use async_trait::async_trait;
use blogsmith_core::contract::{
    CmsClient, Media, NewMedia, NewPost, Post, PostSummary, Taxonomy, Term,
};
use blogsmith_core::error::ServiceError;
use blogsmith_core::model::PublishMode;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blogs::BlogRecord;
use crate::http::{ensure_success, network, read_json};

const SERVICE: &str = "WordPress";
const WP_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct WordPressClient {
    http: reqwest::Client,
    site_url: String,
    api_base: String,
    username: String,
    app_password: String,
}

#[derive(Deserialize)]
struct WpTerm {
    id: u64,
    name: String,
}

#[derive(Deserialize)]
struct WpMedia {
    id: u64,
    source_url: String,
}

#[derive(Deserialize)]
struct WpRendered {
    #[serde(default)]
    rendered: String,
}

#[derive(Deserialize)]
struct WpPost {
    id: u64,
    #[serde(default)]
    status: String,
    link: Option<String>,
    date: Option<String>,
    modified: Option<String>,
    title: Option<WpRendered>,
}

#[derive(Serialize)]
struct PostBody<'a> {
    title: &'a str,
    content: &'a str,
    excerpt: &'a str,
    status: &'static str,
    categories: &'a [u64],
    tags: &'a [u64],
    #[serde(skip_serializing_if = "Option::is_none")]
    featured_media: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

fn schedule_date(mode: PublishMode) -> Option<String> {
    mode.schedule_date()
        .map(|date| date.format(WP_DATE_FORMAT).to_string())
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

/// Random name for an uploaded image; the source URL is not reused.
fn upload_file_name(mime: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension_for(mime))
}

impl WordPressClient {
    pub fn from_blog(blog: &BlogRecord) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(blog.accept_invalid_certs)
            .build()
            .map_err(|e| network(SERVICE, e))?;
        tracing::info!(
            blog = %blog.id,
            site_url = %blog.site_url,
            accept_invalid_certs = blog.accept_invalid_certs,
            "Initialized WordPressClient for blog"
        );
        Ok(Self {
            http,
            site_url: blog.site_url.trim_end_matches('/').to_string(),
            api_base: blog.api_base(),
            username: blog.username.clone(),
            app_password: blog.app_password.clone(),
        })
    }

    pub fn edit_url(&self, post_id: u64) -> String {
        format!("{}/wp-admin/post.php?post={post_id}&action=edit", self.site_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(&self.username, Some(&self.app_password))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        let response = self
            .authed(builder)
            .send()
            .await
            .map_err(|e| network(SERVICE, e))?;
        ensure_success(SERVICE, response).await
    }

    fn to_post(&self, wp: WpPost) -> Post {
        Post {
            id: wp.id,
            status: wp.status,
            link: wp.link,
            date: wp.date,
            edit_url: self.edit_url(wp.id),
        }
    }

    /// Fetches the image bytes and their content type.
    async fn fetch_image(&self, url: &str) -> Result<(Vec<u8>, String), ServiceError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| network(SERVICE, e))?;
        let response = ensure_success(SERVICE, response).await?;
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or_else(|| "image/jpeg".to_string());
        let bytes = response.bytes().await.map_err(|e| network(SERVICE, e))?;
        Ok((bytes.to_vec(), mime))
    }
}

#[async_trait]
impl CmsClient for WordPressClient {
    async fn find_terms(&self, taxonomy: Taxonomy, name: &str) -> Result<Vec<Term>, ServiceError> {
        let url = format!("{}/{}", self.api_base, taxonomy.collection());
        let response = self
            .send(self.http.get(url).query(&[("search", name)]))
            .await?;
        let terms: Vec<WpTerm> = read_json(SERVICE, response).await?;
        Ok(terms
            .into_iter()
            .map(|t| Term {
                id: t.id,
                name: t.name,
            })
            .collect())
    }

    async fn create_term(&self, taxonomy: Taxonomy, name: &str) -> Result<Term, ServiceError> {
        let url = format!("{}/{}", self.api_base, taxonomy.collection());
        let response = self
            .send(self.http.post(url).json(&serde_json::json!({ "name": name })))
            .await?;
        let term: WpTerm = read_json(SERVICE, response).await?;
        tracing::info!(taxonomy = taxonomy.collection(), term = %term.name, id = term.id, "Created term");
        Ok(Term {
            id: term.id,
            name: term.name,
        })
    }

    async fn upload_media(&self, media: NewMedia) -> Result<Media, ServiceError> {
        let (bytes, mime) = self.fetch_image(&media.source_url).await?;
        let file_name = upload_file_name(&mime);
        tracing::debug!(file_name = %file_name, size = bytes.len(), "Image fetched for upload");

        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(&mime)
            .map_err(|e| network(SERVICE, e))?;
        let form = Form::new()
            .part("file", part)
            .text("alt_text", media.alt_text)
            .text("caption", media.caption);

        let response = self
            .send(
                self.http
                    .post(format!("{}/media", self.api_base))
                    .multipart(form),
            )
            .await?;
        let uploaded: WpMedia = read_json(SERVICE, response).await?;
        tracing::info!(media_id = uploaded.id, file_name = %file_name, "Media uploaded");
        Ok(Media {
            id: uploaded.id,
            url: uploaded.source_url,
        })
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, ServiceError> {
        let body = PostBody {
            title: &post.title,
            content: &post.content,
            excerpt: &post.excerpt,
            status: post.mode.status(),
            categories: &post.categories,
            tags: &post.tags,
            featured_media: post.featured_media,
            date: schedule_date(post.mode),
        };
        let response = self
            .send(self.http.post(format!("{}/posts", self.api_base)).json(&body))
            .await?;
        let created: WpPost = read_json(SERVICE, response).await?;
        Ok(self.to_post(created))
    }

    async fn update_post_status(&self, post_id: u64, mode: PublishMode) -> Result<Post, ServiceError> {
        let body = StatusBody {
            status: mode.status(),
            date: schedule_date(mode),
        };
        let response = self
            .send(
                self.http
                    .post(format!("{}/posts/{post_id}", self.api_base))
                    .json(&body),
            )
            .await?;
        let updated: WpPost = read_json(SERVICE, response).await?;
        Ok(self.to_post(updated))
    }

    async fn list_drafts(&self, per_page: u32) -> Result<Vec<PostSummary>, ServiceError> {
        let per_page = per_page.to_string();
        let response = self
            .send(self.http.get(format!("{}/posts", self.api_base)).query(&[
                ("status", "draft"),
                ("per_page", per_page.as_str()),
                ("orderby", "modified"),
                ("order", "desc"),
            ]))
            .await?;
        let posts: Vec<WpPost> = read_json(SERVICE, response).await?;
        Ok(posts
            .into_iter()
            .map(|p| PostSummary {
                id: p.id,
                title: p.title.map(|t| t.rendered).unwrap_or_default(),
                modified: p.modified.unwrap_or_default(),
                edit_url: self.edit_url(p.id),
            })
            .collect())
    }

    async fn delete_post(&self, post_id: u64) -> Result<(), ServiceError> {
        self.send(
            self.http
                .delete(format!("{}/posts/{post_id}", self.api_base))
                .query(&[("force", "true")]),
        )
        .await?;
        tracing::info!(post_id, "Post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn blog(site_url: &str) -> BlogRecord {
        BlogRecord {
            id: "main".to_string(),
            name: "Main".to_string(),
            site_url: site_url.to_string(),
            username: "editor".to_string(),
            app_password: "abcd efgh".to_string(),
            accept_invalid_certs: true,
            brand_voice: Default::default(),
        }
    }

    #[test]
    fn test_urls_are_built_from_site() {
        let client = WordPressClient::from_blog(&blog("https://blog.example/")).unwrap();
        assert_eq!(client.api_base, "https://blog.example/wp-json/wp/v2");
        assert_eq!(
            client.edit_url(42),
            "https://blog.example/wp-admin/post.php?post=42&action=edit"
        );
    }

    #[test]
    fn test_scheduled_post_body_carries_date() {
        let date =
            NaiveDateTime::parse_from_str("2026-11-02 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let body = PostBody {
            title: "t",
            content: "c",
            excerpt: "e",
            status: PublishMode::Schedule(date).status(),
            categories: &[1],
            tags: &[],
            featured_media: None,
            date: schedule_date(PublishMode::Schedule(date)),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "future");
        assert_eq!(json["date"], "2026-11-02T09:00:00");
        assert!(json.get("featured_media").is_none());
    }

    #[test]
    fn test_draft_listing_parses_rendered_title() {
        let posts: Vec<WpPost> = serde_json::from_str(
            r#"[{"id": 5, "status": "draft", "link": "https://blog.example/?p=5",
                 "modified": "2026-10-01T10:00:00", "title": {"rendered": "Hello"}}]"#,
        )
        .unwrap();
        assert_eq!(posts[0].title.as_ref().unwrap().rendered, "Hello");
        assert_eq!(posts[0].date, None);
    }

    #[test]
    fn test_extension_follows_content_type() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("application/octet-stream"), "jpg");
    }

    #[test]
    fn test_upload_file_names_are_fresh_per_upload() {
        let first = upload_file_name("image/png");
        let second = upload_file_name("image/png");
        assert_ne!(first, second);
        let (stem, extension) = first.rsplit_once('.').unwrap();
        assert_eq!(extension, "png");
        assert!(Uuid::parse_str(stem).is_ok());
        assert!(upload_file_name("image/jpeg").ends_with(".jpg"));
    }
}
