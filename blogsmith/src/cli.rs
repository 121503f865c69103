//! # blogsmith CLI Interface (Module)
//!
//! Command parsing and orchestration for the `blogsmith` binary. All content
//! logic (prompts, parsing, placement reconciliation, image ranking,
//! publishing rules) lives in `blogsmith-core`; this module wires the HTTP
//! clients to it and persists what each step produced.
//!
//! Each step can run on its own and hands its result to the next through a
//! JSON artifact in the configured output directory:
//!
//! `outline` → `write --outline` → `images --article` → `publish --article --images`
//!
//! `run` does the whole chain in one go.
use crate::artifacts::{load_json, save_html, save_json};
use crate::blogs::{BlogRecord, BlogStore};
use crate::load_config::{load_config, CliConfig};
use crate::openai::OpenAiClient;
use crate::pexels::PexelsClient;
use crate::unsplash::UnsplashClient;
use crate::wordpress::WordPressClient;
use anyhow::{Context, Result};
use blogsmith_core::contract::{CmsClient, PhotoProvider};
use blogsmith_core::images::{featured_candidates, select_images};
use blogsmith_core::model::{
    Article, BrandVoice, Brief, ImageSelection, Outline, PhotoSource, PublishMode,
};
use blogsmith_core::outline::{generate_outline, outline_advisories, revise_section};
use blogsmith_core::pipeline::{self, PipelineConfig};
use blogsmith_core::placeholder::render_preview;
use blogsmith_core::publish::{delete_post, promote, publish, recent_drafts};
use blogsmith_core::questions::generate_questions;
use blogsmith_core::{article::generate_article, seo};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI for blogsmith: draft, illustrate and publish blog posts.
#[derive(Parser)]
#[clap(
    name = "blogsmith",
    version,
    about = "Generate blog outlines and articles, pick stock photos and publish to WordPress"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

/// The content brief shared by the generation commands.
#[derive(Args, Debug, Clone)]
pub struct BriefArgs {
    #[clap(long)]
    pub topic: String,
    #[clap(long, default_value = "")]
    pub angle: String,
    #[clap(long, default_value = "")]
    pub audience: String,
    #[clap(long, default_value = "")]
    pub tone: String,
    /// Repeat for several points
    #[clap(long = "key-point")]
    pub key_points: Vec<String>,
}

impl From<BriefArgs> for Brief {
    fn from(args: BriefArgs) -> Self {
        Brief {
            topic: args.topic,
            angle: args.angle,
            audience: args.audience,
            tone: args.tone,
            key_points: args.key_points,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PublishArgs {
    #[clap(long, value_enum, default_value_t = StatusArg::Draft)]
    pub status: StatusArg,
    /// Required with `--status schedule`, e.g. "2026-11-02 09:00"
    #[clap(long)]
    pub date: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    Draft,
    Publish,
    Schedule,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an outline for a brief
    Outline {
        #[clap(long)]
        config: PathBuf,
        #[clap(flatten)]
        brief: BriefArgs,
        /// Use this blog's brand voice
        #[clap(long)]
        blog: Option<String>,
    },
    /// Ask the model for clarifying questions about a brief
    Questions {
        #[clap(long)]
        config: PathBuf,
        #[clap(flatten)]
        brief: BriefArgs,
        #[clap(long)]
        blog: Option<String>,
    },
    /// Rewrite one outline section from feedback
    Revise {
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        outline: PathBuf,
        /// 1-based section number
        #[clap(long)]
        section: usize,
        #[clap(long)]
        feedback: String,
    },
    /// Write the article for a saved outline
    Write {
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        outline: PathBuf,
        #[clap(flatten)]
        brief: BriefArgs,
        #[clap(long)]
        blog: Option<String>,
    },
    /// List featured image candidates for a saved article
    Candidates {
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        article: PathBuf,
    },
    /// Select images for every placement of a saved article
    Images {
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        article: PathBuf,
        #[clap(flatten)]
        brief: BriefArgs,
        /// Id of the featured candidate to use
        #[clap(long)]
        featured: Option<String>,
    },
    /// Publish a saved article and image selection to a blog
    Publish {
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        blog: String,
        #[clap(long)]
        article: PathBuf,
        #[clap(long)]
        images: PathBuf,
        #[clap(flatten)]
        mode: PublishArgs,
    },
    /// Outline, write, illustrate and optionally publish in one go
    Run {
        #[clap(long)]
        config: PathBuf,
        #[clap(flatten)]
        brief: BriefArgs,
        /// Publish to this blog; without it the run stops after image selection
        #[clap(long)]
        blog: Option<String>,
        #[clap(long)]
        featured: Option<String>,
        #[clap(flatten)]
        mode: PublishArgs,
    },
    /// List recent drafts of a blog
    Drafts {
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        blog: String,
        #[clap(long, default_value_t = 10)]
        limit: u32,
    },
    /// Publish or schedule an existing post
    Promote {
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        blog: String,
        #[clap(long)]
        post_id: u64,
        /// Schedule instead of publishing now
        #[clap(long)]
        date: Option<String>,
    },
    /// Permanently delete a post
    Delete {
        #[clap(long)]
        config: PathBuf,
        #[clap(long)]
        blog: String,
        #[clap(long)]
        post_id: u64,
    },
    /// Manage the blog store
    Blogs {
        #[clap(long)]
        config: PathBuf,
        #[clap(subcommand)]
        action: BlogsCommand,
    },
}

#[derive(Subcommand)]
pub enum BlogsCommand {
    List,
    Add {
        #[clap(long)]
        id: String,
        #[clap(long)]
        name: String,
        #[clap(long)]
        site_url: String,
        #[clap(long)]
        username: String,
        #[clap(long)]
        app_password: String,
        #[clap(long)]
        accept_invalid_certs: bool,
    },
    Remove {
        #[clap(long)]
        id: String,
    },
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

pub fn parse_date(raw: &str) -> Result<NaiveDateTime> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
        .with_context(|| format!("Unrecognised date \"{raw}\", expected YYYY-MM-DD HH:MM"))
}

pub fn publish_mode(args: &PublishArgs) -> Result<PublishMode> {
    match (args.status, args.date.as_deref()) {
        (StatusArg::Draft, _) => Ok(PublishMode::Draft),
        (StatusArg::Publish, _) => Ok(PublishMode::Publish),
        (StatusArg::Schedule, Some(date)) => Ok(PublishMode::Schedule(parse_date(date)?)),
        (StatusArg::Schedule, None) => Err(anyhow::anyhow!("--status schedule requires --date")),
    }
}

fn completion_client(config: &CliConfig) -> Result<OpenAiClient> {
    Ok(OpenAiClient::new_from_env(
        &config.openai_base_url,
        &config.settings.model,
    )?)
}

fn photo_provider(config: &CliConfig) -> Result<Box<dyn PhotoProvider>> {
    Ok(match config.image_provider {
        PhotoSource::Unsplash => Box::new(UnsplashClient::new_from_env()?),
        PhotoSource::Pexels => Box::new(PexelsClient::new_from_env()?),
    })
}

fn find_blog(config: &CliConfig, id: &str) -> Result<BlogRecord> {
    let store = BlogStore::load(&config.blogs_file)?;
    Ok(store.get(id)?.clone())
}

fn brand_voice(config: &CliConfig, blog: Option<&str>) -> Result<BrandVoice> {
    match blog {
        Some(id) => Ok(find_blog(config, id)?.brand_voice),
        None => Ok(BrandVoice::default()),
    }
}

fn cms_client(config: &CliConfig, blog: &str) -> Result<WordPressClient> {
    let record = find_blog(config, blog)?;
    Ok(WordPressClient::from_blog(&record)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Outline {
            config,
            brief,
            blog,
        } => {
            let config = load_config(config)?;
            tracing::info!(command = "outline", "Generating outline");
            let brand = brand_voice(&config, blog.as_deref())?;
            let completion = completion_client(&config)?;
            let outline =
                generate_outline(&completion, &Brief::from(brief), &brand, &config.settings).await?;
            for advisory in outline_advisories(&outline) {
                tracing::warn!(command = "outline", %advisory, "Outline advisory");
            }
            let path = save_json(&config.output_dir, "outline", &outline)?;
            print_json(&outline)?;
            println!("Saved outline to {}", path.display());
            Ok(())
        }
        Commands::Questions {
            config,
            brief,
            blog,
        } => {
            let config = load_config(config)?;
            let brand = brand_voice(&config, blog.as_deref())?;
            let completion = completion_client(&config)?;
            let questions =
                generate_questions(&completion, &Brief::from(brief), &brand, &config.settings).await?;
            for (i, question) in questions.iter().enumerate() {
                println!("{}. {question}", i + 1);
            }
            Ok(())
        }
        Commands::Revise {
            config,
            outline,
            section,
            feedback,
        } => {
            let config = load_config(config)?;
            let mut loaded: Outline = load_json(&outline)?;
            let index = section
                .checked_sub(1)
                .filter(|i| *i < loaded.sections.len())
                .with_context(|| {
                    format!(
                        "Section {section} does not exist, the outline has {} sections",
                        loaded.sections.len()
                    )
                })?;
            let completion = completion_client(&config)?;
            let revised =
                revise_section(&completion, &loaded.sections[index], &feedback, &config.settings)
                    .await?;
            loaded.sections[index] = revised;
            let path = save_json(&config.output_dir, "outline", &loaded)?;
            print_json(&loaded.sections[index])?;
            println!("Saved revised outline to {}", path.display());
            Ok(())
        }
        Commands::Write {
            config,
            outline,
            brief,
            blog,
        } => {
            let config = load_config(config)?;
            tracing::info!(command = "write", "Writing article");
            let outline: Outline = load_json(&outline)?;
            let brand = brand_voice(&config, blog.as_deref())?;
            let completion = completion_client(&config)?;
            let article = generate_article(
                &completion,
                &outline,
                &Brief::from(brief),
                &brand,
                &config.settings,
            )
            .await?;
            let report = seo::review(&article);
            let path = save_json(&config.output_dir, "article", &article)?;
            print_json(&report)?;
            println!(
                "Saved article \"{}\" with {} image placements to {}",
                article.title,
                article.image_placements.len(),
                path.display()
            );
            Ok(())
        }
        Commands::Candidates { config, article } => {
            let config = load_config(config)?;
            let article: Article = load_json(&article)?;
            let photos = photo_provider(&config)?;
            let candidates = featured_candidates(photos.as_ref(), &article).await?;
            print_json(&candidates)?;
            Ok(())
        }
        Commands::Images {
            config,
            article,
            brief,
            featured,
        } => {
            let config = load_config(config)?;
            tracing::info!(command = "images", "Selecting images");
            let article: Article = load_json(&article)?;
            let completion = completion_client(&config)?;
            let photos = photo_provider(&config)?;
            let selection = select_images(
                &completion,
                photos.as_ref(),
                &article,
                &Brief::from(brief),
                featured.as_deref(),
                &config.settings,
            )
            .await;
            let path = save_json(&config.output_dir, "images", &selection)?;
            let preview = render_preview(&article.content, &selection.inline_images);
            let preview_path = save_html(&config.output_dir, "preview", &preview)?;
            println!(
                "Selected {} images, saved to {} (preview: {})",
                selection.all_images.len(),
                path.display(),
                preview_path.display()
            );
            Ok(())
        }
        Commands::Publish {
            config,
            blog,
            article,
            images,
            mode,
        } => {
            let config = load_config(config)?;
            let mode = publish_mode(&mode)?;
            let article: Article = load_json(&article)?;
            let images: ImageSelection = load_json(&images)?;
            let cms = cms_client(&config, &blog)?;
            tracing::info!(command = "publish", blog = %blog, status = mode.status(), "Publishing article");
            match publish(&cms, &article, &images, mode).await {
                Ok(result) => {
                    save_json(&config.output_dir, "published", &result)?;
                    print_json(&result)?;
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "publish", error = %e, "Publishing failed");
                    Err(e.into())
                }
            }
        }
        Commands::Run {
            config,
            brief,
            blog,
            featured,
            mode,
        } => {
            let config = load_config(config)?;
            tracing::info!(command = "run", "Starting content pipeline");
            let brand = brand_voice(&config, blog.as_deref())?;
            let cms = match blog.as_deref() {
                Some(id) => Some(cms_client(&config, id)?),
                None => None,
            };
            let pipeline_config = PipelineConfig {
                brand,
                settings: config.settings.clone(),
                selected_featured_id: featured,
                publish: if cms.is_some() {
                    Some(publish_mode(&mode)?)
                } else {
                    None
                },
            };
            let completion = completion_client(&config)?;
            let photos = photo_provider(&config)?;
            let report = pipeline::run(
                &pipeline_config,
                &Brief::from(brief),
                &completion,
                photos.as_ref(),
                cms.as_ref().map(|c| c as &dyn CmsClient),
            )
            .await?;

            save_json(&config.output_dir, "outline", &report.outline)?;
            save_json(&config.output_dir, "article", &report.article)?;
            save_json(&config.output_dir, "images", &report.images)?;
            let preview = render_preview(&report.article.content, &report.images.inline_images);
            save_html(&config.output_dir, "preview", &preview)?;
            let path = save_json(&config.output_dir, "report", &report)?;
            match &report.published {
                Some(result) => print_json(result)?,
                None => println!("Article \"{}\" ready, not published", report.article.title),
            }
            println!("Saved run report to {}", path.display());
            Ok(())
        }
        Commands::Drafts {
            config,
            blog,
            limit,
        } => {
            let config = load_config(config)?;
            let cms = cms_client(&config, &blog)?;
            let drafts = recent_drafts(&cms, limit).await?;
            if drafts.is_empty() {
                println!("No drafts");
            }
            for draft in drafts {
                println!(
                    "{}\t{}\t{}\t{}",
                    draft.id, draft.modified, draft.title, draft.edit_url
                );
            }
            Ok(())
        }
        Commands::Promote {
            config,
            blog,
            post_id,
            date,
        } => {
            let config = load_config(config)?;
            let mode = match date.as_deref() {
                Some(raw) => PublishMode::Schedule(parse_date(raw)?),
                None => PublishMode::Publish,
            };
            let cms = cms_client(&config, &blog)?;
            let post = promote(&cms, post_id, mode).await?;
            println!("Post {} is now {} ({})", post.id, post.status, post.edit_url);
            Ok(())
        }
        Commands::Delete {
            config,
            blog,
            post_id,
        } => {
            let config = load_config(config)?;
            let cms = cms_client(&config, &blog)?;
            delete_post(&cms, post_id).await?;
            println!("Deleted post {post_id}");
            Ok(())
        }
        Commands::Blogs { config, action } => {
            let config = load_config(config)?;
            let mut store = BlogStore::load(&config.blogs_file)?;
            match action {
                BlogsCommand::List => {
                    if store.blogs().is_empty() {
                        println!("No blogs configured");
                    }
                    for blog in store.blogs() {
                        println!("{}\t{}\t{}", blog.id, blog.name, blog.site_url);
                    }
                }
                BlogsCommand::Add {
                    id,
                    name,
                    site_url,
                    username,
                    app_password,
                    accept_invalid_certs,
                } => {
                    store.add(BlogRecord {
                        id: id.clone(),
                        name,
                        site_url,
                        username,
                        app_password,
                        accept_invalid_certs,
                        brand_voice: BrandVoice::default(),
                    })?;
                    store.save()?;
                    println!("Added blog {id}");
                }
                BlogsCommand::Remove { id } => {
                    let removed = store.remove(&id)?;
                    store.save()?;
                    println!("Removed blog {}", removed.id);
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_common_formats() {
        let expected =
            NaiveDateTime::parse_from_str("2026-11-02 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parse_date("2026-11-02T09:00:00").unwrap(), expected);
        assert_eq!(parse_date("2026-11-02 09:00").unwrap(), expected);
        assert!(parse_date("next tuesday").is_err());
    }

    #[test]
    fn test_schedule_requires_date() {
        let args = PublishArgs {
            status: StatusArg::Schedule,
            date: None,
        };
        assert!(publish_mode(&args).is_err());
        let args = PublishArgs {
            status: StatusArg::Draft,
            date: Some("ignored".to_string()),
        };
        assert_eq!(publish_mode(&args).unwrap(), PublishMode::Draft);
    }
}
