#![doc = "blogsmith-core: core logic library for blogsmith."]

//! This crate holds the data model, the collaborator contracts and every
//! generation/reconciliation/publishing step. Network clients live in the
//! `blogsmith` crate and plug in through the traits in [`contract`].
//!
//! # Usage
//! Depend on this crate from anything that needs to drive the pipeline; pass
//! concrete (or mocked) [`contract::CompletionClient`],
//! [`contract::PhotoProvider`] and [`contract::CmsClient`] implementations.

pub mod article;
pub mod contract;
pub mod error;
pub mod images;
pub mod json_extract;
pub mod model;
pub mod outline;
pub mod pipeline;
pub mod placeholder;
pub mod prompts;
pub mod publish;
pub mod questions;
pub mod seo;
