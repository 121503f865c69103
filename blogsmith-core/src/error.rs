//! Error types shared by the generators, the image pipeline and the publisher.
//!
//! Every collaborator call returns [`ServiceError`]; its variants keep
//! authentication failures and rate limiting apart from generic failures
//! because each one needs a different action from the user.

use thiserror::Error;

use crate::json_extract::ExtractError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} authentication failed: check the configured credentials")]
    Unauthorized { service: &'static str },

    #[error("{service} rate limit reached, please try again later")]
    RateLimited { service: &'static str },

    #[error("{service} API error (status {status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service} network error: {message}")]
    Network {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned an unexpected response: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
}

impl ServiceError {
    /// Maps a non-2xx status to the matching variant. 401 and 429 are
    /// recognised for every service; providers with other conventions map
    /// their own codes before calling this.
    pub fn from_status(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => ServiceError::Unauthorized { service },
            429 => ServiceError::RateLimited { service },
            _ => ServiceError::Api {
                service,
                status,
                message: message.into(),
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ServiceError::Unauthorized { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ServiceError::RateLimited { .. })
    }
}

/// Failure of a model-backed generation step (outline, article, questions).
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("completion request failed: {0}")]
    Completion(#[from] ServiceError),

    #[error("could not parse the model response: {0}")]
    Parse(#[from] ExtractError),
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("article has no featured image placement")]
    NoFeaturedPlacement,

    #[error("no images found for query \"{query}\"")]
    NoResults { query: String },

    #[error("photo search failed: {0}")]
    Provider(#[from] ServiceError),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publishing failed: {0}")]
    Cms(#[from] ServiceError),
}

impl PublishError {
    pub fn is_unauthorized(&self) -> bool {
        match self {
            PublishError::Cms(e) => e.is_unauthorized(),
        }
    }
}

/// Terminal failure of a full pipeline run, tagged with the stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("outline generation failed: {0}")]
    Outline(#[source] GenerationError),

    #[error("article generation failed: {0}")]
    Article(#[source] GenerationError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_distinguishes_auth_and_rate_limit() {
        assert!(ServiceError::from_status("WordPress", 401, "nope").is_unauthorized());
        assert!(ServiceError::from_status("OpenAI", 429, "slow down").is_rate_limited());
        match ServiceError::from_status("Pexels", 500, "boom") {
            ServiceError::Api { status, message, .. } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_messages_name_the_service() {
        let msg = ServiceError::Unauthorized { service: "WordPress" }.to_string();
        assert!(msg.contains("WordPress"));
        assert!(msg.contains("authentication failed"));
    }
}
