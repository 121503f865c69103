//! Shared response handling for the HTTP clients.

use blogsmith_core::error::ServiceError;
use reqwest::Response;
use serde::de::DeserializeOwned;

pub(crate) fn network(service: &'static str, e: reqwest::Error) -> ServiceError {
    ServiceError::Network {
        service,
        message: e.to_string(),
    }
}

/// Passes 2xx responses through; anything else becomes a [`ServiceError`]
/// carrying the upstream message when one can be found.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: Response,
) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or(body);
    tracing::warn!(service, status = status.as_u16(), message = %message, "Upstream request failed");
    Err(ServiceError::from_status(service, status.as_u16(), message))
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T, ServiceError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ServiceError::InvalidResponse {
            service,
            message: e.to_string(),
        })
}

/// Pulls a human readable message out of the error bodies the providers
/// return: `{"message": ..}`, `{"error": {"message": ..}}` or
/// `{"errors": [..]}`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| value.pointer("/error/message").and_then(|m| m.as_str()))
        .or_else(|| value.pointer("/errors/0").and_then(|m| m.as_str()))
        .or_else(|| value.get("error").and_then(|m| m.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"code":"rest_forbidden","message":"Sorry"}"#).as_deref(),
            Some("Sorry")
        );
        assert_eq!(
            error_message(r#"{"error":{"message":"Incorrect API key","type":"x"}}"#).as_deref(),
            Some("Incorrect API key")
        );
        assert_eq!(
            error_message(r#"{"errors":["OAuth error: invalid token"]}"#).as_deref(),
            Some("OAuth error: invalid token")
        );
        assert_eq!(error_message(r#"{"error":"Not found"}"#).as_deref(), Some("Not found"));
        assert_eq!(error_message("<html>502</html>"), None);
    }
}
