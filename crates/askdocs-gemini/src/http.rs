//! Shared request plumbing for the Gemini REST API

use askdocs_core::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::GeminiConfig;

/// POST a JSON body and decode the JSON reply.
///
/// Status codes are mapped so that the retry policy can tell transient
/// failures (429, 5xx, transport) from permanent ones. `provider_error`
/// builds the error for remaining non-success statuses.
pub(crate) async fn post_json<B, R>(
    client: &Client,
    config: &GeminiConfig,
    url: &str,
    body: &B,
    provider_error: fn(String) -> Error,
) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .header("Content-Type", "application/json")
        .header("x-goog-api-key", &config.api_key)
        .json(body)
        .send()
        .await
        .map_err(map_transport_error)?;

    let status = response.status();
    let text = response.text().await.map_err(map_transport_error)?;

    if !status.is_success() {
        return Err(map_status(status, &text, provider_error));
    }

    serde_json::from_str(&text).map_err(|e| {
        Error::Serialization(format!("failed to decode Gemini response: {}", e))
    })
}

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(err.to_string())
    } else {
        Error::Network(err.to_string())
    }
}

pub(crate) fn map_status(status: StatusCode, body: &str, provider_error: fn(String) -> Error) -> Error {
    let message = format!("Gemini API request failed with status {}: {}", status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(message),
        s if s.is_server_error() => Error::Network(message),
        _ => provider_error(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = map_status(StatusCode::FORBIDDEN, "denied", Error::LLMProvider);
        assert!(matches!(err, Error::Authentication(_)));

        let err = map_status(StatusCode::TOO_MANY_REQUESTS, "quota", Error::LLMProvider);
        assert!(err.is_retryable());

        let err = map_status(StatusCode::SERVICE_UNAVAILABLE, "overloaded", Error::Embedding);
        assert!(matches!(err, Error::Network(_)));

        let err = map_status(StatusCode::BAD_REQUEST, "bad model", Error::Embedding);
        assert!(matches!(err, Error::Embedding(_)));
        assert!(!err.is_retryable());
    }
}
