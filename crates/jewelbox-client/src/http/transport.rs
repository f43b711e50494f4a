//! Plain HTTP transport bound to the backend base URL.

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use jewelbox_core::AppResult;
use jewelbox_core::config::ApiConfig;
use jewelbox_core::error::AppError;

use crate::error::ApiError;

/// Shared `reqwest` client plus the backend base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

/// Error body shapes the backend uses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a resource below the base URL. Each segment is
    /// percent-encoded, so ids cannot escape their position in the path.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Start a request. No credentials are attached.
    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        debug!(%method, path = url.path(), "Building request");
        self.client.request(method, url)
    }
}

fn parse_base_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| AppError::configuration(format!("Invalid api.base_url {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(AppError::configuration(format!(
            "api.base_url {raw:?} cannot hold resource paths"
        )));
    }
    Ok(url)
}

/// Decode a success body, or turn an error status into [`ApiError::Status`].
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Accept any success status and discard the body.
pub async fn read_empty(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_from_response(response).await)
    }
}

/// Build [`ApiError::Status`] from an error response.
///
/// JSON bodies carrying `message` or `error` contribute that text; other
/// bodies are used verbatim, and an empty body falls back to the status
/// reason.
pub async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    ApiError::Status {
        status: status.as_u16(),
        message: error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        }),
    }
}

fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorEnvelope>(trimmed) {
        Ok(envelope) => envelope
            .message
            .or(envelope.error)
            .filter(|m| !m.is_empty())
            .or_else(|| Some(trimmed.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}
