//! Authorized request pipeline.
//!
//! Every request gets a fresh-enough access token from the
//! [`TokenManager`]. A 401 triggers one refresh and, if that succeeds, one
//! retry with the new token. A second 401 ends the request with
//! [`SessionError::AuthenticationFinal`] and leaves the session alone.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use jewelbox_auth::{SessionError, TokenManager};

use super::transport::{self, HttpTransport};
use crate::error::ApiError;

/// HTTP client that attaches and renews bearer credentials.
#[derive(Debug, Clone)]
pub struct AuthorizedClient {
    http: HttpTransport,
    tokens: TokenManager,
}

impl AuthorizedClient {
    /// Create a pipeline over a transport and a session.
    pub fn new(http: HttpTransport, tokens: TokenManager) -> Self {
        Self { http, tokens }
    }

    /// The session backing this client.
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// The underlying transport.
    pub fn transport(&self) -> &HttpTransport {
        &self.http
    }

    /// Send a request with the retry-once protocol.
    ///
    /// `build` is called once per attempt so the request (body included)
    /// can be rebuilt for the retry. Any non-401 response is returned as-is.
    pub async fn send<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn(&HttpTransport) -> RequestBuilder + Send + Sync,
    {
        let token = self.tokens.access_token_for_request().await?;
        let response = build(&self.http).bearer_auth(&token).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = %response.url().path(), "Request unauthorized, refreshing session");
        let renewed = self.tokens.refresh_after_rejection(&token).await?;

        let retry = build(&self.http)
            .bearer_auth(&renewed.access_token)
            .send()
            .await?;

        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!(
                user_id = %renewed.user_id,
                path = %retry.url().path(),
                "Request rejected after refresh"
            );
            return Err(SessionError::AuthenticationFinal.into());
        }

        Ok(retry)
    }

    /// `GET` a JSON resource.
    pub async fn get_json<T>(&self, path: &[&str], query: &[(&str, String)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .send(|http| http.request(Method::GET, path).query(query))
            .await?;
        transport::read_json(response).await
    }

    /// Send a JSON body and decode a JSON response.
    pub async fn send_json<B, T>(&self, method: Method, path: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(|http| http.request(method.clone(), path).json(body))
            .await?;
        transport::read_json(response).await
    }

    /// Send a JSON body, expecting no response content.
    pub async fn send_empty<B>(&self, method: Method, path: &[&str], body: &B) -> Result<(), ApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let response = self
            .send(|http| http.request(method.clone(), path).json(body))
            .await?;
        transport::read_empty(response).await
    }
}
