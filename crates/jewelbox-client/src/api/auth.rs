//! Credential endpoints and account management.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{debug, info};
use validator::Validate;

use jewelbox_auth::{RefreshClient, SessionError};
use jewelbox_core::types::{IssuedTokens, User};

use crate::error::ApiError;
use crate::http::transport::{self, HttpTransport};
use crate::http::AuthorizedClient;

/// Sign-in request body.
#[derive(Clone, Serialize, Validate)]
pub struct SignInRequest {
    /// Account email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Account password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Sign-up request body.
#[derive(Clone, Serialize, Validate)]
pub struct SignUpRequest {
    /// Account email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Account password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// Optional contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 32))]
    pub phone: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Password change request body.
#[derive(Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1))]
    pub old_password: String,
    /// Replacement password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Phone change request body.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ChangePhoneRequest {
    /// New contact phone.
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
}

/// Unauthenticated credential endpoints.
///
/// These calls never carry an `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthApi {
    http: HttpTransport,
}

impl AuthApi {
    /// Create over a transport.
    pub fn new(http: HttpTransport) -> Self {
        Self { http }
    }

    /// `POST /auth/signin`.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<IssuedTokens, ApiError> {
        request.validate()?;
        let response = self
            .http
            .request(Method::POST, &["auth", "signin"])
            .json(request)
            .send()
            .await?;
        transport::read_json(response).await
    }

    /// `POST /auth/signup`.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<IssuedTokens, ApiError> {
        request.validate()?;
        let response = self
            .http
            .request(Method::POST, &["auth", "signup"])
            .json(request)
            .send()
            .await?;
        let issued = transport::read_json(response).await?;
        info!(email = %request.email, "Account created");
        Ok(issued)
    }
}

#[async_trait]
impl RefreshClient for AuthApi {
    async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokens, SessionError> {
        let response = self
            .http
            .request(Method::POST, &["auth", "refresh"])
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| SessionError::NetworkFailure(ApiError::from(e).to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!(status = status.as_u16(), "Refresh token rejected");
            return Err(SessionError::RefreshRejected {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(SessionError::NetworkFailure(format!(
                "refresh returned HTTP {status}"
            )));
        }

        response
            .json::<IssuedTokens>()
            .await
            .map_err(|e| SessionError::NetworkFailure(format!("unreadable refresh response: {e}")))
    }
}

/// Endpoints for the signed-in account.
#[derive(Debug, Clone, Copy)]
pub struct AccountApi<'a> {
    client: &'a AuthorizedClient,
}

impl<'a> AccountApi<'a> {
    pub(crate) fn new(client: &'a AuthorizedClient) -> Self {
        Self { client }
    }

    /// `GET /auth/me`.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.client.get_json(&["auth", "me"], &[]).await
    }

    /// `PUT /auth/password`.
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ApiError> {
        request.validate()?;
        self.client
            .send_empty(Method::PUT, &["auth", "password"], request)
            .await?;
        info!("Password changed");
        Ok(())
    }

    /// `PUT /auth/phone`.
    pub async fn change_phone(&self, request: &ChangePhoneRequest) -> Result<(), ApiError> {
        request.validate()?;
        self.client
            .send_empty(Method::PUT, &["auth", "phone"], request)
            .await
    }
}
