//! User administration endpoints.

use reqwest::Method;
use serde::Serialize;
use tracing::info;

use jewelbox_core::types::{User, UserRole};

use crate::error::ApiError;
use crate::http::AuthorizedClient;

#[derive(Serialize)]
struct RoleUpdate {
    role: UserRole,
}

/// Admin-only user management.
#[derive(Debug, Clone, Copy)]
pub struct UsersApi<'a> {
    client: &'a AuthorizedClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a AuthorizedClient) -> Self {
        Self { client }
    }

    /// `GET /users`.
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.client.get_json(&["users"], &[]).await
    }

    /// `PUT /users/{id}/role`.
    pub async fn update_role(&self, id: &str, role: UserRole) -> Result<User, ApiError> {
        let user: User = self
            .client
            .send_json(Method::PUT, &["users", id, "role"], &RoleUpdate { role })
            .await?;
        info!(user_id = %id, role = %role, "User role updated");
        Ok(user)
    }
}
