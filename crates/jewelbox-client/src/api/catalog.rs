//! Catalog endpoints.

use jewelbox_core::types::{Category, Product};

use crate::error::ApiError;
use crate::http::AuthorizedClient;

/// Categories and products.
#[derive(Debug, Clone, Copy)]
pub struct CatalogApi<'a> {
    client: &'a AuthorizedClient,
}

impl<'a> CatalogApi<'a> {
    pub(crate) fn new(client: &'a AuthorizedClient) -> Self {
        Self { client }
    }

    /// `GET /categories`.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.client.get_json(&["categories"], &[]).await
    }

    /// `GET /products`, optionally restricted to one category.
    pub async fn products(&self, category_id: Option<&str>) -> Result<Vec<Product>, ApiError> {
        let query: Vec<(&str, String)> = category_id
            .filter(|id| !id.is_empty())
            .map(|id| vec![("categoryId", id.to_string())])
            .unwrap_or_default();
        self.client.get_json(&["products"], &query).await
    }

    /// `GET /products/{id}`.
    pub async fn product(&self, id: &str) -> Result<Product, ApiError> {
        self.client.get_json(&["products", id], &[]).await
    }
}
