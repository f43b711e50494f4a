//! Order endpoints.

use reqwest::Method;
use serde::Serialize;
use tracing::info;

use jewelbox_core::types::{NewOrder, Order, OrderSearch, OrderStatus, PageResponse};

use crate::error::ApiError;
use crate::http::AuthorizedClient;

#[derive(Serialize)]
struct StatusUpdate {
    status: OrderStatus,
}

/// Order placement, search, and status changes.
#[derive(Debug, Clone, Copy)]
pub struct OrdersApi<'a> {
    client: &'a AuthorizedClient,
}

impl<'a> OrdersApi<'a> {
    pub(crate) fn new(client: &'a AuthorizedClient) -> Self {
        Self { client }
    }

    /// `POST /orders`.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, ApiError> {
        if order.product_id.trim().is_empty() {
            return Err(ApiError::Validation("Product id is required".into()));
        }
        if order.quantity == 0 {
            return Err(ApiError::Validation("Quantity must be at least 1".into()));
        }

        let created: Order = self.client.send_json(Method::POST, &["orders"], order).await?;
        info!(
            order_id = %created.id,
            product_id = %created.product_id,
            quantity = created.quantity,
            "Order placed"
        );
        Ok(created)
    }

    /// `GET /orders` with search filters and paging.
    pub async fn search(&self, search: &OrderSearch) -> Result<PageResponse<Order>, ApiError> {
        self.client.get_json(&["orders"], &search.query_pairs()).await
    }

    /// `PUT /orders/{id}/status`.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order, ApiError> {
        let updated: Order = self
            .client
            .send_json(Method::PUT, &["orders", id, "status"], &StatusUpdate { status })
            .await?;
        info!(order_id = %id, status = %status, "Order status updated");
        Ok(updated)
    }
}
