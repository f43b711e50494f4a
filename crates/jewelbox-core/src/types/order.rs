//! Order types as exchanged with the backend.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::pagination::PageRequest;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed, awaiting confirmation.
    Pending,
    /// Accepted by the shop.
    Confirmed,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled before delivery.
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Return the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(AppError::validation(format!(
                "Invalid order status: '{s}'. Expected one of: pending, confirmed, shipped, delivered, cancelled"
            ))),
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Server-generated identifier.
    pub id: String,
    /// Ordered product.
    pub product_id: String,
    /// Customer, when the caller may see it.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Number of units.
    pub quantity: u32,
    /// Total computed by the backend.
    pub total_price: f64,
    /// Current status.
    pub status: OrderStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Body of an order creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Product to order.
    pub product_id: String,
    /// Number of units.
    pub quantity: u32,
}

/// Order search filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderSearch {
    /// Free-text query (order id, product name, ...).
    pub query: Option<String>,
    /// Restrict to one status.
    pub status: Option<OrderStatus>,
    /// Page to fetch.
    pub page: PageRequest,
}

impl OrderSearch {
    /// Query-string pairs for `GET /orders`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(query) = self.query.as_deref().filter(|q| !q.trim().is_empty()) {
            pairs.push(("query", query.trim().to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs.push(("page", self.page.page.to_string()));
        pairs.push(("pageSize", self.page.page_size.to_string()));
        pairs
    }
}
