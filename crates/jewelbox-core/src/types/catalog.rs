//! Product catalog types.

use serde::{Deserialize, Serialize};

/// A product category (rings, necklaces, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional cover image.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: f64,
    /// Owning category.
    pub category_id: String,
    /// Optional product image.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
}
