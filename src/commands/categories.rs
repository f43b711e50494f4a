//! `jewelbox categories`

use serde::Serialize;
use tabled::Tabled;

use jewelbox_client::JewelboxClient;
use jewelbox_core::error::AppError;
use jewelbox_core::types::Category;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct CategoryRow {
    id: String,
    name: String,
    image: String,
}

impl From<Category> for CategoryRow {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            image: c.image_url.unwrap_or_else(|| "-".into()),
        }
    }
}

/// Lists every category; ids feed `products list --category`.
pub async fn list(client: &JewelboxClient, format: OutputFormat) -> Result<(), AppError> {
    let rows: Vec<CategoryRow> = client
        .catalog()
        .categories()
        .await?
        .into_iter()
        .map(CategoryRow::from)
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
