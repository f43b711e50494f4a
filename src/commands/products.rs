//! Product commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use jewelbox_client::JewelboxClient;
use jewelbox_core::error::AppError;
use jewelbox_core::types::Product;

use crate::output::{self, OutputFormat};

/// Arguments for product commands
#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Product subcommand
    #[command(subcommand)]
    pub command: ProductCommand,
}

/// Product subcommands
#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// List products
    List {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Get {
        /// Product ID
        id: String,
    },
}

/// Product display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ProductRow {
    id: String,
    name: String,
    category: String,
    price: String,
    stock: u32,
}

impl From<Product> for ProductRow {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            category: p.category_id,
            price: output::money(p.price),
            stock: p.stock,
        }
    }
}

/// Execute product commands
pub async fn execute(
    args: &ProductArgs,
    client: &JewelboxClient,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ProductCommand::List { category } => {
            let products = client.catalog().products(category.as_deref()).await?;
            let rows: Vec<ProductRow> = products.into_iter().map(ProductRow::from).collect();
            output::print_list(&rows, format);
        }
        ProductCommand::Get { id } => {
            let product = client.catalog().product(id).await?;
            output::print_record(
                &[
                    ("ID", product.id.clone()),
                    ("Name", product.name.clone()),
                    ("Description", product.description.clone()),
                    ("Category", product.category_id.clone()),
                    ("Price", output::money(product.price)),
                    ("Stock", product.stock.to_string()),
                ],
                &product,
                format,
            );
        }
    }

    Ok(())
}
