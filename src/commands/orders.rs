//! Order commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use jewelbox_client::JewelboxClient;
use jewelbox_core::error::AppError;
use jewelbox_core::types::{NewOrder, Order, OrderSearch, OrderStatus, PageRequest};

use crate::output::{self, OutputFormat};

/// Arguments for order commands
#[derive(Debug, Args)]
pub struct OrderArgs {
    /// Order subcommand
    #[command(subcommand)]
    pub command: OrderCommand,
}

/// Order subcommands
#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    /// Place an order
    Create {
        /// Product ID
        product_id: String,
        /// Number of units
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Search orders
    Search {
        /// Free-text query
        #[arg(short, long)]
        query: Option<String>,
        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Page size
        #[arg(long, default_value_t = 20)]
        page_size: u64,
    },
    /// Change an order's status
    Status {
        /// Order ID
        id: String,
        /// New status (pending, confirmed, shipped, delivered, cancelled)
        status: String,
    },
}

/// Order display row for table output
#[derive(Debug, Serialize, Tabled)]
struct OrderRow {
    id: String,
    product: String,
    quantity: u32,
    total: String,
    status: String,
    created_at: String,
}

impl From<&Order> for OrderRow {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id.clone(),
            product: o.product_id.clone(),
            quantity: o.quantity,
            total: output::money(o.total_price),
            status: o.status.to_string(),
            created_at: output::timestamp(&o.created_at),
        }
    }
}

/// Execute order commands
pub async fn execute(
    args: &OrderArgs,
    client: &JewelboxClient,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        OrderCommand::Create {
            product_id,
            quantity,
        } => {
            let order = client
                .orders()
                .create(&NewOrder {
                    product_id: product_id.clone(),
                    quantity: *quantity,
                })
                .await?;
            output::print_success(&format!(
                "Order {} placed, total {}",
                order.id,
                output::money(order.total_price)
            ));
        }
        OrderCommand::Search {
            query,
            status,
            page,
            page_size,
        } => {
            let status = status
                .as_deref()
                .map(str::parse::<OrderStatus>)
                .transpose()?;
            let search = OrderSearch {
                query: query.clone(),
                status,
                page: PageRequest::new(*page, *page_size),
            };

            let results = client.orders().search(&search).await?;
            match format {
                OutputFormat::Table => {
                    let rows: Vec<OrderRow> = results.items.iter().map(OrderRow::from).collect();
                    output::print_list(&rows, format);
                    println!(
                        "Page {} of {} ({} orders)",
                        results.page,
                        results.total_pages(),
                        results.total_items
                    );
                    if let Some(next) = results.next_request() {
                        println!("More results: --page {}", next.page);
                    }
                }
                OutputFormat::Json => output::print_record(&[], &results, format),
            }
        }
        OrderCommand::Status { id, status } => {
            let status: OrderStatus = status.parse()?;
            let order = client.orders().update_status(id, status).await?;
            output::print_success(&format!("Order {} is now {}", order.id, order.status));
        }
    }

    Ok(())
}
