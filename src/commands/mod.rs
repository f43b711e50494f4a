//! Subcommands. Each module parses its own arguments and prints through
//! [`crate::output`].

pub mod auth;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

use clap::{Parser, Subcommand};

use jewelbox_client::JewelboxClient;
use jewelbox_core::error::{AppError, ErrorKind};

use crate::output::OutputFormat;

/// Browse the jewelry catalog and place orders.
#[derive(Debug, Parser)]
#[command(name = "jewelbox", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file; `config/<JEWELBOX_ENV>.toml` and `JEWELBOX__*`
    /// variables are layered on top
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Session and account
    Auth(auth::AuthArgs),
    /// Catalog products
    Products(products::ProductArgs),
    /// Catalog categories
    Categories,
    /// Place, search, and update orders
    Orders(orders::OrderArgs),
    /// Account administration
    Users(users::UserArgs),
}

impl Cli {
    pub async fn execute(&self, client: &JewelboxClient) -> Result<(), AppError> {
        let format = self.format;
        match &self.command {
            Commands::Auth(args) => auth::execute(args, client, format).await,
            Commands::Products(args) => products::execute(args, client, format).await,
            Commands::Categories => categories::list(client, format).await,
            Commands::Orders(args) => orders::execute(args, client, format).await,
            Commands::Users(args) => users::execute(args, client, format).await,
        }
    }
}

/// An interactive prompt failed (closed stdin, no terminal).
pub(crate) fn input_error(e: dialoguer::Error) -> AppError {
    AppError::with_source(ErrorKind::Validation, "could not read input", e)
}
