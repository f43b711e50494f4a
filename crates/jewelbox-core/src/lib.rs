//! Shared building blocks for Jewelbox.
//!
//! - [`error`]: `AppError`, the error every command reports
//! - [`config`]: layered settings for the API, session, and logging
//! - [`types`]: token pair plus catalog, order, and user wire types
//! - [`traits`]: `TokenPersistence`, implemented by the session stores
//!
//! Nothing here depends on the other workspace crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
