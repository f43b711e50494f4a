//! Trait definitions implemented by other Jewelbox crates.

pub mod token_store;

pub use token_store::{TokenPersistence, TokenStream};
