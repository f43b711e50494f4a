//! Core type definitions used across the Jewelbox workspace.

pub mod catalog;
pub mod order;
pub mod pagination;
pub mod token;
pub mod user;

pub use catalog::{Category, Product};
pub use order::{NewOrder, Order, OrderSearch, OrderStatus};
pub use pagination::{PageRequest, PageResponse};
pub use token::{IssuedTokens, TokenPair};
pub use user::{User, UserRole};
