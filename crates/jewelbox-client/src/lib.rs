//! # jewelbox-client
//!
//! HTTP client for the Jewelbox catalog backend.
//!
//! Credential endpoints (sign-in, sign-up, refresh) are called without a
//! bearer token. Every other endpoint goes through
//! [`AuthorizedClient`](http::AuthorizedClient), which refreshes a stale
//! access token before sending and retries once after a 401.

pub mod api;
pub mod client;
pub mod error;
pub mod http;

pub use client::JewelboxClient;
pub use error::ApiError;
