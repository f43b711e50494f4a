//! HTTP transport and the authorized request pipeline.

pub mod authorized;
pub mod transport;

pub use authorized::AuthorizedClient;
pub use transport::HttpTransport;
