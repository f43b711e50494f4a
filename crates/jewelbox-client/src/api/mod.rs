//! Typed backend endpoints.

pub mod auth;
pub mod catalog;
pub mod orders;
pub mod users;

pub use auth::{
    AccountApi, AuthApi, ChangePasswordRequest, ChangePhoneRequest, SignInRequest, SignUpRequest,
};
pub use catalog::CatalogApi;
pub use orders::OrdersApi;
pub use users::UsersApi;
