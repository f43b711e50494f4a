//! Session token lifecycle: current pair, persistence, subscriptions,
//! and refresh.

pub mod manager;
pub mod refresher;
pub mod subscription;

pub use manager::{Durability, TokenManager};
pub use refresher::RefreshClient;
pub use subscription::{TokenState, TokenSubscription};
