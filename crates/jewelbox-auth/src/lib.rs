//! # jewelbox-auth
//!
//! Client-side session token lifecycle for Jewelbox.
//!
//! ## Modules
//!
//! - `session`: the token manager (current pair, write-through
//!   persistence, change subscriptions, single-flight refresh)
//! - `store`: persistence adapters (file, memory)
//! - `clock`: time source used for expiry decisions
//! - `error`: the classified session error

pub mod clock;
pub mod error;
pub mod session;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SessionError;
pub use session::{Durability, RefreshClient, TokenManager, TokenState, TokenSubscription};
pub use store::{FileTokenStore, MemoryTokenStore};
