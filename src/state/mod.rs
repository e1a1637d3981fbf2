//! State management module.
//!
//! Contains the connection lifecycle types and the per-session user store.

mod machine;
mod users;

pub use machine::{ConnectionState, RetryBudget};
pub use users::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_COLOR, UserRecord, UserStore};
