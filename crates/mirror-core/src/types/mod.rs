//! Shared identity types used across all mirror crates.

pub mod id;
pub mod mode;

pub use id::{ClientId, ConnectionId};
pub use mode::Mode;
