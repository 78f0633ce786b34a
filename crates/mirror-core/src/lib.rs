//! # mirror-core
//!
//! Core crate for the mirror relay. Contains configuration schemas,
//! the client identity types (`Mode`, `ClientId`, `ConnectionId`),
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other mirror crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
pub use types::{ClientId, ConnectionId, Mode};
