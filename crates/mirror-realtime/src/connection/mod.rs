//! Connection handles and the per-mode registry.

pub mod handle;
pub mod registry;

pub use handle::{ConnectionHandle, ConnectionInfo, DeliveryError};
pub use registry::{ConnectionRegistry, RegistryEntry};
