//! Message mirroring between web and desktop peers.

pub mod router;

pub use router::{RelayOutcome, RelayRouter};
