//! Wire-level message types: transport frames and the identification message.

pub mod frame;
pub mod identification;

pub use frame::{InboundFrame, OutboundFrame};
pub use identification::Identification;
