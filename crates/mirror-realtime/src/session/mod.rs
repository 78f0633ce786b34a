//! Per-connection session lifecycle and supervision.

pub mod error;
pub mod handler;
pub mod state;
pub mod supervisor;

pub use error::ProtocolError;
pub use handler::{Session, SessionContext, SessionEnd, SessionReport};
pub use state::SessionState;
pub use supervisor::{SessionSnapshot, SessionSupervisor};
