//! Per-connection session state machine.

pub mod adapter;
pub mod event;

pub use adapter::{SessionAdapter, SessionState};
pub use event::SessionEvent;
