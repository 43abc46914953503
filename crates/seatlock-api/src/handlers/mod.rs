//! Route handlers.

pub mod health;
pub mod locks;
pub mod ws;
