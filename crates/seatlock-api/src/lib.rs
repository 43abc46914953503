//! # seatlock-api
//!
//! HTTP layer for the seat-lock service built on Axum.
//!
//! Provides the WebSocket upgrade, health endpoints, the lock snapshot
//! endpoint for polling clients, CORS, and error mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
