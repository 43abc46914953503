//! # seatlock-core
//!
//! Core crate for the seat-lock service. Contains the seat-lock data
//! model, typed identifiers, the lock table / clock / announcer traits,
//! configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other seatlock crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
