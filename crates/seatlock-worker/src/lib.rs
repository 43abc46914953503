//! Background tasks for the seat-lock service.
//!
//! This crate provides:
//! - [`ExpirySweeper`]: one sweep pass that reclaims expired seat locks
//!   and announces each release to its showtime room
//! - [`SweepScheduler`]: runs the sweeper on a fixed period, started and
//!   stopped with the server

pub mod scheduler;
pub mod sweeper;

pub use scheduler::SweepScheduler;
pub use sweeper::{ExpirySweeper, SweepReport};
