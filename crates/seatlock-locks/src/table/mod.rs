//! Lock table implementations.
//!
//! Only the in-memory table ships today; the coordinator depends on the
//! `LockTable` trait so a shared store can replace it for multi-instance
//! deployments.

pub mod memory;

pub use memory::MemoryLockTable;
