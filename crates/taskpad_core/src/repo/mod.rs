//! Persistence layer abstractions and SQLite implementation.
//!
//! # Responsibility
//! - Define the durable key-value slot contract the store writes through.
//! - Isolate SQL details from store/business orchestration.
//!
//! # Invariants
//! - Slot writes replace the whole value; no partial updates exist.
//! - Repository construction fails on connections without migrated schema.

pub mod slot_repo;
