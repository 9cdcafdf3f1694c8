//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for bookings and flight configuration.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories store already-validated values; validation lives in the
//!   model and service layers.
//! - Repository APIs return semantic errors (`DuplicateEmail`) in addition
//!   to DB transport errors.

pub mod booking_repo;
pub mod flight_config_repo;
