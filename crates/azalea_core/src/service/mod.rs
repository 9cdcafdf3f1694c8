//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into booking and configuration use-cases.
//! - Derive read models (boarding pass, summary, manifest) from stored
//!   bookings without touching storage.

pub mod boarding_pass;
pub mod booking_service;
pub mod flight_config_service;
pub mod manifest;
pub mod summary;
