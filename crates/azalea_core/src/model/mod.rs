//! Booking domain model.
//!
//! # Responsibility
//! - Define the persisted booking record and its meal codes.
//! - Define the flight configuration every booking is stamped from.
//!
//! # Invariants
//! - One booking per normalized email.
//! - Bookings are append-only; nothing in the model mutates a stored record.

pub mod booking;
pub mod flight;
pub mod meal;
