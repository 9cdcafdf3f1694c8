//! Request handlers grouped by resource.

pub mod boarding_pass;
pub mod flight;
pub mod health;
pub mod rsvp;
