//! In-memory adapters for the booking ports.
//!
//! [`SalonStore`] backs the availability CLI and the behaviour tests;
//! [`SalonFixture`] seeds it from a JSON file.

mod fixture;
mod store;

pub use fixture::{SalonFixture, SalonFixtureError, StatusSeed};
pub use store::SalonStore;
