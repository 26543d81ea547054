//! Salon booking library.
//!
//! - [`domain`] holds the booking aggregates, the pure availability
//!   calculator, and the lifecycle services behind their ports.
//! - [`outbound`] provides the in-memory adapters for those ports.
//! - [`config`] loads booking rules via OrthoConfig.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
