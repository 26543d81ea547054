//! Outbound adapters implementing domain ports.
//!
//! Adapters are thin translators between domain types and their storage
//! representation. They contain no business rules beyond the atomic
//! reserve-or-fail write the appointment port requires.

pub mod memory;
