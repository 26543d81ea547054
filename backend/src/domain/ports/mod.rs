//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, directories) describe what the booking core
//! needs from storage. Driving ports (commands, queries) are what a
//! transport calls.

mod macros;
pub(crate) use macros::define_port_error;

mod appointment_command;
mod appointment_repository;
mod appointment_status_repository;
mod availability_query;
mod reference_directory;
mod schedule_repository;

#[cfg(test)]
pub use appointment_command::MockAppointmentCommand;
pub use appointment_command::{
    AppointmentActionRequest, AppointmentCommand, AppointmentPayload, AppointmentResponse,
    CancelAppointmentRequest, CreateAppointmentRequest, StylistChange, UpdateAppointmentRequest,
};
#[cfg(test)]
pub use appointment_repository::MockAppointmentRepository;
pub use appointment_repository::{
    AppointmentRepository, AppointmentRepositoryError, FixtureAppointmentRepository,
};
#[cfg(test)]
pub use appointment_status_repository::MockAppointmentStatusRepository;
pub use appointment_status_repository::{
    AppointmentStatusRepository, AppointmentStatusRepositoryError,
};
#[cfg(test)]
pub use availability_query::MockAvailabilityQuery;
pub use availability_query::{AvailabilityQuery, AvailabilityRequest};
#[cfg(test)]
pub use reference_directory::MockReferenceDirectory;
pub use reference_directory::{
    FixtureReferenceDirectory, ReferenceDirectory, ReferenceDirectoryError,
};
#[cfg(test)]
pub use schedule_repository::MockScheduleRepository;
pub use schedule_repository::{
    FixtureScheduleRepository, ScheduleRepository, ScheduleRepositoryError,
};
