//! Port for seeded appointment status records.

use async_trait::async_trait;

use crate::domain::{AppointmentStatus, AppointmentStatusName, StatusId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by status repository adapters.
    pub enum AppointmentStatusRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "appointment status repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "appointment status repository query failed: {message}",
    }
}

/// Port for reading status records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentStatusRepository: Send + Sync {
    async fn find_by_name(
        &self,
        name: AppointmentStatusName,
    ) -> Result<Option<AppointmentStatus>, AppointmentStatusRepositoryError>;

    async fn find_by_id(
        &self,
        status_id: &StatusId,
    ) -> Result<Option<AppointmentStatus>, AppointmentStatusRepositoryError>;
}
