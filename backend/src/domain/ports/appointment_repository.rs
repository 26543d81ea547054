//! Port for appointment persistence with reserve-or-fail writes.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::domain::{Appointment, AppointmentDuration, AppointmentId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by appointment repository adapters.
    pub enum AppointmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "appointment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "appointment repository query failed: {message}",
        /// The interval is already held by another active booking.
        SlotTaken { conflicting_id: AppointmentId } =>
            "requested interval overlaps appointment {conflicting_id}",
        /// The appointment to update does not exist.
        Missing { appointment_id: AppointmentId } =>
            "appointment {appointment_id} does not exist",
    }
}

/// Port for reading and writing appointments.
///
/// `reserve` and `update` must run their conflict check and write as one
/// atomic step so two callers can never both hold an overlapping interval.
/// The conflict scope is [`Appointment::blocks_interval`] evaluated with the
/// written appointment's stylist. Status changes go through
/// `update_status`, which leaves the interval alone and so never conflicts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Find an appointment by id.
    async fn find_by_id(
        &self,
        appointment_id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError>;

    /// Appointments starting on `date` in the salon's wall clock.
    async fn find_by_date(
        &self,
        date: NaiveDate,
        utc_offset: FixedOffset,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError>;

    /// Active appointments overlapping `[start_time, start_time + duration)`.
    async fn find_conflicting(
        &self,
        start_time: DateTime<Utc>,
        duration: AppointmentDuration,
        stylist_id: Option<UserId>,
        exclude_id: Option<AppointmentId>,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError>;

    /// Insert a new appointment unless its interval is taken.
    async fn reserve(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError>;

    /// Replace a stored appointment, re-checking its interval against others.
    async fn update(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError>;

    /// Persist a status change without a conflict check.
    ///
    /// Adapters reject the write when the start, duration or stylist differ
    /// from the stored record.
    async fn update_status(
        &self,
        appointment: &Appointment,
    ) -> Result<(), AppointmentRepositoryError>;

    /// Remove an appointment; returns whether it existed.
    async fn delete(
        &self,
        appointment_id: &AppointmentId,
    ) -> Result<bool, AppointmentRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAppointmentRepository;

#[async_trait]
impl AppointmentRepository for FixtureAppointmentRepository {
    async fn find_by_id(
        &self,
        _appointment_id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        Ok(None)
    }

    async fn find_by_date(
        &self,
        _date: NaiveDate,
        _utc_offset: FixedOffset,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_conflicting(
        &self,
        _start_time: DateTime<Utc>,
        _duration: AppointmentDuration,
        _stylist_id: Option<UserId>,
        _exclude_id: Option<AppointmentId>,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        Ok(Vec::new())
    }

    async fn reserve(&self, _appointment: &Appointment) -> Result<(), AppointmentRepositoryError> {
        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError> {
        Err(AppointmentRepositoryError::missing(appointment.id()))
    }

    async fn update_status(
        &self,
        appointment: &Appointment,
    ) -> Result<(), AppointmentRepositoryError> {
        Err(AppointmentRepositoryError::missing(appointment.id()))
    }

    async fn delete(
        &self,
        _appointment_id: &AppointmentId,
    ) -> Result<bool, AppointmentRepositoryError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_find_returns_none() {
        let repo = FixtureAppointmentRepository;
        let found = repo
            .find_by_id(&AppointmentId::random())
            .await
            .expect("fixture lookup succeeds");
        assert!(found.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_conflict_lookup_is_empty() {
        let repo = FixtureAppointmentRepository;
        let duration = AppointmentDuration::new(30).expect("valid duration");
        let found = repo
            .find_conflicting(Utc::now(), duration, None, None)
            .await
            .expect("fixture lookup succeeds");
        assert!(found.is_empty());
    }

    #[rstest]
    fn slot_taken_names_the_conflicting_booking() {
        let id = AppointmentId::random();
        let err = AppointmentRepositoryError::slot_taken(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[rstest]
    fn query_error_formats_message() {
        let err = AppointmentRepositoryError::query("broken sql");
        assert!(err.to_string().contains("broken sql"));
    }
}
