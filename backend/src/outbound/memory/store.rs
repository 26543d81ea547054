//! Process-local store implementing every booking driven port.
//!
//! All state sits behind one mutex, so `reserve` and `update` perform their
//! conflict check and write under the same lock and can never interleave.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::debug;

use crate::domain::ports::{
    AppointmentRepository, AppointmentRepositoryError, AppointmentStatusRepository,
    AppointmentStatusRepositoryError, ReferenceDirectory, ReferenceDirectoryError,
    ScheduleRepository, ScheduleRepositoryError,
};
use crate::domain::{
    Appointment, AppointmentDuration, AppointmentId, AppointmentStatus, AppointmentStatusName,
    DayOfWeek, Holiday, Schedule, ServiceId, StatusId, UserId,
};

#[derive(Debug, Default)]
struct SalonState {
    schedules: Vec<Schedule>,
    holidays: Vec<Holiday>,
    statuses: Vec<AppointmentStatus>,
    users: HashSet<UserId>,
    services: HashSet<ServiceId>,
    appointments: BTreeMap<AppointmentId, Appointment>,
}

impl SalonState {
    fn conflicts<'a>(
        &'a self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        stylist_id: Option<UserId>,
        exclude_id: Option<AppointmentId>,
    ) -> impl Iterator<Item = &'a Appointment> + 'a {
        self.appointments.values().filter(move |existing| {
            Some(existing.id()) != exclude_id && existing.blocks_interval(start, end, stylist_id)
        })
    }

    fn first_conflict(&self, appointment: &Appointment) -> Option<AppointmentId> {
        if !appointment.blocks_calendar() {
            return None;
        }
        self.conflicts(
            appointment.start_time(),
            appointment.end_time(),
            appointment.stylist_id(),
            Some(appointment.id()),
        )
        .map(Appointment::id)
        .next()
    }
}

/// In-memory salon data used by the CLI and the behaviour tests.
#[derive(Debug, Default)]
pub struct SalonStore {
    state: Mutex<SalonState>,
}

impl SalonStore {
    /// Empty store seeded with one record per appointment status.
    pub fn with_default_statuses() -> Self {
        let store = Self::default();
        for status in AppointmentStatus::seed_defaults() {
            store.add_status(status);
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, SalonState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_schedule(&self, schedule: Schedule) {
        self.lock().schedules.push(schedule);
    }

    pub fn add_holiday(&self, holiday: Holiday) {
        self.lock().holidays.push(holiday);
    }

    /// Add a status record, replacing any record with the same name.
    pub fn add_status(&self, status: AppointmentStatus) {
        let mut state = self.lock();
        state.statuses.retain(|known| known.name() != status.name());
        state.statuses.push(status);
    }

    pub fn add_user(&self, user_id: UserId) {
        self.lock().users.insert(user_id);
    }

    pub fn add_service(&self, service_id: ServiceId) {
        self.lock().services.insert(service_id);
    }

    /// Seed an appointment without the conflict check applied by `reserve`.
    pub fn add_appointment(&self, appointment: Appointment) {
        self.lock()
            .appointments
            .insert(appointment.id(), appointment);
    }

    pub fn appointment_count(&self) -> usize {
        self.lock().appointments.len()
    }
}

#[async_trait]
impl AppointmentRepository for SalonStore {
    async fn find_by_id(
        &self,
        appointment_id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        Ok(self.lock().appointments.get(appointment_id).cloned())
    }

    async fn find_by_date(
        &self,
        date: NaiveDate,
        utc_offset: FixedOffset,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let state = self.lock();
        let mut found: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|appointment| {
                appointment
                    .start_time()
                    .with_timezone(&utc_offset)
                    .date_naive()
                    == date
            })
            .cloned()
            .collect();
        found.sort_by_key(Appointment::start_time);
        Ok(found)
    }

    async fn find_conflicting(
        &self,
        start_time: DateTime<Utc>,
        duration: AppointmentDuration,
        stylist_id: Option<UserId>,
        exclude_id: Option<AppointmentId>,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let end_time = start_time + duration.as_delta();
        Ok(self
            .lock()
            .conflicts(start_time, end_time, stylist_id, exclude_id)
            .cloned()
            .collect())
    }

    async fn reserve(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError> {
        let mut state = self.lock();
        if state.appointments.contains_key(&appointment.id()) {
            return Err(AppointmentRepositoryError::query(format!(
                "appointment {} already exists",
                appointment.id()
            )));
        }
        if let Some(conflicting_id) = state.first_conflict(appointment) {
            debug!(
                appointment_id = %appointment.id(),
                %conflicting_id,
                "reservation overlaps an active booking"
            );
            return Err(AppointmentRepositoryError::slot_taken(conflicting_id));
        }
        state
            .appointments
            .insert(appointment.id(), appointment.clone());
        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError> {
        let mut state = self.lock();
        if !state.appointments.contains_key(&appointment.id()) {
            return Err(AppointmentRepositoryError::missing(appointment.id()));
        }
        if let Some(conflicting_id) = state.first_conflict(appointment) {
            return Err(AppointmentRepositoryError::slot_taken(conflicting_id));
        }
        state
            .appointments
            .insert(appointment.id(), appointment.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        appointment: &Appointment,
    ) -> Result<(), AppointmentRepositoryError> {
        let mut state = self.lock();
        let Some(stored) = state.appointments.get_mut(&appointment.id()) else {
            return Err(AppointmentRepositoryError::missing(appointment.id()));
        };
        if !stored.same_slot_as(appointment) {
            return Err(AppointmentRepositoryError::query(format!(
                "status write for appointment {} changes its interval or stylist",
                appointment.id()
            )));
        }
        *stored = appointment.clone();
        Ok(())
    }

    async fn delete(
        &self,
        appointment_id: &AppointmentId,
    ) -> Result<bool, AppointmentRepositoryError> {
        Ok(self.lock().appointments.remove(appointment_id).is_some())
    }
}

#[async_trait]
impl ScheduleRepository for SalonStore {
    async fn find_by_day_of_week(
        &self,
        day: DayOfWeek,
    ) -> Result<Vec<Schedule>, ScheduleRepositoryError> {
        Ok(self
            .lock()
            .schedules
            .iter()
            .filter(|schedule| schedule.day_of_week() == day)
            .cloned()
            .collect())
    }

    async fn find_holiday_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<Holiday>, ScheduleRepositoryError> {
        Ok(self
            .lock()
            .holidays
            .iter()
            .find(|holiday| holiday.date == date)
            .cloned())
    }
}

#[async_trait]
impl AppointmentStatusRepository for SalonStore {
    async fn find_by_name(
        &self,
        name: AppointmentStatusName,
    ) -> Result<Option<AppointmentStatus>, AppointmentStatusRepositoryError> {
        Ok(self
            .lock()
            .statuses
            .iter()
            .find(|status| status.name() == name)
            .cloned())
    }

    async fn find_by_id(
        &self,
        status_id: &StatusId,
    ) -> Result<Option<AppointmentStatus>, AppointmentStatusRepositoryError> {
        Ok(self
            .lock()
            .statuses
            .iter()
            .find(|status| status.id() == *status_id)
            .cloned())
    }
}

#[async_trait]
impl ReferenceDirectory for SalonStore {
    async fn user_exists(&self, user_id: &UserId) -> Result<bool, ReferenceDirectoryError> {
        Ok(self.lock().users.contains(user_id))
    }

    async fn service_exists(
        &self,
        service_id: &ServiceId,
    ) -> Result<bool, ReferenceDirectoryError> {
        Ok(self.lock().services.contains(service_id))
    }
}
