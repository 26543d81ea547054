//! Appointment entity.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::time_window::overlaps;
use crate::domain::{
    AppointmentId, AppointmentStatus, AppointmentStatusName, ScheduleId, ServiceId, StatusId,
    StatusTransitionError, UserId,
};

use super::{AppointmentDuration, AppointmentValidationError, DEFAULT_MODIFY_LEAD_MINUTES};

/// Input payload for [`Appointment::new`].
#[derive(Debug, Clone)]
pub struct AppointmentDraft {
    pub id: AppointmentId,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub organizer_id: UserId,
    pub client_id: UserId,
    pub stylist_id: Option<UserId>,
    pub schedule_id: ScheduleId,
    pub status: AppointmentStatus,
    pub service_ids: Vec<ServiceId>,
}

/// Persisted form used to rebuild an appointment from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSnapshot {
    pub id: AppointmentId,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub organizer_id: UserId,
    pub client_id: UserId,
    #[serde(default)]
    pub stylist_id: Option<UserId>,
    pub schedule_id: ScheduleId,
    pub status_id: StatusId,
    pub status: AppointmentStatusName,
    #[serde(default)]
    pub service_ids: Vec<ServiceId>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A booked appointment.
///
/// Occupies the half-open interval `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub(super) id: AppointmentId,
    pub(super) start_time: DateTime<Utc>,
    pub(super) duration: AppointmentDuration,
    pub(super) organizer_id: UserId,
    pub(super) client_id: UserId,
    pub(super) stylist_id: Option<UserId>,
    pub(super) schedule_id: ScheduleId,
    pub(super) status_id: StatusId,
    pub(super) status: AppointmentStatusName,
    pub(super) service_ids: BTreeSet<ServiceId>,
    pub(super) confirmed_at: Option<DateTime<Utc>>,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Create a new appointment in the initial status.
    ///
    /// Fails when `start_time` is not strictly after `now`, the duration
    /// breaks its invariants, a participant id is nil, or the services
    /// contain duplicates.
    pub fn new(
        draft: AppointmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, AppointmentValidationError> {
        if draft.start_time <= now {
            return Err(AppointmentValidationError::StartNotInFuture);
        }
        if draft.status.name() != AppointmentStatusName::INITIAL {
            return Err(AppointmentValidationError::NotInitialStatus {
                status: draft.status.name(),
            });
        }
        let snapshot = AppointmentSnapshot {
            id: draft.id,
            start_time: draft.start_time,
            duration_minutes: draft.duration_minutes,
            organizer_id: draft.organizer_id,
            client_id: draft.client_id,
            stylist_id: draft.stylist_id,
            schedule_id: draft.schedule_id,
            status_id: draft.status.id(),
            status: draft.status.name(),
            service_ids: draft.service_ids,
            confirmed_at: None,
            created_at: now,
            updated_at: now,
        };
        Self::try_from(snapshot)
    }

    /// Rebuild a stored appointment.
    ///
    /// Structural invariants are re-checked. The future-start rule is not,
    /// since it only applies when an appointment is first created.
    pub fn from_snapshot(
        snapshot: AppointmentSnapshot,
    ) -> Result<Self, AppointmentValidationError> {
        Self::try_from(snapshot)
    }

    /// Persisted form of this appointment.
    pub fn to_snapshot(&self) -> AppointmentSnapshot {
        AppointmentSnapshot {
            id: self.id,
            start_time: self.start_time,
            duration_minutes: self.duration.minutes(),
            organizer_id: self.organizer_id,
            client_id: self.client_id,
            stylist_id: self.stylist_id,
            schedule_id: self.schedule_id,
            status_id: self.status_id,
            status: self.status,
            service_ids: self.service_ids.iter().copied().collect(),
            confirmed_at: self.confirmed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> AppointmentId {
        self.id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn duration(&self) -> AppointmentDuration {
        self.duration
    }

    /// Exclusive end of the appointment interval.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + self.duration.as_delta()
    }

    pub fn organizer_id(&self) -> UserId {
        self.organizer_id
    }

    pub fn client_id(&self) -> UserId {
        self.client_id
    }

    /// Assigned stylist; `None` means unassigned.
    pub fn stylist_id(&self) -> Option<UserId> {
        self.stylist_id
    }

    pub fn schedule_id(&self) -> ScheduleId {
        self.schedule_id
    }

    pub fn status_id(&self) -> StatusId {
        self.status_id
    }

    pub fn status(&self) -> AppointmentStatusName {
        self.status
    }

    /// Booked services in id order.
    pub fn service_ids(&self) -> impl Iterator<Item = ServiceId> + '_ {
        self.service_ids.iter().copied()
    }

    pub fn has_services(&self) -> bool {
        !self.service_ids.is_empty()
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether `user_id` is the organizer or the assigned stylist.
    pub fn is_managed_by(&self, user_id: UserId) -> bool {
        self.organizer_id == user_id || self.stylist_id == Some(user_id)
    }

    /// Whether `user_id` takes part in the appointment in any role.
    pub fn is_participant(&self, user_id: UserId) -> bool {
        self.is_managed_by(user_id) || self.client_id == user_id
    }

    /// Half-open overlap test against another appointment's interval.
    ///
    /// Appointments that only touch at a boundary do not conflict.
    pub fn has_conflict_with(&self, other: &Self) -> bool {
        self.overlaps_interval(other.start_time, other.end_time())
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps_interval(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        overlaps(self.start_time, self.end_time(), start, end)
    }

    /// Whether this appointment occupies its slot.
    ///
    /// Terminal appointments free their interval.
    pub fn blocks_calendar(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Whether this booking makes `[start, end)` unavailable to a booking
    /// held by `stylist_id`.
    ///
    /// Two bookings compete when either lacks a stylist or both name the
    /// same one, so the outcome never depends on booking order.
    pub fn blocks_interval(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        stylist_id: Option<UserId>,
    ) -> bool {
        let shares_stylist = match (self.stylist_id, stylist_id) {
            (Some(held), Some(requested)) => held == requested,
            _ => true,
        };
        self.blocks_calendar() && shares_stylist && self.overlaps_interval(start, end)
    }

    /// Whether `other` holds the same interval and stylist as this booking.
    pub fn same_slot_as(&self, other: &Self) -> bool {
        self.start_time == other.start_time
            && self.duration == other.duration
            && self.stylist_id == other.stylist_id
    }

    /// Time remaining until the appointment starts; negative once started.
    pub fn time_until_start(&self, now: DateTime<Utc>) -> TimeDelta {
        self.start_time - now
    }

    /// Whether at least `lead` remains before the start.
    pub fn has_lead_time(&self, now: DateTime<Utc>, lead: TimeDelta) -> bool {
        self.time_until_start(now) >= lead
    }

    /// Whether the appointment starts at least 24 hours after `now`.
    pub fn can_be_modified(&self, now: DateTime<Utc>) -> bool {
        self.has_lead_time(now, TimeDelta::minutes(DEFAULT_MODIFY_LEAD_MINUTES))
    }

    pub fn is_in_past(&self, now: DateTime<Utc>) -> bool {
        self.start_time < now
    }

    /// Move the appointment, optionally changing its length.
    ///
    /// Conflicts and working hours are checked by the caller.
    pub fn reschedule(
        &mut self,
        new_start_time: DateTime<Utc>,
        new_duration_minutes: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentValidationError> {
        if new_start_time < now {
            return Err(AppointmentValidationError::StartNotInFuture);
        }
        let duration = match new_duration_minutes {
            Some(minutes) => AppointmentDuration::new(minutes)?,
            None => self.duration,
        };
        self.start_time = new_start_time;
        self.duration = duration;
        self.updated_at = now;
        Ok(())
    }

    /// Point the appointment at the schedule that now governs its date.
    pub fn assign_schedule(&mut self, schedule_id: ScheduleId, now: DateTime<Utc>) {
        self.schedule_id = schedule_id;
        self.updated_at = now;
    }

    /// Assign or clear the stylist.
    pub fn assign_stylist(&mut self, stylist_id: Option<UserId>, now: DateTime<Utc>) {
        self.stylist_id = stylist_id;
        self.updated_at = now;
    }

    pub fn add_service(
        &mut self,
        service_id: ServiceId,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentValidationError> {
        if service_id.as_uuid().is_nil() {
            return Err(AppointmentValidationError::EmptyServiceId);
        }
        if !self.service_ids.insert(service_id) {
            return Err(AppointmentValidationError::DuplicateService { service_id });
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn remove_service(
        &mut self,
        service_id: ServiceId,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentValidationError> {
        if service_id.as_uuid().is_nil() {
            return Err(AppointmentValidationError::EmptyServiceId);
        }
        if !self.service_ids.remove(&service_id) {
            return Err(AppointmentValidationError::ServiceNotPresent { service_id });
        }
        self.updated_at = now;
        Ok(())
    }

    /// Move to `target` if the transition table allows it.
    pub fn transition_to(
        &mut self,
        target: &AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), StatusTransitionError> {
        self.status.ensure_transition(target.name())?;
        self.change_status(target, now);
        Ok(())
    }

    pub fn mark_as_confirmed(
        &mut self,
        status: &AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentValidationError> {
        self.mark_as(AppointmentStatusName::Confirmed, status, now)
    }

    pub fn mark_as_in_progress(
        &mut self,
        status: &AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentValidationError> {
        self.mark_as(AppointmentStatusName::InProgress, status, now)
    }

    pub fn mark_as_completed(
        &mut self,
        status: &AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentValidationError> {
        self.mark_as(AppointmentStatusName::Completed, status, now)
    }

    pub fn mark_as_cancelled(
        &mut self,
        status: &AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentValidationError> {
        self.mark_as(AppointmentStatusName::Cancelled, status, now)
    }

    pub fn mark_as_no_show(
        &mut self,
        status: &AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentValidationError> {
        self.mark_as(AppointmentStatusName::NoShow, status, now)
    }

    fn mark_as(
        &mut self,
        expected: AppointmentStatusName,
        status: &AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), AppointmentValidationError> {
        if status.name() != expected {
            return Err(AppointmentValidationError::StatusMismatch {
                expected,
                actual: status.name(),
            });
        }
        self.transition_to(status, now)?;
        Ok(())
    }

    // Only reachable through `transition_to`.
    fn change_status(&mut self, status: &AppointmentStatus, now: DateTime<Utc>) {
        self.status_id = status.id();
        self.status = status.name();
        if status.name() == AppointmentStatusName::Confirmed && self.confirmed_at.is_none() {
            self.confirmed_at = Some(now);
        }
        self.updated_at = now;
    }
}
