//! Appointment lifecycle service.
//!
//! Implements [`AppointmentCommand`] over the driven ports. Every status
//! change goes through the entity's transition-checked `mark_as_*` methods,
//! and every write goes through the repository's atomic reserve/update so a
//! conflict is reported by storage rather than by a separate read.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::booking_service_support::{
    ensure_services_exist, ensure_user_exists, load_schedule_for, load_status,
    map_appointment_error,
};
use crate::domain::ports::{
    AppointmentActionRequest, AppointmentCommand, AppointmentRepository, AppointmentResponse,
    AppointmentStatusRepository, CancelAppointmentRequest, CreateAppointmentRequest,
    ReferenceDirectory, ScheduleRepository, StylistChange, UpdateAppointmentRequest,
};
use crate::domain::{
    Appointment, AppointmentDraft, AppointmentDuration, AppointmentId, AppointmentStatusName,
    AppointmentValidationError, BookingPolicy, Error, Schedule, UserId,
};

fn invalid(error: AppointmentValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

fn map_status_change(error: AppointmentValidationError) -> Error {
    match error {
        AppointmentValidationError::Transition(transition) => {
            Error::business_rule(transition.to_string()).with_details(json!({
                "from": transition.from,
                "to": transition.to,
            }))
        }
        other => Error::internal(format!("status record mismatch: {other}")),
    }
}

fn lead_error(action: &str, lead: chrono::TimeDelta) -> Error {
    Error::business_rule(format!(
        "appointments must be {action} at least {} minutes before they start",
        lead.num_minutes()
    ))
    .with_details(json!({ "requiredLeadMinutes": lead.num_minutes() }))
}

fn ensure_manager(appointment: &Appointment, requester: UserId, action: &str) -> Result<(), Error> {
    if appointment.is_managed_by(requester) {
        return Ok(());
    }
    Err(Error::business_rule(format!(
        "only the organizer or assigned stylist may {action} appointment {}",
        appointment.id()
    )))
}

fn ensure_participant(
    appointment: &Appointment,
    requester: UserId,
    action: &str,
) -> Result<(), Error> {
    if appointment.is_participant(requester) {
        return Ok(());
    }
    Err(Error::business_rule(format!(
        "only participants may {action} appointment {}",
        appointment.id()
    )))
}

fn ensure_not_past(
    appointment: &Appointment,
    now: DateTime<Utc>,
    action: &str,
) -> Result<(), Error> {
    if appointment.is_in_past(now) {
        return Err(Error::business_rule(format!(
            "cannot {action} appointment {} because it has already started",
            appointment.id()
        )));
    }
    Ok(())
}

/// Appointment service implementing the lifecycle driving port.
#[derive(Clone)]
pub struct AppointmentService<A, S, T, D> {
    appointments: Arc<A>,
    schedules: Arc<S>,
    statuses: Arc<T>,
    directory: Arc<D>,
    policy: BookingPolicy,
    clock: Arc<dyn Clock>,
}

impl<A, S, T, D> AppointmentService<A, S, T, D> {
    /// Create a service over the given ports.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use salon_backend::domain::{AppointmentService, BookingPolicy};
    /// # use salon_backend::outbound::memory::SalonStore;
    /// let store = Arc::new(SalonStore::default());
    /// let service = AppointmentService::new(
    ///     store.clone(),
    ///     store.clone(),
    ///     store.clone(),
    ///     store,
    ///     BookingPolicy::default(),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        appointments: Arc<A>,
        schedules: Arc<S>,
        statuses: Arc<T>,
        directory: Arc<D>,
        policy: BookingPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            schedules,
            statuses,
            directory,
            policy,
            clock,
        }
    }
}

impl<A, S, T, D> AppointmentService<A, S, T, D>
where
    A: AppointmentRepository,
    S: ScheduleRepository,
    T: AppointmentStatusRepository,
    D: ReferenceDirectory,
{
    async fn load_appointment(&self, appointment_id: AppointmentId) -> Result<Appointment, Error> {
        self.appointments
            .find_by_id(&appointment_id)
            .await
            .map_err(map_appointment_error)?
            .ok_or_else(|| Error::not_found(format!("appointment {appointment_id} not found")))
    }

    /// Schedule that admits `[start, start + duration]` on its salon-local
    /// date.
    async fn schedule_for_interval(
        &self,
        start: DateTime<Utc>,
        duration: AppointmentDuration,
    ) -> Result<Schedule, Error> {
        let local_start = self.policy.local_datetime(start);
        let local_end = self.policy.local_datetime(start + duration.as_delta());
        let date = local_start.date();
        let Some(schedule) = load_schedule_for(self.schedules.as_ref(), date).await? else {
            return Err(Error::business_rule(format!("the salon is closed on {date}"))
                .with_details(json!({ "date": date })));
        };
        if local_end.date() != date || !schedule.covers(local_start.time(), local_end.time()) {
            return Err(Error::business_rule(format!(
                "appointment must fall within working hours {} - {} on {date}",
                schedule.start_time(),
                schedule.end_time()
            ))
            .with_details(json!({
                "workingHours": { "start": schedule.start_time(), "end": schedule.end_time() },
            })));
        }
        Ok(schedule)
    }

    async fn persist(&self, appointment: &Appointment) -> Result<AppointmentResponse, Error> {
        self.appointments
            .update(appointment)
            .await
            .map_err(map_appointment_error)?;
        Ok(AppointmentResponse::from(appointment))
    }

    /// Save a status change; the interval was already held, so no conflict
    /// check runs.
    async fn persist_status(
        &self,
        appointment: &Appointment,
    ) -> Result<AppointmentResponse, Error> {
        self.appointments
            .update_status(appointment)
            .await
            .map_err(map_appointment_error)?;
        Ok(AppointmentResponse::from(appointment))
    }

    async fn apply_update(
        &self,
        appointment: &mut Appointment,
        request: &UpdateAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        if request.changes_interval() {
            let start = request.start_time.unwrap_or(appointment.start_time());
            appointment
                .reschedule(start, request.duration_minutes, now)
                .map_err(invalid)?;
            let schedule = self
                .schedule_for_interval(appointment.start_time(), appointment.duration())
                .await?;
            appointment.assign_schedule(schedule.id(), now);
        }

        match request.stylist {
            Some(StylistChange::Assign(stylist_id)) => {
                ensure_user_exists(self.directory.as_ref(), stylist_id, "stylist").await?;
                appointment.assign_stylist(Some(stylist_id), now);
            }
            Some(StylistChange::Unassign) => appointment.assign_stylist(None, now),
            None => {}
        }

        ensure_services_exist(self.directory.as_ref(), &request.add_service_ids).await?;
        for service_id in &request.add_service_ids {
            appointment.add_service(*service_id, now).map_err(invalid)?;
        }
        for service_id in &request.remove_service_ids {
            appointment
                .remove_service(*service_id, now)
                .map_err(invalid)?;
        }

        let needs_services = matches!(
            appointment.status(),
            AppointmentStatusName::Confirmed | AppointmentStatusName::InProgress
        );
        if needs_services && !appointment.has_services() {
            return Err(Error::business_rule(format!(
                "a {} appointment must keep at least one service",
                appointment.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<A, S, T, D> AppointmentCommand for AppointmentService<A, S, T, D>
where
    A: AppointmentRepository,
    S: ScheduleRepository,
    T: AppointmentStatusRepository,
    D: ReferenceDirectory,
{
    async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<AppointmentResponse, Error> {
        let now = self.clock.utc();
        let duration = AppointmentDuration::new(request.duration_minutes).map_err(invalid)?;
        if request.start_time <= now {
            return Err(invalid(AppointmentValidationError::StartNotInFuture));
        }

        let directory = self.directory.as_ref();
        ensure_user_exists(directory, request.organizer_id, "organizer").await?;
        ensure_user_exists(directory, request.client_id, "client").await?;
        if let Some(stylist_id) = request.stylist_id {
            ensure_user_exists(directory, stylist_id, "stylist").await?;
        }
        ensure_services_exist(directory, &request.service_ids).await?;

        let schedule = self
            .schedule_for_interval(request.start_time, duration)
            .await?;
        let status = load_status(self.statuses.as_ref(), AppointmentStatusName::INITIAL).await?;

        let appointment = Appointment::new(
            AppointmentDraft {
                id: AppointmentId::random(),
                start_time: request.start_time,
                duration_minutes: duration.minutes(),
                organizer_id: request.organizer_id,
                client_id: request.client_id,
                stylist_id: request.stylist_id,
                schedule_id: schedule.id(),
                status,
                service_ids: request.service_ids,
            },
            now,
        )
        .map_err(invalid)?;

        self.appointments
            .reserve(&appointment)
            .await
            .inspect_err(|err| debug!(error = %err, "appointment reservation refused"))
            .map_err(map_appointment_error)?;

        info!(
            appointment_id = %appointment.id(),
            start_time = %appointment.start_time(),
            duration_minutes = appointment.duration().minutes(),
            stylist_id = ?appointment.stylist_id(),
            "appointment created"
        );
        Ok(AppointmentResponse::from(&appointment))
    }

    async fn confirm_appointment(
        &self,
        request: AppointmentActionRequest,
    ) -> Result<AppointmentResponse, Error> {
        let now = self.clock.utc();
        let mut appointment = self.load_appointment(request.appointment_id).await?;

        let current = appointment.status();
        if current == AppointmentStatusName::Confirmed {
            return Err(Error::business_rule(format!(
                "appointment {} is already confirmed",
                appointment.id()
            )));
        }
        if current.is_terminal() {
            return Err(Error::business_rule(format!(
                "cannot confirm appointment {} because it is {current}",
                appointment.id()
            )));
        }
        ensure_not_past(&appointment, now, "confirm")?;
        ensure_manager(&appointment, request.requester_id, "confirm")?;
        if !appointment.has_lead_time(now, self.policy.confirm_lead()) {
            return Err(lead_error("confirmed", self.policy.confirm_lead()));
        }
        if !appointment.has_services() {
            return Err(Error::business_rule(format!(
                "appointment {} has no services to confirm",
                appointment.id()
            )));
        }

        let status = load_status(self.statuses.as_ref(), AppointmentStatusName::Confirmed).await?;
        appointment
            .mark_as_confirmed(&status, now)
            .map_err(map_status_change)?;
        let response = self.persist_status(&appointment).await?;
        info!(appointment_id = %appointment.id(), "appointment confirmed");
        Ok(response)
    }

    async fn cancel_appointment(
        &self,
        request: CancelAppointmentRequest,
    ) -> Result<AppointmentResponse, Error> {
        let now = self.clock.utc();
        let mut appointment = self.load_appointment(request.appointment_id).await?;

        let current = appointment.status();
        if current.is_terminal() {
            return Err(Error::business_rule(format!(
                "appointment {} is already {current}",
                appointment.id()
            )));
        }
        ensure_not_past(&appointment, now, "cancel")?;
        ensure_participant(&appointment, request.requester_id, "cancel")?;
        if !appointment.has_lead_time(now, self.policy.cancel_lead()) {
            return Err(lead_error("cancelled", self.policy.cancel_lead()));
        }

        let status = load_status(self.statuses.as_ref(), AppointmentStatusName::Cancelled).await?;
        appointment
            .mark_as_cancelled(&status, now)
            .map_err(map_status_change)?;
        let response = self.persist_status(&appointment).await?;
        info!(
            appointment_id = %appointment.id(),
            reason = request.reason.as_deref().unwrap_or("none given"),
            "appointment cancelled"
        );
        Ok(response)
    }

    async fn update_appointment(
        &self,
        request: UpdateAppointmentRequest,
    ) -> Result<AppointmentResponse, Error> {
        let now = self.clock.utc();
        let mut appointment = self.load_appointment(request.appointment_id).await?;

        if appointment.status().is_terminal() {
            return Err(Error::business_rule(format!(
                "appointment {} is {} and can no longer be changed",
                appointment.id(),
                appointment.status()
            )));
        }
        if !appointment.has_lead_time(now, self.policy.modify_lead()) {
            return Err(lead_error("changed", self.policy.modify_lead()));
        }
        ensure_participant(&appointment, request.requester_id, "change")?;

        self.apply_update(&mut appointment, &request, now).await?;
        let response = self.persist(&appointment).await?;
        info!(
            appointment_id = %appointment.id(),
            start_time = %appointment.start_time(),
            stylist_id = ?appointment.stylist_id(),
            "appointment updated"
        );
        Ok(response)
    }

    async fn start_appointment(
        &self,
        request: AppointmentActionRequest,
    ) -> Result<AppointmentResponse, Error> {
        let now = self.clock.utc();
        let mut appointment = self.load_appointment(request.appointment_id).await?;
        ensure_manager(&appointment, request.requester_id, "start")?;

        let status = load_status(self.statuses.as_ref(), AppointmentStatusName::InProgress).await?;
        appointment
            .mark_as_in_progress(&status, now)
            .map_err(map_status_change)?;
        let response = self.persist_status(&appointment).await?;
        info!(appointment_id = %appointment.id(), "appointment started");
        Ok(response)
    }

    async fn complete_appointment(
        &self,
        request: AppointmentActionRequest,
    ) -> Result<AppointmentResponse, Error> {
        let now = self.clock.utc();
        let mut appointment = self.load_appointment(request.appointment_id).await?;
        ensure_manager(&appointment, request.requester_id, "complete")?;

        let status = load_status(self.statuses.as_ref(), AppointmentStatusName::Completed).await?;
        appointment
            .mark_as_completed(&status, now)
            .map_err(map_status_change)?;
        let response = self.persist_status(&appointment).await?;
        info!(appointment_id = %appointment.id(), "appointment completed");
        Ok(response)
    }

    async fn mark_no_show(
        &self,
        request: AppointmentActionRequest,
    ) -> Result<AppointmentResponse, Error> {
        let now = self.clock.utc();
        let mut appointment = self.load_appointment(request.appointment_id).await?;
        ensure_manager(&appointment, request.requester_id, "mark a no-show for")?;
        if now < appointment.start_time() {
            return Err(Error::business_rule(format!(
                "appointment {} has not started yet",
                appointment.id()
            )));
        }

        let status = load_status(self.statuses.as_ref(), AppointmentStatusName::NoShow).await?;
        appointment
            .mark_as_no_show(&status, now)
            .map_err(map_status_change)?;
        let response = self.persist_status(&appointment).await?;
        info!(appointment_id = %appointment.id(), "appointment marked as no-show");
        Ok(response)
    }
}

#[cfg(test)]
#[path = "appointment_service_tests.rs"]
mod tests;
