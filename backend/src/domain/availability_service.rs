//! Availability query service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::booking_service_support::{
    ensure_services_exist, ensure_user_exists, load_schedule_for, map_appointment_error,
};
use crate::domain::ports::{
    AppointmentRepository, AvailabilityQuery, AvailabilityRequest, ReferenceDirectory,
    ScheduleRepository,
};
use crate::domain::{
    AppointmentDuration, AvailabilityCalculator, AvailabilityReport, BookingPolicy, Error,
    SlotQuery,
};

/// Availability service implementing the query driving port.
#[derive(Clone)]
pub struct AvailabilityService<A, S, D> {
    appointments: Arc<A>,
    schedules: Arc<S>,
    directory: Arc<D>,
    policy: BookingPolicy,
}

impl<A, S, D> AvailabilityService<A, S, D> {
    /// Create a new query service.
    pub fn new(
        appointments: Arc<A>,
        schedules: Arc<S>,
        directory: Arc<D>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            appointments,
            schedules,
            directory,
            policy,
        }
    }
}

#[async_trait]
impl<A, S, D> AvailabilityQuery for AvailabilityService<A, S, D>
where
    A: AppointmentRepository,
    S: ScheduleRepository,
    D: ReferenceDirectory,
{
    async fn get_available_slots(
        &self,
        request: AvailabilityRequest,
    ) -> Result<AvailabilityReport, Error> {
        let slot_minutes = match request.duration_minutes {
            Some(minutes) => AppointmentDuration::new(minutes)
                .map_err(|err| Error::invalid_request(err.to_string()))?
                .minutes(),
            None => self.policy.default_slot_minutes(),
        };
        if let Some(stylist_id) = request.stylist_id {
            ensure_user_exists(self.directory.as_ref(), stylist_id, "stylist").await?;
        }
        ensure_services_exist(self.directory.as_ref(), &request.service_ids).await?;

        let schedule = load_schedule_for(self.schedules.as_ref(), request.date).await?;
        let booked = match schedule {
            Some(_) => self
                .appointments
                .find_by_date(request.date, self.policy.utc_offset())
                .await
                .map_err(map_appointment_error)?,
            None => Vec::new(),
        };

        let query = SlotQuery {
            date: request.date,
            slot_minutes,
            stylist_id: request.stylist_id,
        };
        let report = AvailabilityCalculator::new(self.policy)
            .calculate(&query, schedule.as_ref(), &booked)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        debug!(
            date = %report.date,
            working_day = report.is_working_day,
            total_slots = report.total_slots,
            available_slots = report.available_slots,
            "availability calculated"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "availability_service_tests.rs"]
mod tests;
