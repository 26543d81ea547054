//! Appointment validation and conversion helpers.

use std::collections::BTreeSet;

use crate::domain::{ServiceId, UserId};

use super::{Appointment, AppointmentDuration, AppointmentSnapshot, AppointmentValidationError};

impl TryFrom<AppointmentSnapshot> for Appointment {
    type Error = AppointmentValidationError;

    fn try_from(value: AppointmentSnapshot) -> Result<Self, Self::Error> {
        let duration = AppointmentDuration::new(value.duration_minutes)?;
        validate_participant(value.organizer_id, "organizer")?;
        validate_participant(value.client_id, "client")?;
        if let Some(stylist_id) = value.stylist_id {
            validate_participant(stylist_id, "stylist")?;
        }
        let service_ids = collect_unique_services(value.service_ids)?;

        Ok(Self {
            id: value.id,
            start_time: value.start_time,
            duration,
            organizer_id: value.organizer_id,
            client_id: value.client_id,
            stylist_id: value.stylist_id,
            schedule_id: value.schedule_id,
            status_id: value.status_id,
            status: value.status,
            service_ids,
            confirmed_at: value.confirmed_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

fn validate_participant(
    user_id: UserId,
    role: &'static str,
) -> Result<(), AppointmentValidationError> {
    if user_id.as_uuid().is_nil() {
        return Err(AppointmentValidationError::MissingParticipant { role });
    }
    Ok(())
}

fn collect_unique_services(
    ids: Vec<ServiceId>,
) -> Result<BTreeSet<ServiceId>, AppointmentValidationError> {
    let mut seen = BTreeSet::new();
    for service_id in ids {
        if service_id.as_uuid().is_nil() {
            return Err(AppointmentValidationError::EmptyServiceId);
        }
        if !seen.insert(service_id) {
            return Err(AppointmentValidationError::DuplicateService { service_id });
        }
    }
    Ok(seen)
}
