//! Internal helpers shared by the appointment and availability services.

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::ports::{
    AppointmentRepositoryError, AppointmentStatusRepository, AppointmentStatusRepositoryError,
    ReferenceDirectory, ReferenceDirectoryError, ScheduleRepository, ScheduleRepositoryError,
};
use crate::domain::{
    AppointmentStatus, AppointmentStatusName, DayOfWeek, Error, Schedule, ServiceId, UserId,
    resolve_schedule,
};

pub(crate) fn map_appointment_error(error: AppointmentRepositoryError) -> Error {
    match error {
        AppointmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("appointment repository unavailable: {message}"))
        }
        AppointmentRepositoryError::Query { message } => {
            Error::internal(format!("appointment repository error: {message}"))
        }
        AppointmentRepositoryError::SlotTaken { conflicting_id } => Error::conflict(format!(
            "requested time overlaps appointment {conflicting_id}"
        ))
        .with_details(json!({
            "conflictingAppointmentId": conflicting_id,
            "code": "slot_taken",
        })),
        AppointmentRepositoryError::Missing { appointment_id } => {
            Error::not_found(format!("appointment {appointment_id} not found"))
        }
    }
}

pub(crate) fn map_schedule_error(error: ScheduleRepositoryError) -> Error {
    match error {
        ScheduleRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("schedule repository unavailable: {message}"))
        }
        ScheduleRepositoryError::Query { message } => {
            Error::internal(format!("schedule repository error: {message}"))
        }
    }
}

pub(crate) fn map_status_error(error: AppointmentStatusRepositoryError) -> Error {
    match error {
        AppointmentStatusRepositoryError::Connection { message } => Error::service_unavailable(
            format!("appointment status repository unavailable: {message}"),
        ),
        AppointmentStatusRepositoryError::Query { message } => {
            Error::internal(format!("appointment status repository error: {message}"))
        }
    }
}

pub(crate) fn map_directory_error(error: ReferenceDirectoryError) -> Error {
    match error {
        ReferenceDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("reference directory unavailable: {message}"))
        }
        ReferenceDirectoryError::Query { message } => {
            Error::internal(format!("reference directory error: {message}"))
        }
    }
}

/// Schedule governing `date`, or `None` when the salon is closed.
pub(crate) async fn load_schedule_for<S>(
    schedules: &S,
    date: NaiveDate,
) -> Result<Option<Schedule>, Error>
where
    S: ScheduleRepository + ?Sized,
{
    let holiday = schedules
        .find_holiday_by_date(date)
        .await
        .map_err(map_schedule_error)?;
    let candidates = schedules
        .find_by_day_of_week(DayOfWeek::of(date))
        .await
        .map_err(map_schedule_error)?;
    Ok(resolve_schedule(date, holiday.as_ref(), &candidates).cloned())
}

/// Status record for `name`; a missing record is reported as `not_found`.
pub(crate) async fn load_status<T>(
    statuses: &T,
    name: AppointmentStatusName,
) -> Result<AppointmentStatus, Error>
where
    T: AppointmentStatusRepository + ?Sized,
{
    statuses
        .find_by_name(name)
        .await
        .map_err(map_status_error)?
        .ok_or_else(|| Error::not_found(format!("appointment status {name} is not configured")))
}

pub(crate) async fn ensure_user_exists<D>(
    directory: &D,
    user_id: UserId,
    role: &str,
) -> Result<(), Error>
where
    D: ReferenceDirectory + ?Sized,
{
    if directory
        .user_exists(&user_id)
        .await
        .map_err(map_directory_error)?
    {
        Ok(())
    } else {
        Err(Error::not_found(format!("{role} {user_id} not found"))
            .with_details(json!({ "role": role, "userId": user_id })))
    }
}

pub(crate) async fn ensure_services_exist<D>(
    directory: &D,
    service_ids: &[ServiceId],
) -> Result<(), Error>
where
    D: ReferenceDirectory + ?Sized,
{
    for service_id in service_ids {
        let exists = directory
            .service_exists(service_id)
            .await
            .map_err(map_directory_error)?;
        if !exists {
            return Err(Error::not_found(format!("service {service_id} not found"))
                .with_details(json!({ "serviceId": service_id })));
        }
    }
    Ok(())
}
