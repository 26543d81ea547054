//! Driving port for appointment lifecycle mutations.
//!
//! Requests and responses are plain serde data so any transport can carry
//! them. Every operation either returns the appointment as stored after the
//! change or a [`crate::domain::Error`] whose code names the failure kind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Appointment, AppointmentId, AppointmentStatusName, Error, ScheduleId, ServiceId, UserId,
};

/// Serializable appointment for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPayload {
    pub id: AppointmentId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub organizer_id: UserId,
    pub client_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylist_id: Option<UserId>,
    pub schedule_id: ScheduleId,
    pub status: AppointmentStatusName,
    pub service_ids: Vec<ServiceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Appointment> for AppointmentPayload {
    fn from(value: &Appointment) -> Self {
        Self {
            id: value.id(),
            start_time: value.start_time(),
            end_time: value.end_time(),
            duration_minutes: value.duration().minutes(),
            organizer_id: value.organizer_id(),
            client_id: value.client_id(),
            stylist_id: value.stylist_id(),
            schedule_id: value.schedule_id(),
            status: value.status(),
            service_ids: value.service_ids().collect(),
            confirmed_at: value.confirmed_at(),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

/// Request to book a new appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub organizer_id: UserId,
    pub client_id: UserId,
    #[serde(default)]
    pub stylist_id: Option<UserId>,
    #[serde(default)]
    pub service_ids: Vec<ServiceId>,
}

/// Request to move an appointment along the status table.
///
/// Used by confirm, start, complete and no-show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentActionRequest {
    pub appointment_id: AppointmentId,
    pub requester_id: UserId,
}

/// Request to cancel an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelAppointmentRequest {
    pub appointment_id: AppointmentId,
    pub requester_id: UserId,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Stylist change carried by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "action", content = "stylistId")]
pub enum StylistChange {
    Assign(UserId),
    Unassign,
}

/// Request to reschedule, reassign or re-scope an appointment.
///
/// Absent fields keep their current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub appointment_id: AppointmentId,
    pub requester_id: UserId,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub stylist: Option<StylistChange>,
    #[serde(default)]
    pub add_service_ids: Vec<ServiceId>,
    #[serde(default)]
    pub remove_service_ids: Vec<ServiceId>,
}

impl UpdateAppointmentRequest {
    /// Whether the request moves or resizes the appointment.
    pub fn changes_interval(&self) -> bool {
        self.start_time.is_some() || self.duration_minutes.is_some()
    }
}

/// Response carrying the appointment after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub appointment: AppointmentPayload,
}

impl From<&Appointment> for AppointmentResponse {
    fn from(value: &Appointment) -> Self {
        Self {
            appointment: value.into(),
        }
    }
}

/// Driving port for appointment write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentCommand: Send + Sync {
    /// Book a new appointment in the initial status.
    ///
    /// Fails with `invalid_request` for malformed input, `not_found` for
    /// unknown users or services, `business_rule` outside working hours and
    /// `conflict` when the interval is taken.
    async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<AppointmentResponse, Error>;

    /// Confirm a pending appointment.
    async fn confirm_appointment(
        &self,
        request: AppointmentActionRequest,
    ) -> Result<AppointmentResponse, Error>;

    /// Cancel an appointment that has not finished.
    async fn cancel_appointment(
        &self,
        request: CancelAppointmentRequest,
    ) -> Result<AppointmentResponse, Error>;

    /// Reschedule, reassign or re-scope an appointment.
    async fn update_appointment(
        &self,
        request: UpdateAppointmentRequest,
    ) -> Result<AppointmentResponse, Error>;

    /// Mark a confirmed appointment as in progress.
    async fn start_appointment(
        &self,
        request: AppointmentActionRequest,
    ) -> Result<AppointmentResponse, Error>;

    /// Mark an in-progress appointment as completed.
    async fn complete_appointment(
        &self,
        request: AppointmentActionRequest,
    ) -> Result<AppointmentResponse, Error>;

    /// Record that the client did not turn up.
    async fn mark_no_show(
        &self,
        request: AppointmentActionRequest,
    ) -> Result<AppointmentResponse, Error>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn update_request_defaults_optional_fields() {
        let appointment_id = AppointmentId::random();
        let requester_id = UserId::random();
        let request: UpdateAppointmentRequest = serde_json::from_value(json!({
            "appointmentId": appointment_id.to_string(),
            "requesterId": requester_id.to_string(),
        }))
        .expect("valid request");
        assert!(!request.changes_interval());
        assert!(request.stylist.is_none());
        assert!(request.add_service_ids.is_empty());
    }

    #[rstest]
    fn stylist_change_is_tagged() {
        let stylist = UserId::random();
        let value = serde_json::to_value(StylistChange::Assign(stylist)).expect("serialise");
        assert_eq!(
            value,
            json!({"action": "assign", "stylistId": stylist.to_string()})
        );
        let unassign = serde_json::to_value(StylistChange::Unassign).expect("serialise");
        assert_eq!(unassign, json!({"action": "unassign"}));
    }
}
