//! Booked appointment entity and its validation rules.
//!
//! Appointments own their interval `[start_time, end_time)`, participants,
//! services and current status. Status changes go through
//! [`Appointment::transition_to`] and its `mark_as_*` wrappers, which consult
//! the table on [`AppointmentStatusName`]; there is no unchecked setter.

use std::fmt;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::{AppointmentStatusName, ServiceId, StatusTransitionError};

mod entity;
mod validation;

pub use entity::{Appointment, AppointmentDraft, AppointmentSnapshot};

/// Lead time, in minutes, below which an appointment can no longer be modified.
pub const DEFAULT_MODIFY_LEAD_MINUTES: i64 = 24 * 60;

/// Validation errors raised by appointment constructors and mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentValidationError {
    StartNotInFuture,
    DurationTooShort { min: u32 },
    DurationTooLong { max: u32 },
    DurationNotMultiple { step: u32 },
    MissingParticipant { role: &'static str },
    EmptyServiceId,
    DuplicateService { service_id: ServiceId },
    ServiceNotPresent { service_id: ServiceId },
    NotInitialStatus { status: AppointmentStatusName },
    StatusMismatch {
        expected: AppointmentStatusName,
        actual: AppointmentStatusName,
    },
    Transition(StatusTransitionError),
}

impl fmt::Display for AppointmentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartNotInFuture => write!(f, "appointment start time must be in the future"),
            Self::DurationTooShort { min } => {
                write!(f, "appointment duration must be at least {min} minutes")
            }
            Self::DurationTooLong { max } => {
                write!(f, "appointment duration must be at most {max} minutes")
            }
            Self::DurationNotMultiple { step } => {
                write!(f, "appointment duration must be a multiple of {step} minutes")
            }
            Self::MissingParticipant { role } => write!(f, "appointment {role} is required"),
            Self::EmptyServiceId => write!(f, "service id must not be empty"),
            Self::DuplicateService { service_id } => {
                write!(f, "service {service_id} is already booked on this appointment")
            }
            Self::ServiceNotPresent { service_id } => {
                write!(f, "service {service_id} is not booked on this appointment")
            }
            Self::NotInitialStatus { status } => write!(
                f,
                "new appointments must start as {} (got {status})",
                AppointmentStatusName::INITIAL
            ),
            Self::StatusMismatch { expected, actual } => {
                write!(f, "expected a {expected} status record, got {actual}")
            }
            Self::Transition(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AppointmentValidationError {}

impl From<StatusTransitionError> for AppointmentValidationError {
    fn from(value: StatusTransitionError) -> Self {
        Self::Transition(value)
    }
}

/// Appointment length in minutes.
///
/// ## Invariants
/// - `MIN <= minutes <= MAX`
/// - `minutes % STEP == 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AppointmentDuration(u32);

impl AppointmentDuration {
    /// Shortest bookable appointment.
    pub const MIN: u32 = 15;
    /// Longest bookable appointment.
    pub const MAX: u32 = 480;
    /// Granularity of appointment lengths.
    pub const STEP: u32 = 15;

    /// Validate a duration in minutes.
    ///
    /// # Examples
    /// ```
    /// use salon_backend::domain::AppointmentDuration;
    ///
    /// assert!(AppointmentDuration::new(45).is_ok());
    /// assert!(AppointmentDuration::new(37).is_err());
    /// ```
    pub const fn new(minutes: u32) -> Result<Self, AppointmentValidationError> {
        if minutes < Self::MIN {
            return Err(AppointmentValidationError::DurationTooShort { min: Self::MIN });
        }
        if minutes > Self::MAX {
            return Err(AppointmentValidationError::DurationTooLong { max: Self::MAX });
        }
        if minutes % Self::STEP != 0 {
            return Err(AppointmentValidationError::DurationNotMultiple { step: Self::STEP });
        }
        Ok(Self(minutes))
    }

    pub const fn minutes(self) -> u32 {
        self.0
    }

    /// Length as a [`TimeDelta`].
    pub fn as_delta(self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.0))
    }
}

impl TryFrom<u32> for AppointmentDuration {
    type Error = AppointmentValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AppointmentDuration> for u32 {
    fn from(value: AppointmentDuration) -> Self {
        value.0
    }
}
