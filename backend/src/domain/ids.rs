//! Strongly typed identifiers for scheduling entities.
//!
//! Each identifier wraps a UUID and serialises as its hyphenated string form.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValidationError {
    Empty { kind: &'static str },
    Invalid { kind: &'static str, value: String },
}

impl fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { kind } => write!(f, "{kind} must not be empty"),
            Self::Invalid { kind, value } => {
                write!(f, "{kind} must be a valid UUID (got '{value}')")
            }
        }
    }
}

impl std::error::Error for IdValidationError {}

macro_rules! define_uuid_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct the identifier from a string.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = id.as_ref();
                if raw.trim().is_empty() {
                    return Err(IdValidationError::Empty { kind: $kind });
                }
                if raw.trim() != raw {
                    return Err(IdValidationError::Invalid {
                        kind: $kind,
                        value: raw.to_owned(),
                    });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid {
                        kind: $kind,
                        value: raw.to_owned(),
                    })
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }
    };
}

define_uuid_id!(
    /// Appointment identifier.
    AppointmentId,
    "appointment id"
);
define_uuid_id!(
    /// Working-hours schedule identifier.
    ScheduleId,
    "schedule id"
);
define_uuid_id!(
    /// Appointment status record identifier.
    StatusId,
    "status id"
);
define_uuid_id!(
    /// Salon service identifier.
    ServiceId,
    "service id"
);
define_uuid_id!(
    /// Holiday identifier.
    HolidayId,
    "holiday id"
);
define_uuid_id!(
    /// External user identity (organizer, client, or stylist).
    UserId,
    "user id"
);
