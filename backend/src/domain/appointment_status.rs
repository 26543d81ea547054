//! Appointment status state machine.
//!
//! [`AppointmentStatusName`] is the closed set of states and owns the only
//! transition table in the crate. [`AppointmentStatus`] is the seeded
//! record (id, name, description) that appointments reference.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::StatusId;

/// Maximum length of a status name.
pub const STATUS_NAME_MAX: usize = 50;
/// Maximum length of a status description.
pub const STATUS_DESCRIPTION_MAX: usize = 200;

/// Validation errors for status names and records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentStatusError {
    NameTooLong { max: usize },
    InvalidNameFormat { name: String },
    UnknownName { name: String },
    DescriptionTooLong { max: usize },
}

impl fmt::Display for AppointmentStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameTooLong { max } => {
                write!(f, "status name must be at most {max} characters")
            }
            Self::InvalidNameFormat { name } => write!(
                f,
                "status name '{name}' must contain only upper-case letters, digits, or underscores"
            ),
            Self::UnknownName { name } => write!(f, "unknown appointment status '{name}'"),
            Self::DescriptionTooLong { max } => {
                write!(f, "status description must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for AppointmentStatusError {}

/// Raised when a requested transition is not in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransitionError {
    pub from: AppointmentStatusName,
    pub to: AppointmentStatusName,
}

impl fmt::Display for StatusTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot transition appointment from {} to {}",
            self.from, self.to
        )
    }
}

impl std::error::Error for StatusTransitionError {}

static STATUS_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn status_name_regex() -> &'static Regex {
    STATUS_NAME_RE.get_or_init(|| {
        Regex::new("^[A-Z_][A-Z0-9_]*$")
            .unwrap_or_else(|error| panic!("status name regex failed to compile: {error}"))
    })
}

/// Lifecycle states of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatusName {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatusName {
    /// Every state, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::NoShow,
    ];

    /// State assigned to newly created appointments.
    pub const INITIAL: Self = Self::Pending;

    /// Canonical name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::NoShow => "NO_SHOW",
        }
    }

    /// Targets reachable from this state.
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::InProgress, Self::Cancelled, Self::NoShow],
            Self::InProgress => &[Self::Completed, Self::Cancelled],
            Self::Completed | Self::Cancelled | Self::NoShow => &[],
        }
    }

    /// Whether the table permits `self -> target`.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// Check a transition, returning the typed error on refusal.
    pub fn ensure_transition(self, target: Self) -> Result<(), StatusTransitionError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(StatusTransitionError {
                from: self,
                to: target,
            })
        }
    }

    /// Terminal states have no outgoing transitions.
    pub const fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Validate and parse a canonical status name.
    ///
    /// Only the canonical upper-case spelling is accepted.
    pub fn parse(name: &str) -> Result<Self, AppointmentStatusError> {
        if name.chars().count() > STATUS_NAME_MAX {
            return Err(AppointmentStatusError::NameTooLong {
                max: STATUS_NAME_MAX,
            });
        }
        if !status_name_regex().is_match(name) {
            return Err(AppointmentStatusError::InvalidNameFormat {
                name: name.to_owned(),
            });
        }
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == name)
            .ok_or_else(|| AppointmentStatusError::UnknownName {
                name: name.to_owned(),
            })
    }
}

impl fmt::Display for AppointmentStatusName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatusName {
    type Err = AppointmentStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Seeded status record referenced by appointments.
///
/// ## Invariants
/// - `name` is one of [`AppointmentStatusName`].
/// - `description` is at most [`STATUS_DESCRIPTION_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStatus {
    id: StatusId,
    name: AppointmentStatusName,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

fn validate_description(description: Option<&str>) -> Result<(), AppointmentStatusError> {
    match description {
        Some(text) if text.chars().count() > STATUS_DESCRIPTION_MAX => {
            Err(AppointmentStatusError::DescriptionTooLong {
                max: STATUS_DESCRIPTION_MAX,
            })
        }
        _ => Ok(()),
    }
}

impl AppointmentStatus {
    /// Build a record from a raw name, validating every field.
    pub fn new(
        id: StatusId,
        name: &str,
        description: Option<String>,
    ) -> Result<Self, AppointmentStatusError> {
        let name = AppointmentStatusName::parse(name)?;
        Self::from_name(id, name, description)
    }

    /// Build a record from a known state.
    pub fn from_name(
        id: StatusId,
        name: AppointmentStatusName,
        description: Option<String>,
    ) -> Result<Self, AppointmentStatusError> {
        validate_description(description.as_deref())?;
        Ok(Self {
            id,
            name,
            description,
        })
    }

    /// One record per state with fresh ids, as seeded at bootstrap.
    pub fn seed_defaults() -> Vec<Self> {
        AppointmentStatusName::ALL
            .into_iter()
            .map(|name| Self {
                id: StatusId::random(),
                name,
                description: None,
            })
            .collect()
    }

    pub fn id(&self) -> StatusId {
        self.id
    }

    pub fn name(&self) -> AppointmentStatusName {
        self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Replace the administrative description.
    pub fn update_description(
        &mut self,
        description: Option<String>,
    ) -> Result<(), AppointmentStatusError> {
        validate_description(description.as_deref())?;
        self.description = description;
        Ok(())
    }

    /// Whether this status may move to the state named `target_name`.
    ///
    /// Unknown or non-canonical names return `false`.
    pub fn can_transition_to(&self, target_name: &str) -> bool {
        AppointmentStatusName::parse(target_name)
            .is_ok_and(|target| self.name.can_transition_to(target))
    }

    pub fn is_terminal_status(&self) -> bool {
        self.name.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use super::AppointmentStatusName::{Cancelled, Completed, Confirmed, InProgress, NoShow, Pending};

    fn record(name: AppointmentStatusName) -> AppointmentStatus {
        AppointmentStatus::from_name(StatusId::random(), name, None).expect("valid status")
    }

    #[rstest]
    #[case(Pending, &[Confirmed, Cancelled])]
    #[case(Confirmed, &[InProgress, Cancelled, NoShow])]
    #[case(InProgress, &[Completed, Cancelled])]
    #[case(Completed, &[])]
    #[case(Cancelled, &[])]
    #[case(NoShow, &[])]
    fn transition_table_is_complete(
        #[case] from: AppointmentStatusName,
        #[case] allowed: &[AppointmentStatusName],
    ) {
        let status = record(from);
        for target in AppointmentStatusName::ALL {
            let expected = allowed.contains(&target);
            assert_eq!(
                status.can_transition_to(target.as_str()),
                expected,
                "{from} -> {target}"
            );
            assert_eq!(from.can_transition_to(target), expected);
        }
        for unknown in ["", "ARCHIVED", "confirmed", "Confirmada", "Confirmed"] {
            assert!(!status.can_transition_to(unknown), "{from} -> {unknown}");
        }
    }

    #[rstest]
    #[case(Completed)]
    #[case(Cancelled)]
    #[case(NoShow)]
    fn terminal_states_are_immutable(#[case] terminal: AppointmentStatusName) {
        let status = record(terminal);
        assert!(status.is_terminal_status());
        for target in AppointmentStatusName::ALL
            .into_iter()
            .filter(|target| *target != terminal)
        {
            assert!(!status.can_transition_to(target.as_str()));
        }
    }

    #[rstest]
    fn non_terminal_states_are_reported() {
        for name in [Pending, Confirmed, InProgress] {
            assert!(!name.is_terminal());
        }
    }

    #[rstest]
    fn ensure_transition_reports_both_ends() {
        let err = Pending.ensure_transition(Completed).expect_err("illegal");
        assert_eq!(
            err,
            StatusTransitionError {
                from: Pending,
                to: Completed
            }
        );
        assert_eq!(
            err.to_string(),
            "cannot transition appointment from PENDING to COMPLETED"
        );
        assert!(Pending.ensure_transition(Confirmed).is_ok());
    }

    #[rstest]
    #[case("PENDING", Ok(Pending))]
    #[case("IN_PROGRESS", Ok(InProgress))]
    #[case("NO_SHOW", Ok(NoShow))]
    fn parse_accepts_canonical_names(
        #[case] raw: &str,
        #[case] expected: Result<AppointmentStatusName, AppointmentStatusError>,
    ) {
        assert_eq!(AppointmentStatusName::parse(raw), expected);
    }

    #[rstest]
    fn parse_rejects_bad_names() {
        assert!(matches!(
            AppointmentStatusName::parse("Confirmada"),
            Err(AppointmentStatusError::InvalidNameFormat { .. })
        ));
        assert!(matches!(
            AppointmentStatusName::parse("9LIVES"),
            Err(AppointmentStatusError::InvalidNameFormat { .. })
        ));
        assert!(matches!(
            AppointmentStatusName::parse("ARCHIVED"),
            Err(AppointmentStatusError::UnknownName { .. })
        ));
        let long = "A".repeat(STATUS_NAME_MAX + 1);
        assert_eq!(
            AppointmentStatusName::parse(&long),
            Err(AppointmentStatusError::NameTooLong {
                max: STATUS_NAME_MAX
            })
        );
    }

    #[rstest]
    fn description_length_is_enforced() {
        let long = "x".repeat(STATUS_DESCRIPTION_MAX + 1);
        assert_eq!(
            AppointmentStatus::new(StatusId::random(), "PENDING", Some(long.clone())),
            Err(AppointmentStatusError::DescriptionTooLong {
                max: STATUS_DESCRIPTION_MAX
            })
        );

        let mut status = record(Pending);
        assert!(status.update_description(Some(long)).is_err());
        status
            .update_description(Some("Awaiting confirmation".to_owned()))
            .expect("valid description");
        assert_eq!(status.description(), Some("Awaiting confirmation"));
    }

    #[rstest]
    fn seed_defaults_has_one_record_per_state() {
        let seeded = AppointmentStatus::seed_defaults();
        assert_eq!(seeded.len(), AppointmentStatusName::ALL.len());
        for name in AppointmentStatusName::ALL {
            assert_eq!(seeded.iter().filter(|s| s.name() == name).count(), 1);
        }
    }

    #[rstest]
    fn names_serialise_in_screaming_snake_case() {
        let json = serde_json::to_string(&InProgress).expect("serialise");
        assert_eq!(json, "\"IN_PROGRESS\"");
    }
}
