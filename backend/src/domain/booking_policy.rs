//! Lead times and salon-local time handling for booking operations.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta, Utc};

use super::DEFAULT_MODIFY_LEAD_MINUTES;
use super::schedule::DEFAULT_SLOT_MINUTES;

/// Minimum notice before an appointment can be confirmed.
pub const DEFAULT_CONFIRM_LEAD_MINUTES: i64 = 60;

/// Minimum notice before an appointment can be cancelled.
pub const DEFAULT_CANCEL_LEAD_MINUTES: i64 = 2 * 60;

/// Errors raised when building a [`BookingPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingPolicyError {
    ZeroSlotDuration,
    NonPositiveLead { name: &'static str },
    InvalidUtcOffset { minutes: i32 },
}

impl fmt::Display for BookingPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSlotDuration => write!(f, "default slot duration must be greater than zero"),
            Self::NonPositiveLead { name } => write!(f, "{name} lead time must be positive"),
            Self::InvalidUtcOffset { minutes } => {
                write!(f, "utc offset of {minutes} minutes is out of range")
            }
        }
    }
}

impl std::error::Error for BookingPolicyError {}

/// Booking rules applied by the lifecycle services.
///
/// `Default` matches the salon's standard rules: 30 minute slots, one hour
/// to confirm, two hours to cancel, a day to modify, and UTC wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    default_slot_minutes: u32,
    confirm_lead: TimeDelta,
    cancel_lead: TimeDelta,
    modify_lead: TimeDelta,
    utc_offset: FixedOffset,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            default_slot_minutes: DEFAULT_SLOT_MINUTES,
            confirm_lead: TimeDelta::minutes(DEFAULT_CONFIRM_LEAD_MINUTES),
            cancel_lead: TimeDelta::minutes(DEFAULT_CANCEL_LEAD_MINUTES),
            modify_lead: TimeDelta::minutes(DEFAULT_MODIFY_LEAD_MINUTES),
            utc_offset: Utc.fix(),
        }
    }
}

impl BookingPolicy {
    /// Build a policy from raw minute values.
    ///
    /// # Examples
    /// ```
    /// use salon_backend::domain::BookingPolicy;
    ///
    /// let policy = BookingPolicy::new(30, 60, 120, 1440, 60).expect("valid policy");
    /// assert_eq!(policy.default_slot_minutes(), 30);
    /// assert!(BookingPolicy::new(30, 0, 120, 1440, 0).is_err());
    /// ```
    pub fn new(
        default_slot_minutes: u32,
        confirm_lead_minutes: i64,
        cancel_lead_minutes: i64,
        modify_lead_minutes: i64,
        utc_offset_minutes: i32,
    ) -> Result<Self, BookingPolicyError> {
        if default_slot_minutes == 0 {
            return Err(BookingPolicyError::ZeroSlotDuration);
        }
        let confirm_lead = positive_lead(confirm_lead_minutes, "confirm")?;
        let cancel_lead = positive_lead(cancel_lead_minutes, "cancel")?;
        let modify_lead = positive_lead(modify_lead_minutes, "modify")?;
        let utc_offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(BookingPolicyError::InvalidUtcOffset {
                minutes: utc_offset_minutes,
            })?;
        Ok(Self {
            default_slot_minutes,
            confirm_lead,
            cancel_lead,
            modify_lead,
            utc_offset,
        })
    }

    pub fn default_slot_minutes(&self) -> u32 {
        self.default_slot_minutes
    }

    pub fn confirm_lead(&self) -> TimeDelta {
        self.confirm_lead
    }

    pub fn cancel_lead(&self) -> TimeDelta {
        self.cancel_lead
    }

    pub fn modify_lead(&self) -> TimeDelta {
        self.modify_lead
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// Salon wall-clock reading of an instant.
    pub fn local_datetime(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.utc_offset).naive_local()
    }

    /// Salon-local calendar date of an instant.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local_datetime(instant).date()
    }

    /// Convert a salon wall-clock reading back to UTC.
    ///
    /// Fixed offsets are never ambiguous, so this always succeeds.
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        (local - self.utc_offset).and_utc()
    }
}

fn positive_lead(minutes: i64, name: &'static str) -> Result<TimeDelta, BookingPolicyError> {
    if minutes <= 0 {
        return Err(BookingPolicyError::NonPositiveLead { name });
    }
    TimeDelta::try_minutes(minutes).ok_or(BookingPolicyError::NonPositiveLead { name })
}
