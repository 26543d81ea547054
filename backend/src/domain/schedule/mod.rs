//! Working-hours schedules and slot enumeration.
//!
//! A [`Schedule`] describes the bookable window for one day of the week,
//! optionally tied to a [`Holiday`] that overrides the regular template for
//! that date. Windows never cross midnight: salons open past midnight are
//! not modelled, and `end_time` must be strictly after `start_time`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::time_window::{ClockTime, TimeWindowError, minutes_between};
use super::{HolidayId, ScheduleId};


/// Minimum span of a working-hours window, in minutes.
pub const MIN_SCHEDULE_MINUTES: u32 = 30;

/// Slot length used when the caller does not ask for one.
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

/// Validation errors raised by schedule constructors and mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleValidationError {
    Time(TimeWindowError),
    EndNotAfterStart { start: ClockTime, end: ClockTime },
    SpanTooShort { minutes: u32, min: u32 },
    InvalidSlotDuration,
}

impl fmt::Display for ScheduleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time(err) => write!(f, "{err}"),
            Self::EndNotAfterStart { start, end } => write!(
                f,
                "schedule end time {end} must be after start time {start} (overnight windows are not supported)"
            ),
            Self::SpanTooShort { minutes, min } => write!(
                f,
                "schedule must span at least {min} minutes (got {minutes})"
            ),
            Self::InvalidSlotDuration => write!(f, "slot duration must be greater than zero"),
        }
    }
}

impl std::error::Error for ScheduleValidationError {}

impl From<TimeWindowError> for ScheduleValidationError {
    fn from(value: TimeWindowError) -> Self {
        Self::Time(value)
    }
}

/// Day of the week a schedule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Day of the week for a calendar date.
    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    /// Canonical upper-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "MONDAY",
            Self::Tuesday => "TUESDAY",
            Self::Wednesday => "WEDNESDAY",
            Self::Thursday => "THURSDAY",
            Self::Friday => "FRIDAY",
            Self::Saturday => "SATURDAY",
            Self::Sunday => "SUNDAY",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown day name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDayOfWeekError(String);

impl fmt::Display for ParseDayOfWeekError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown day of week '{}'", self.0)
    }
}

impl std::error::Error for ParseDayOfWeekError {}

impl FromStr for DayOfWeek {
    type Err = ParseDayOfWeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MONDAY" => Ok(Self::Monday),
            "TUESDAY" => Ok(Self::Tuesday),
            "WEDNESDAY" => Ok(Self::Wednesday),
            "THURSDAY" => Ok(Self::Thursday),
            "FRIDAY" => Ok(Self::Friday),
            "SATURDAY" => Ok(Self::Saturday),
            "SUNDAY" => Ok(Self::Sunday),
            other => Err(ParseDayOfWeekError(other.to_owned())),
        }
    }
}

/// A dated closure or special-hours day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: HolidayId,
    pub date: NaiveDate,
    pub name: String,
}

/// Input payload for [`Schedule::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDraft {
    pub id: ScheduleId,
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub holiday_id: Option<HolidayId>,
}

/// Working-hours window for a day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    id: ScheduleId,
    day_of_week: DayOfWeek,
    start_time: ClockTime,
    end_time: ClockTime,
    holiday_id: Option<HolidayId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_window(
    start: &str,
    end: &str,
) -> Result<(ClockTime, ClockTime), ScheduleValidationError> {
    let start = ClockTime::parse(start)?;
    let end = ClockTime::parse(end)?;
    let span = minutes_between(start, end);
    let Ok(minutes) = u32::try_from(span) else {
        return Err(ScheduleValidationError::EndNotAfterStart { start, end });
    };
    if minutes == 0 {
        return Err(ScheduleValidationError::EndNotAfterStart { start, end });
    }
    if minutes < MIN_SCHEDULE_MINUTES {
        return Err(ScheduleValidationError::SpanTooShort {
            minutes,
            min: MIN_SCHEDULE_MINUTES,
        });
    }
    Ok((start, end))
}

impl Schedule {
    /// Create a validated schedule.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use salon_backend::domain::{DayOfWeek, Schedule, ScheduleDraft, ScheduleId};
    ///
    /// let schedule = Schedule::new(
    ///     ScheduleDraft {
    ///         id: ScheduleId::random(),
    ///         day_of_week: DayOfWeek::Monday,
    ///         start_time: "09:00".to_owned(),
    ///         end_time: "17:00".to_owned(),
    ///         holiday_id: None,
    ///     },
    ///     Utc::now(),
    /// )
    /// .expect("valid schedule");
    /// assert_eq!(schedule.duration_in_minutes(), 480);
    /// ```
    pub fn new(draft: ScheduleDraft, now: DateTime<Utc>) -> Result<Self, ScheduleValidationError> {
        let (start_time, end_time) = validate_window(&draft.start_time, &draft.end_time)?;
        Ok(Self {
            id: draft.id,
            day_of_week: draft.day_of_week,
            start_time,
            end_time,
            holiday_id: draft.holiday_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> ScheduleId {
        self.id
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        self.day_of_week
    }

    pub fn start_time(&self) -> ClockTime {
        self.start_time
    }

    pub fn end_time(&self) -> ClockTime {
        self.end_time
    }

    /// Holiday this schedule overrides, if any.
    pub fn holiday_id(&self) -> Option<HolidayId> {
        self.holiday_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether `time` falls inside the window, inclusive of both ends.
    pub fn is_within_working_hours(&self, time: ClockTime) -> bool {
        self.start_time <= time && time <= self.end_time
    }

    /// Whether the wall-clock interval `[start, end]` fits inside the window.
    pub fn covers(&self, start: NaiveTime, end: NaiveTime) -> bool {
        start <= end
            && self.start_time.to_naive_time() <= start
            && end <= self.end_time.to_naive_time()
    }

    /// Length of the window in minutes.
    pub fn duration_in_minutes(&self) -> u32 {
        u32::try_from(minutes_between(self.start_time, self.end_time)).unwrap_or(0)
    }

    /// Candidate slot start times of `slot_minutes` length.
    ///
    /// Slots start at `start_time` and step by `slot_minutes`; a slot is
    /// only emitted when it ends at or before `end_time`.
    pub fn available_slots(
        &self,
        slot_minutes: u32,
    ) -> Result<Vec<ClockTime>, ScheduleValidationError> {
        if slot_minutes == 0 {
            return Err(ScheduleValidationError::InvalidSlotDuration);
        }
        let mut slots = Vec::new();
        let mut cursor = Some(self.start_time);
        while let Some(slot_start) = cursor {
            match slot_start.checked_add_minutes(slot_minutes) {
                Some(slot_end) if slot_end <= self.end_time => {
                    slots.push(slot_start);
                    cursor = Some(slot_end);
                }
                _ => cursor = None,
            }
        }
        Ok(slots)
    }

    /// Replace the window, re-running creation invariants.
    pub fn update_schedule(
        &mut self,
        new_start: &str,
        new_end: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ScheduleValidationError> {
        let (start_time, end_time) = validate_window(new_start, new_end)?;
        self.start_time = start_time;
        self.end_time = end_time;
        self.updated_at = now;
        Ok(())
    }
}

/// Pick the schedule that governs `date`.
///
/// When a holiday falls on the date, only a schedule tied to that holiday
/// applies and its absence means the salon is closed. Otherwise the first
/// regular (non-holiday) schedule for the weekday applies.
pub fn resolve_schedule<'a>(
    date: NaiveDate,
    holiday: Option<&Holiday>,
    schedules: &'a [Schedule],
) -> Option<&'a Schedule> {
    let day = DayOfWeek::of(date);
    let mut for_day = schedules.iter().filter(|s| s.day_of_week == day);
    match holiday {
        Some(holiday) if holiday.date == date => {
            for_day.find(|s| s.holiday_id == Some(holiday.id))
        }
        _ => for_day.find(|s| s.holiday_id.is_none()),
    }
}
