//! Wall-clock helpers for working-hours windows.
//!
//! Working hours are expressed as `HH:MM` strings on a single nominal day.
//! [`ClockTime`] is the validated form; [`overlaps`] is the half-open
//! interval test shared by conflict detection and availability.

use std::fmt;
use std::sync::OnceLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Errors raised while parsing wall-clock times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeWindowError {
    InvalidFormat { value: String },
    OutOfRange { hour: u8, minute: u8 },
}

impl fmt::Display for TimeWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat { value } => {
                write!(f, "time '{value}' must use the HH:MM format")
            }
            Self::OutOfRange { hour, minute } => write!(
                f,
                "time {hour:02}:{minute:02} is out of range (00:00 to 23:59)"
            ),
        }
    }
}

impl std::error::Error for TimeWindowError {}

static CLOCK_TIME_RE: OnceLock<Regex> = OnceLock::new();

fn clock_time_regex() -> &'static Regex {
    CLOCK_TIME_RE.get_or_init(|| {
        // Range checks happen after capture so out-of-range values get a
        // dedicated error.
        Regex::new(r"^(\d{2}):(\d{2})$")
            .unwrap_or_else(|error| panic!("clock time regex failed to compile: {error}"))
    })
}

/// Parse an `HH:MM` string into `(hour, minute)`.
///
/// # Examples
/// ```
/// use salon_backend::domain::parse_time;
///
/// assert_eq!(parse_time("09:30"), Ok((9, 30)));
/// assert!(parse_time("9:30").is_err());
/// assert!(parse_time("24:00").is_err());
/// ```
pub fn parse_time(value: &str) -> Result<(u8, u8), TimeWindowError> {
    let captures =
        clock_time_regex()
            .captures(value)
            .ok_or_else(|| TimeWindowError::InvalidFormat {
                value: value.to_owned(),
            })?;
    let component = |index: usize| -> Result<u8, TimeWindowError> {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<u8>().ok())
            .ok_or_else(|| TimeWindowError::InvalidFormat {
                value: value.to_owned(),
            })
    };
    let hour = component(1)?;
    let minute = component(2)?;
    if hour > 23 || minute > 59 {
        return Err(TimeWindowError::OutOfRange { hour, minute });
    }
    Ok((hour, minute))
}

/// Signed number of minutes from `start` to `end`.
///
/// Ordering is not enforced here; callers such as
/// [`Schedule`](crate::domain::Schedule) validate `start < end` first.
pub fn minutes_between(start: ClockTime, end: ClockTime) -> i32 {
    i32::from(end.minutes) - i32::from(start.minutes)
}

/// Half-open overlap test for `[start_a, end_a)` and `[start_b, end_b)`.
///
/// Intervals that only touch at a boundary do not overlap.
///
/// # Examples
/// ```
/// use salon_backend::domain::overlaps;
///
/// assert!(overlaps(9, 11, 10, 12));
/// assert!(!overlaps(9, 10, 10, 11));
/// ```
pub fn overlaps<T: PartialOrd>(start_a: T, end_a: T, start_b: T, end_b: T) -> bool {
    start_a < end_b && start_b < end_a
}

/// Validated wall-clock time with minute precision.
///
/// Serialises as an `HH:MM` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Build a time from hour and minute components.
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, TimeWindowError> {
        if hour > 23 || minute > 59 {
            return Err(TimeWindowError::OutOfRange { hour, minute });
        }
        Ok(Self {
            minutes: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    /// Parse an `HH:MM` string.
    pub fn parse(value: &str) -> Result<Self, TimeWindowError> {
        let (hour, minute) = parse_time(value)?;
        Self::from_hm(hour, minute)
    }

    /// Truncate a [`NaiveTime`] to minute precision.
    pub fn from_naive_time(time: NaiveTime) -> Self {
        // hour() <= 23 and minute() <= 59, so the product always fits.
        let minutes = time.hour() * 60 + time.minute();
        Self {
            minutes: u16::try_from(minutes).unwrap_or(MINUTES_PER_DAY - 1),
        }
    }

    /// Hour component (0-23).
    pub fn hour(self) -> u8 {
        u8::try_from(self.minutes / 60).unwrap_or(23)
    }

    /// Minute component (0-59).
    pub fn minute(self) -> u8 {
        u8::try_from(self.minutes % 60).unwrap_or(59)
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_since_midnight(self) -> u16 {
        self.minutes
    }

    /// Add minutes, returning `None` when the result passes 23:59.
    pub fn checked_add_minutes(self, minutes: u32) -> Option<Self> {
        let total = u32::from(self.minutes).checked_add(minutes)?;
        if total >= u32::from(MINUTES_PER_DAY) {
            return None;
        }
        u16::try_from(total).ok().map(|minutes| Self { minutes })
    }

    /// Convert to a [`NaiveTime`].
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeWindowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    fn t(value: &str) -> ClockTime {
        ClockTime::parse(value).expect("valid clock time")
    }

    #[rstest]
    #[case("00:00", (0, 0))]
    #[case("09:05", (9, 5))]
    #[case("23:59", (23, 59))]
    fn parse_time_accepts_valid_values(#[case] raw: &str, #[case] expected: (u8, u8)) {
        assert_eq!(parse_time(raw), Ok(expected));
    }

    #[rstest]
    #[case("9:00")]
    #[case("09:0")]
    #[case("0900")]
    #[case("09:00:00")]
    #[case("ab:cd")]
    #[case("")]
    #[case(" 09:00")]
    fn parse_time_rejects_malformed_values(#[case] raw: &str) {
        assert!(matches!(
            parse_time(raw),
            Err(TimeWindowError::InvalidFormat { .. })
        ));
    }

    #[rstest]
    #[case("24:00")]
    #[case("12:60")]
    #[case("99:99")]
    fn parse_time_rejects_out_of_range_values(#[case] raw: &str) {
        assert!(matches!(
            parse_time(raw),
            Err(TimeWindowError::OutOfRange { .. })
        ));
    }

    #[rstest]
    fn minutes_between_counts_forward_and_backward() {
        assert_eq!(minutes_between(t("09:00"), t("17:00")), 480);
        assert_eq!(minutes_between(t("10:30"), t("10:00")), -30);
    }

    #[rstest]
    #[case((9, 10), (10, 11), false)]
    #[case((10, 11), (9, 10), false)]
    #[case((9, 11), (10, 12), true)]
    #[case((9, 12), (10, 11), true)]
    #[case((9, 10), (9, 10), true)]
    #[case((9, 10), (11, 12), false)]
    fn overlaps_is_half_open_and_symmetric(
        #[case] a: (u32, u32),
        #[case] b: (u32, u32),
        #[case] expected: bool,
    ) {
        assert_eq!(overlaps(a.0, a.1, b.0, b.1), expected);
        assert_eq!(overlaps(b.0, b.1, a.0, a.1), expected);
    }

    #[rstest]
    fn overlap_symmetry_holds_over_a_grid() {
        let points = [0_u32, 15, 30, 45, 60, 90];
        for &sa in &points {
            for &ea in points.iter().filter(|&&e| e > sa) {
                for &sb in &points {
                    for &eb in points.iter().filter(|&&e| e > sb) {
                        assert_eq!(overlaps(sa, ea, sb, eb), overlaps(sb, eb, sa, ea));
                    }
                }
            }
        }
    }

    #[rstest]
    fn checked_add_stops_before_midnight() {
        assert_eq!(t("16:30").checked_add_minutes(30), Some(t("17:00")));
        assert_eq!(t("23:30").checked_add_minutes(29), Some(t("23:59")));
        assert_eq!(t("23:30").checked_add_minutes(30), None);
    }

    #[rstest]
    fn clock_time_serialises_as_hh_mm() {
        let json = serde_json::to_string(&t("08:05")).expect("serialise");
        assert_eq!(json, "\"08:05\"");
        let parsed: ClockTime = serde_json::from_str("\"17:45\"").expect("deserialise");
        assert_eq!(parsed, t("17:45"));
        assert!(serde_json::from_str::<ClockTime>("\"25:00\"").is_err());
    }

    #[rstest]
    fn from_naive_time_truncates_seconds() {
        let time = NaiveTime::from_hms_opt(10, 15, 42).expect("valid time");
        assert_eq!(ClockTime::from_naive_time(time), t("10:15"));
    }
}
