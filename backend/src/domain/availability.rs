//! Slot availability for a single salon day.
//!
//! [`AvailabilityCalculator`] is a pure function of the governing
//! [`Schedule`], the day's bookings and a [`SlotQuery`]. It performs no I/O;
//! the availability service gathers its inputs from the repositories.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::schedule::{DayOfWeek, Schedule, ScheduleValidationError};
use super::time_window::ClockTime;
use super::{Appointment, AppointmentId, BookingPolicy, UserId};

/// Parameters of an availability lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub slot_minutes: u32,
    pub stylist_id: Option<UserId>,
}

/// Working-hours block of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub start: ClockTime,
    pub end: ClockTime,
}

/// Booking that makes a slot unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotConflict {
    pub appointment_id: AppointmentId,
    pub reason: String,
}

/// One candidate slot and whether it can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub start: ClockTime,
    pub end: ClockTime,
    pub starts_at: DateTime<Utc>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<SlotConflict>,
}

/// Availability of every slot on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub is_working_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<WorkingHours>,
    pub slot_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylist_id: Option<UserId>,
    pub total_slots: usize,
    pub available_slots: usize,
    pub slots: Vec<SlotAvailability>,
}

/// Marks each schedule slot as free or taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityCalculator {
    policy: BookingPolicy,
}

impl AvailabilityCalculator {
    pub fn new(policy: BookingPolicy) -> Self {
        Self { policy }
    }

    /// Build the report for `query`.
    ///
    /// `schedule` is the schedule governing `query.date`, or `None` for a
    /// closed day. Bookings in a terminal status never make a slot
    /// unavailable; neither do bookings for other stylists when a stylist
    /// filter is set. Unassigned bookings block every stylist.
    pub fn calculate(
        &self,
        query: &SlotQuery,
        schedule: Option<&Schedule>,
        booked: &[Appointment],
    ) -> Result<AvailabilityReport, ScheduleValidationError> {
        if query.slot_minutes == 0 {
            return Err(ScheduleValidationError::InvalidSlotDuration);
        }
        let Some(schedule) = schedule else {
            return Ok(self.closed_day(query));
        };

        let slot_delta = chrono::TimeDelta::minutes(i64::from(query.slot_minutes));
        let slots = schedule
            .available_slots(query.slot_minutes)?
            .into_iter()
            .filter_map(|start| {
                let end = start.checked_add_minutes(query.slot_minutes)?;
                let starts_at = self
                    .policy
                    .to_utc(query.date.and_time(start.to_naive_time()));
                let ends_at = starts_at + slot_delta;
                let conflict = booked
                    .iter()
                    .find(|appointment| {
                        appointment.blocks_interval(starts_at, ends_at, query.stylist_id)
                    })
                    .map(|appointment| SlotConflict {
                        appointment_id: appointment.id(),
                        reason: format!(
                            "overlaps appointment {} ({} - {})",
                            appointment.id(),
                            self.policy
                                .local_datetime(appointment.start_time())
                                .format("%H:%M"),
                            self.policy
                                .local_datetime(appointment.end_time())
                                .format("%H:%M"),
                        ),
                    });
                Some(SlotAvailability {
                    start,
                    end,
                    starts_at,
                    available: conflict.is_none(),
                    conflict,
                })
            })
            .collect::<Vec<_>>();

        let available_slots = slots.iter().filter(|slot| slot.available).count();
        Ok(AvailabilityReport {
            date: query.date,
            day_of_week: DayOfWeek::of(query.date),
            is_working_day: true,
            working_hours: Some(WorkingHours {
                start: schedule.start_time(),
                end: schedule.end_time(),
            }),
            slot_minutes: query.slot_minutes,
            stylist_id: query.stylist_id,
            total_slots: slots.len(),
            available_slots,
            slots,
        })
    }

    fn closed_day(&self, query: &SlotQuery) -> AvailabilityReport {
        AvailabilityReport {
            date: query.date,
            day_of_week: DayOfWeek::of(query.date),
            is_working_day: false,
            working_hours: None,
            slot_minutes: query.slot_minutes,
            stylist_id: query.stylist_id,
            total_slots: 0,
            available_slots: 0,
            slots: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::{TimeDelta, TimeZone};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{
        AppointmentDraft, AppointmentStatus, AppointmentStatusName, ScheduleDraft, ScheduleId,
        ServiceId, StatusId,
    };

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date")
    }

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, hour, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    fn status(name: AppointmentStatusName) -> AppointmentStatus {
        AppointmentStatus::from_name(StatusId::random(), name, None).expect("valid status")
    }

    fn booking(start: DateTime<Utc>, minutes: u32, stylist: UserId) -> Appointment {
        Appointment::new(
            AppointmentDraft {
                id: AppointmentId::random(),
                start_time: start,
                duration_minutes: minutes,
                organizer_id: UserId::random(),
                client_id: UserId::random(),
                stylist_id: Some(stylist),
                schedule_id: ScheduleId::random(),
                status: status(AppointmentStatusName::Pending),
                service_ids: vec![ServiceId::random()],
            },
            created_at(),
        )
        .expect("valid appointment")
    }

    #[fixture]
    fn schedule() -> Schedule {
        Schedule::new(
            ScheduleDraft {
                id: ScheduleId::random(),
                day_of_week: DayOfWeek::Monday,
                start_time: "09:00".to_owned(),
                end_time: "17:00".to_owned(),
                holiday_id: None,
            },
            created_at(),
        )
        .expect("valid schedule")
    }

    fn query(stylist_id: Option<UserId>) -> SlotQuery {
        SlotQuery {
            date: monday(),
            slot_minutes: 30,
            stylist_id,
        }
    }

    #[rstest]
    fn empty_day_is_fully_available(schedule: Schedule) {
        let report = AvailabilityCalculator::default()
            .calculate(&query(None), Some(&schedule), &[])
            .expect("report");
        assert!(report.is_working_day);
        assert_eq!(report.total_slots, 16);
        assert_eq!(report.available_slots, 16);
        assert_eq!(report.slots.first().map(|slot| slot.starts_at), Some(at(9, 0)));
    }

    #[rstest]
    fn closed_day_has_no_slots() {
        let report = AvailabilityCalculator::default()
            .calculate(&query(None), None, &[])
            .expect("report");
        assert!(!report.is_working_day);
        assert_eq!(report.total_slots, 0);
        assert_eq!(report.available_slots, 0);
        assert!(report.slots.is_empty());
        assert!(report.working_hours.is_none());
    }

    #[rstest]
    fn bookings_block_overlapping_slots(schedule: Schedule) {
        let stylist = UserId::random();
        let booked = vec![booking(at(10, 0), 60, stylist)];
        let report = AvailabilityCalculator::default()
            .calculate(&query(Some(stylist)), Some(&schedule), &booked)
            .expect("report");

        let taken: Vec<String> = report
            .slots
            .iter()
            .filter(|slot| !slot.available)
            .map(|slot| slot.start.to_string())
            .collect();
        assert_eq!(taken, vec!["10:00", "10:30"]);
        assert_eq!(report.available_slots, 14);
        let conflict = report.slots[2].conflict.as_ref().expect("conflict");
        assert_eq!(conflict.appointment_id, booked[0].id());
    }

    #[rstest]
    fn other_stylists_do_not_block_a_filtered_query(schedule: Schedule) {
        let booked = vec![booking(at(10, 0), 60, UserId::random())];
        let report = AvailabilityCalculator::default()
            .calculate(&query(Some(UserId::random())), Some(&schedule), &booked)
            .expect("report");
        assert_eq!(report.available_slots, 16);
    }

    #[rstest]
    fn unassigned_bookings_block_a_filtered_query(schedule: Schedule) {
        let mut unassigned = booking(at(10, 0), 60, UserId::random());
        unassigned.assign_stylist(None, created_at());
        let report = AvailabilityCalculator::default()
            .calculate(&query(Some(UserId::random())), Some(&schedule), &[unassigned])
            .expect("report");
        assert_eq!(report.available_slots, 14);
    }

    #[rstest]
    fn unfiltered_queries_see_every_booking(schedule: Schedule) {
        let booked = vec![booking(at(10, 0), 60, UserId::random())];
        let report = AvailabilityCalculator::default()
            .calculate(&query(None), Some(&schedule), &booked)
            .expect("report");
        assert_eq!(report.available_slots, 14);
    }

    #[rstest]
    fn cancelled_bookings_free_their_slots(schedule: Schedule) {
        let stylist = UserId::random();
        let mut cancelled = booking(at(10, 0), 60, stylist);
        cancelled
            .mark_as_cancelled(&status(AppointmentStatusName::Cancelled), created_at())
            .expect("cancel");
        let report = AvailabilityCalculator::default()
            .calculate(&query(Some(stylist)), Some(&schedule), &[cancelled])
            .expect("report");
        assert_eq!(report.available_slots, 16);
    }

    #[rstest]
    fn slots_follow_the_salon_offset(schedule: Schedule) {
        let policy = BookingPolicy::new(30, 60, 120, 1440, 2 * 60).expect("valid policy");
        let stylist = UserId::random();
        // 10:00 local at UTC+2.
        let booked = vec![booking(at(8, 0), 30, stylist)];
        let report = AvailabilityCalculator::new(policy)
            .calculate(&query(Some(stylist)), Some(&schedule), &booked)
            .expect("report");
        assert_eq!(report.slots[0].starts_at, at(7, 0));
        assert!(!report.slots[2].available);
        assert_eq!(report.available_slots, 15);
        let conflict = report.slots[2].conflict.as_ref().expect("conflict");
        assert!(
            conflict.reason.ends_with("(10:00 - 10:30)"),
            "reason should use salon hours: {}",
            conflict.reason
        );
    }

    #[rstest]
    fn hourly_slots_touching_a_booking_stay_free(schedule: Schedule) {
        let stylist = UserId::random();
        let booked = vec![booking(at(11, 0), 60, stylist)];
        let mut hourly = query(Some(stylist));
        hourly.slot_minutes = 60;
        let report = AvailabilityCalculator::default()
            .calculate(&hourly, Some(&schedule), &booked)
            .expect("report");
        assert_eq!(report.total_slots, 8);
        assert!(report.slots[1].available);
        assert!(!report.slots[2].available);
        assert!(report.slots[3].available);
        assert_eq!(report.slots[2].starts_at + TimeDelta::hours(1), at(12, 0));
    }

    #[rstest]
    fn zero_length_slots_are_rejected(schedule: Schedule) {
        let mut bad = query(None);
        bad.slot_minutes = 0;
        assert_eq!(
            AvailabilityCalculator::default().calculate(&bad, Some(&schedule), &[]),
            Err(ScheduleValidationError::InvalidSlotDuration)
        );
    }
}
