//! Tests for the availability query service.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    AppointmentRepositoryError, MockAppointmentRepository, MockReferenceDirectory,
    MockScheduleRepository, ScheduleRepositoryError,
};
use crate::domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentStatus, AppointmentStatusName,
    DayOfWeek, ErrorCode, Holiday, HolidayId, Schedule, ScheduleDraft, ScheduleId, ServiceId,
    StatusId, UserId,
};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date")
}

fn monday_at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn schedule(start: &str, end: &str, holiday_id: Option<HolidayId>) -> Schedule {
    Schedule::new(
        ScheduleDraft {
            id: ScheduleId::random(),
            day_of_week: DayOfWeek::Monday,
            start_time: start.to_owned(),
            end_time: end.to_owned(),
            holiday_id,
        },
        monday_at(0, 0) - TimeDelta::days(30),
    )
    .expect("valid schedule")
}

fn booking(start: DateTime<Utc>, minutes: u32, stylist_id: UserId) -> Appointment {
    Appointment::new(
        AppointmentDraft {
            id: AppointmentId::random(),
            start_time: start,
            duration_minutes: minutes,
            organizer_id: UserId::random(),
            client_id: UserId::random(),
            stylist_id: Some(stylist_id),
            schedule_id: ScheduleId::random(),
            status: AppointmentStatus::from_name(
                StatusId::random(),
                AppointmentStatusName::Pending,
                None,
            )
            .expect("valid status"),
            service_ids: vec![ServiceId::random()],
        },
        start - TimeDelta::days(3),
    )
    .expect("valid appointment")
}

fn schedules_with(regular: Vec<Schedule>, holiday: Option<Holiday>) -> MockScheduleRepository {
    let mut schedules = MockScheduleRepository::new();
    schedules
        .expect_find_holiday_by_date()
        .return_once(move |_| Ok(holiday));
    schedules
        .expect_find_by_day_of_week()
        .return_once(move |_| Ok(regular));
    schedules
}

fn open_directory() -> MockReferenceDirectory {
    let mut directory = MockReferenceDirectory::new();
    directory.expect_user_exists().returning(|_| Ok(true));
    directory.expect_service_exists().returning(|_| Ok(true));
    directory
}

fn service(
    appointments: MockAppointmentRepository,
    schedules: MockScheduleRepository,
    directory: MockReferenceDirectory,
) -> AvailabilityService<MockAppointmentRepository, MockScheduleRepository, MockReferenceDirectory>
{
    AvailabilityService::new(
        Arc::new(appointments),
        Arc::new(schedules),
        Arc::new(directory),
        BookingPolicy::default(),
    )
}

fn request(duration_minutes: Option<u32>, stylist_id: Option<UserId>) -> AvailabilityRequest {
    AvailabilityRequest {
        date: monday(),
        duration_minutes,
        stylist_id,
        service_ids: Vec::new(),
    }
}

#[rstest]
#[tokio::test]
async fn reports_booked_slots_for_a_working_day() {
    let stylist = UserId::random();
    let taken = booking(monday_at(10, 0), 60, stylist);
    let taken_id = taken.id();

    let mut appointments = MockAppointmentRepository::new();
    appointments
        .expect_find_by_date()
        .withf(|date, _| *date == monday())
        .times(1)
        .return_once(move |_, _| Ok(vec![taken]));

    let report = service(
        appointments,
        schedules_with(vec![schedule("09:00", "17:00", None)], None),
        open_directory(),
    )
    .get_available_slots(request(Some(30), Some(stylist)))
    .await
    .expect("report");

    assert!(report.is_working_day);
    assert_eq!(report.total_slots, 16);
    assert_eq!(report.available_slots, 14);
    let blocked: Vec<_> = report
        .slots
        .iter()
        .filter(|slot| !slot.available)
        .map(|slot| slot.start.to_string())
        .collect();
    assert_eq!(blocked, vec!["10:00", "10:30"]);
    assert_eq!(
        report.slots[2].conflict.as_ref().map(|c| c.appointment_id),
        Some(taken_id)
    );
}

#[rstest]
#[tokio::test]
async fn uses_the_policy_slot_length_by_default() {
    let mut appointments = MockAppointmentRepository::new();
    appointments
        .expect_find_by_date()
        .return_once(|_, _| Ok(Vec::new()));

    let report = service(
        appointments,
        schedules_with(vec![schedule("09:00", "12:00", None)], None),
        open_directory(),
    )
    .get_available_slots(request(None, None))
    .await
    .expect("report");

    assert_eq!(report.slot_minutes, 30);
    assert_eq!(report.total_slots, 6);
    assert_eq!(report.available_slots, 6);
}

#[rstest]
#[tokio::test]
async fn closed_days_skip_the_booking_lookup() {
    let mut appointments = MockAppointmentRepository::new();
    appointments.expect_find_by_date().times(0);

    let report = service(appointments, schedules_with(Vec::new(), None), open_directory())
        .get_available_slots(request(Some(60), None))
        .await
        .expect("report");

    assert!(!report.is_working_day);
    assert!(report.working_hours.is_none());
    assert!(report.slots.is_empty());
}

#[rstest]
#[tokio::test]
async fn holidays_use_their_own_schedule() {
    let holiday = Holiday {
        id: HolidayId::random(),
        date: monday(),
        name: "Midsummer".to_owned(),
    };
    let short_day = schedule("10:00", "12:00", Some(holiday.id));
    let mut appointments = MockAppointmentRepository::new();
    appointments
        .expect_find_by_date()
        .return_once(|_, _| Ok(Vec::new()));

    let report = service(
        appointments,
        schedules_with(
            vec![schedule("09:00", "17:00", None), short_day],
            Some(holiday),
        ),
        open_directory(),
    )
    .get_available_slots(request(Some(60), None))
    .await
    .expect("report");

    assert_eq!(report.total_slots, 2);
    assert_eq!(
        report.working_hours.map(|hours| hours.start.to_string()),
        Some("10:00".to_owned())
    );
}

#[rstest]
#[case(10)]
#[case(25)]
#[case(495)]
#[tokio::test]
async fn rejects_invalid_slot_lengths(#[case] minutes: u32) {
    let error = service(
        MockAppointmentRepository::new(),
        MockScheduleRepository::new(),
        open_directory(),
    )
    .get_available_slots(request(Some(minutes), None))
    .await
    .expect_err("invalid duration");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn unknown_stylists_are_not_found() {
    let mut directory = MockReferenceDirectory::new();
    directory.expect_user_exists().return_once(|_| Ok(false));

    let error = service(
        MockAppointmentRepository::new(),
        MockScheduleRepository::new(),
        directory,
    )
    .get_available_slots(request(None, Some(UserId::random())))
    .await
    .expect_err("unknown stylist");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn repository_failures_are_mapped() {
    let mut schedules = MockScheduleRepository::new();
    schedules
        .expect_find_holiday_by_date()
        .return_once(|_| Err(ScheduleRepositoryError::connection("refused")));
    let error = service(MockAppointmentRepository::new(), schedules, open_directory())
        .get_available_slots(request(None, None))
        .await
        .expect_err("schedule outage");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);

    let mut appointments = MockAppointmentRepository::new();
    appointments
        .expect_find_by_date()
        .return_once(|_, _| Err(AppointmentRepositoryError::query("bad row")));
    let error = service(
        appointments,
        schedules_with(vec![schedule("09:00", "17:00", None)], None),
        open_directory(),
    )
    .get_available_slots(request(None, None))
    .await
    .expect_err("appointment query failure");
    assert_eq!(error.code(), ErrorCode::InternalError);
}
