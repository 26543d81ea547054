//! Domain primitives, aggregates and services for salon booking.
//!
//! Purpose: model schedules, appointment statuses and appointments with
//! their invariants, and orchestrate the booking lifecycle over the ports in
//! [`ports`]. Types validate on construction and keep their fields private
//! where an invariant must hold.
//!
//! Public surface:
//! - Error (alias to `error::Error`) - transport-agnostic failure payload.
//! - Appointment, Schedule, AppointmentStatus - the booking aggregates.
//! - AvailabilityCalculator - pure slot availability.
//! - AppointmentService, AvailabilityService - driving port implementations.

pub mod appointment;
pub mod appointment_status;
pub mod availability;
pub mod booking_policy;
pub mod error;
pub mod ids;
pub mod ports;
pub mod schedule;
pub mod time_window;

mod appointment_service;
mod availability_service;
mod booking_service_support;

pub use self::appointment::{
    Appointment, AppointmentDraft, AppointmentDuration, AppointmentSnapshot,
    AppointmentValidationError, DEFAULT_MODIFY_LEAD_MINUTES,
};
pub use self::appointment_service::AppointmentService;
pub use self::appointment_status::{
    AppointmentStatus, AppointmentStatusError, AppointmentStatusName, StatusTransitionError,
};
pub use self::availability::{
    AvailabilityCalculator, AvailabilityReport, SlotAvailability, SlotConflict, SlotQuery,
    WorkingHours,
};
pub use self::availability_service::AvailabilityService;
pub use self::booking_policy::{
    BookingPolicy, BookingPolicyError, DEFAULT_CANCEL_LEAD_MINUTES, DEFAULT_CONFIRM_LEAD_MINUTES,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{
    AppointmentId, HolidayId, IdValidationError, ScheduleId, ServiceId, StatusId, UserId,
};
pub use self::schedule::{
    DEFAULT_SLOT_MINUTES, DayOfWeek, Holiday, MIN_SCHEDULE_MINUTES, ParseDayOfWeekError,
    Schedule, ScheduleDraft, ScheduleValidationError, resolve_schedule,
};
pub use self::time_window::{ClockTime, TimeWindowError, minutes_between, overlaps, parse_time};
