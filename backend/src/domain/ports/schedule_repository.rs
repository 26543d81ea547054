//! Port for working-hours schedules and holiday lookups.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{DayOfWeek, Holiday, Schedule};

use super::define_port_error;

define_port_error! {
    /// Errors raised by schedule repository adapters.
    pub enum ScheduleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "schedule repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "schedule repository query failed: {message}",
    }
}

/// Port for reading schedules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Every schedule for a weekday, regular and holiday-bound, in storage
    /// order.
    async fn find_by_day_of_week(
        &self,
        day: DayOfWeek,
    ) -> Result<Vec<Schedule>, ScheduleRepositoryError>;

    /// Holiday falling on `date`, if any.
    async fn find_holiday_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<Holiday>, ScheduleRepositoryError>;
}

/// Fixture implementation describing a salon that is always closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureScheduleRepository;

#[async_trait]
impl ScheduleRepository for FixtureScheduleRepository {
    async fn find_by_day_of_week(
        &self,
        _day: DayOfWeek,
    ) -> Result<Vec<Schedule>, ScheduleRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_holiday_by_date(
        &self,
        _date: NaiveDate,
    ) -> Result<Option<Holiday>, ScheduleRepositoryError> {
        Ok(None)
    }
}
