//! Driving port for slot availability lookups.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AvailabilityReport, Error, ServiceId, UserId};

/// Request for the availability of one salon day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub date: NaiveDate,
    /// Slot length; the policy default applies when absent.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub stylist_id: Option<UserId>,
    /// Checked for existence only.
    #[serde(default)]
    pub service_ids: Vec<ServiceId>,
}

/// Driving port for availability reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityQuery: Send + Sync {
    /// Report which slots on `request.date` can still be booked.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use chrono::NaiveDate;
    /// # use salon_backend::domain::Error;
    /// # use salon_backend::domain::ports::{AvailabilityQuery, AvailabilityRequest};
    /// # async fn example(query: &dyn AvailabilityQuery) -> Result<(), Error> {
    /// let report = query
    ///     .get_available_slots(AvailabilityRequest {
    ///         date: NaiveDate::from_ymd_opt(2024, 6, 10).expect("valid date"),
    ///         duration_minutes: Some(60),
    ///         stylist_id: None,
    ///         service_ids: Vec::new(),
    ///     })
    ///     .await?;
    /// println!("{} of {} slots free", report.available_slots, report.total_slots);
    /// # Ok(())
    /// # }
    /// ```
    async fn get_available_slots(
        &self,
        request: AvailabilityRequest,
    ) -> Result<AvailabilityReport, Error>;
}
