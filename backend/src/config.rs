//! Booking policy configuration loaded via OrthoConfig.
//!
//! Values come from `SALON_*` environment variables or a configuration file;
//! anything left unset falls back to the salon defaults.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    BookingPolicy, BookingPolicyError, DEFAULT_CANCEL_LEAD_MINUTES, DEFAULT_CONFIRM_LEAD_MINUTES,
    DEFAULT_MODIFY_LEAD_MINUTES, DEFAULT_SLOT_MINUTES,
};

fn default_fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("salon.json")
}

/// Configuration values controlling booking rules.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SALON")]
pub struct BookingSettings {
    /// Slot length used when an availability request names none.
    pub default_slot_minutes: Option<u32>,
    /// Minimum notice for confirming an appointment.
    pub confirm_lead_minutes: Option<i64>,
    /// Minimum notice for cancelling an appointment.
    pub cancel_lead_minutes: Option<i64>,
    /// Minimum notice for changing an appointment.
    pub modify_lead_minutes: Option<i64>,
    /// Offset of the salon's wall clock from UTC.
    pub utc_offset_minutes: Option<i32>,
    /// Seed data for the in-memory store.
    pub fixture_path: Option<PathBuf>,
}

impl BookingSettings {
    pub fn default_slot_minutes(&self) -> u32 {
        self.default_slot_minutes.unwrap_or(DEFAULT_SLOT_MINUTES)
    }

    pub fn confirm_lead_minutes(&self) -> i64 {
        self.confirm_lead_minutes
            .unwrap_or(DEFAULT_CONFIRM_LEAD_MINUTES)
    }

    pub fn cancel_lead_minutes(&self) -> i64 {
        self.cancel_lead_minutes.unwrap_or(DEFAULT_CANCEL_LEAD_MINUTES)
    }

    pub fn modify_lead_minutes(&self) -> i64 {
        self.modify_lead_minutes.unwrap_or(DEFAULT_MODIFY_LEAD_MINUTES)
    }

    pub fn utc_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes.unwrap_or(0)
    }

    /// Return the configured fixture path, falling back to the bundled one.
    pub fn fixture_path(&self) -> PathBuf {
        self.fixture_path.clone().unwrap_or_else(default_fixture_path)
    }

    /// Validate the settings into a [`BookingPolicy`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use salon_backend::config::BookingSettings;
    ///
    /// let settings = BookingSettings {
    ///     utc_offset_minutes: Some(120),
    ///     ..BookingSettings::default()
    /// };
    /// let policy = settings.to_policy()?;
    /// assert_eq!(policy.confirm_lead().num_minutes(), 60);
    /// # Ok::<(), salon_backend::domain::BookingPolicyError>(())
    /// ```
    pub fn to_policy(&self) -> Result<BookingPolicy, BookingPolicyError> {
        BookingPolicy::new(
            self.default_slot_minutes(),
            self.confirm_lead_minutes(),
            self.cancel_lead_minutes(),
            self.modify_lead_minutes(),
            self.utc_offset_minutes(),
        )
    }
}
