//! JSON seed files for the in-memory store.
//!
//! A fixture lists schedules, holidays, status records, known users and
//! services, and existing appointment snapshots. Every entry is validated
//! through the domain constructors before it reaches the store.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::SalonStore;
use crate::domain::{
    Appointment, AppointmentId, AppointmentSnapshot, AppointmentStatus, AppointmentStatusError,
    AppointmentStatusName, AppointmentValidationError, Holiday, Schedule, ScheduleDraft,
    ScheduleId, ScheduleValidationError, ServiceId, StatusId, UserId,
};

/// Errors raised while loading a fixture.
#[derive(Debug, Error)]
pub enum SalonFixtureError {
    #[error("failed to read fixture {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("fixture is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("schedule {schedule_id} is invalid: {source}")]
    Schedule {
        schedule_id: ScheduleId,
        #[source]
        source: ScheduleValidationError,
    },
    #[error("status record {status_id} is invalid: {source}")]
    Status {
        status_id: StatusId,
        #[source]
        source: AppointmentStatusError,
    },
    #[error("appointment {appointment_id} is invalid: {source}")]
    Appointment {
        appointment_id: AppointmentId,
        #[source]
        source: AppointmentValidationError,
    },
    #[error("appointment {appointment_id} references unknown status {status_id} ({status})")]
    UnknownStatus {
        appointment_id: AppointmentId,
        status_id: StatusId,
        status: AppointmentStatusName,
    },
}

/// Status record as written in a fixture.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSeed {
    pub id: StatusId,
    pub name: AppointmentStatusName,
    #[serde(default)]
    pub description: Option<String>,
}

/// Parsed, not yet validated, fixture file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SalonFixture {
    #[serde(default)]
    pub schedules: Vec<ScheduleDraft>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    /// Defaults to one fresh record per status when empty.
    #[serde(default)]
    pub statuses: Vec<StatusSeed>,
    #[serde(default)]
    pub users: Vec<UserId>,
    #[serde(default)]
    pub services: Vec<ServiceId>,
    #[serde(default)]
    pub appointments: Vec<AppointmentSnapshot>,
}

impl SalonFixture {
    pub fn from_json(json: &str) -> Result<Self, SalonFixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a fixture file.
    pub fn load(path: &Path) -> Result<Self, SalonFixtureError> {
        let read_error = |source| SalonFixtureError::Read {
            path: path.to_path_buf(),
            source,
        };
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            read_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "fixture path must name a file",
            ))
        })?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let contents = directory
            .read_to_string(Path::new(file_name))
            .map_err(read_error)?;
        Self::from_json(&contents)
    }

    /// Validate every entry and build a populated store.
    ///
    /// `now` stamps the creation time of schedule records.
    pub fn into_store(self, now: DateTime<Utc>) -> Result<SalonStore, SalonFixtureError> {
        let store = SalonStore::default();

        let statuses = if self.statuses.is_empty() {
            AppointmentStatus::seed_defaults()
        } else {
            self.statuses
                .into_iter()
                .map(|seed| {
                    AppointmentStatus::from_name(seed.id, seed.name, seed.description).map_err(
                        |source| SalonFixtureError::Status {
                            status_id: seed.id,
                            source,
                        },
                    )
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        for draft in self.schedules {
            let schedule_id = draft.id;
            let schedule = Schedule::new(draft, now).map_err(|source| {
                SalonFixtureError::Schedule {
                    schedule_id,
                    source,
                }
            })?;
            store.add_schedule(schedule);
        }
        for holiday in self.holidays {
            store.add_holiday(holiday);
        }
        for user_id in self.users {
            store.add_user(user_id);
        }
        for service_id in self.services {
            store.add_service(service_id);
        }

        for snapshot in self.appointments {
            let known = statuses.iter().any(|status| {
                status.id() == snapshot.status_id && status.name() == snapshot.status
            });
            if !known {
                return Err(SalonFixtureError::UnknownStatus {
                    appointment_id: snapshot.id,
                    status_id: snapshot.status_id,
                    status: snapshot.status,
                });
            }
            let appointment_id = snapshot.id;
            let appointment = Appointment::from_snapshot(snapshot).map_err(|source| {
                SalonFixtureError::Appointment {
                    appointment_id,
                    source,
                }
            })?;
            store.add_appointment(appointment);
        }
        for status in statuses {
            store.add_status(status);
        }
        Ok(store)
    }
}
