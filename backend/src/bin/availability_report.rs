//! Print the slot availability of one salon day as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]
//!
//! # Examples
//! ```sh
//! cargo run --manifest-path backend/Cargo.toml --bin availability-report -- \
//!     --date 2024-06-10 --duration 60
//! ```

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Parser;
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use salon_backend::config::BookingSettings;
use salon_backend::domain::ports::{AvailabilityQuery, AvailabilityRequest};
use salon_backend::domain::{AvailabilityService, IdValidationError, ServiceId, UserId};
use salon_backend::outbound::memory::SalonFixture;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `availability-report` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "availability-report",
    about = "Report bookable slots for a salon day from a fixture file",
    version
)]
struct CliArgs {
    /// Salon-local date to inspect.
    #[arg(long, value_name = "yyyy-mm-dd")]
    date: NaiveDate,
    /// Slot length in minutes. Falls back to `SALON_DEFAULT_SLOT_MINUTES`.
    #[arg(long = "duration", value_name = "minutes")]
    duration_minutes: Option<u32>,
    /// Only consider bookings held by this stylist.
    #[arg(long = "stylist", value_name = "uuid", value_parser = parse_user_id)]
    stylist_id: Option<UserId>,
    /// Service the slot is for; repeatable.
    #[arg(long = "service", value_name = "uuid", value_parser = parse_service_id)]
    service_ids: Vec<ServiceId>,
    /// Fixture file. Falls back to `SALON_FIXTURE_PATH`.
    #[arg(long = "fixture", value_name = "path")]
    fixture_path: Option<PathBuf>,
}

fn parse_user_id(raw: &str) -> Result<UserId, IdValidationError> {
    UserId::new(raw)
}

fn parse_service_id(raw: &str) -> Result<ServiceId, IdValidationError> {
    ServiceId::new(raw)
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = BookingSettings::load_from_iter([OsString::from("availability-report")])
        .map_err(|error| io::Error::other(format!("load booking settings: {error}")))?;
    let policy = settings
        .to_policy()
        .map_err(|error| io::Error::other(format!("invalid booking settings: {error}")))?;

    let fixture_path = args
        .fixture_path
        .unwrap_or_else(|| settings.fixture_path());
    let store = SalonFixture::load(&fixture_path)
        .and_then(|fixture| fixture.into_store(DefaultClock.utc()))
        .map_err(|error| io::Error::other(format!("load fixture: {error}")))?;
    info!(
        fixture = %fixture_path.display(),
        appointments = store.appointment_count(),
        "salon fixture loaded"
    );

    let store = Arc::new(store);
    let query = AvailabilityService::new(store.clone(), store.clone(), store, policy);
    let report = query
        .get_available_slots(AvailabilityRequest {
            date: args.date,
            duration_minutes: args.duration_minutes,
            stylist_id: args.stylist_id,
            service_ids: args.service_ids,
        })
        .await
        .map_err(|error| io::Error::other(format!("availability query failed: {error}")))?;

    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|error| io::Error::other(format!("render report: {error}")))?;
    println!("{rendered}");
    Ok(())
}
