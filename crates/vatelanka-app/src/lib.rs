//! Application flows for the VateLanka client engine.
//!
//! Each module is one user-facing flow wired over an explicit [`Session`]:
//! the home overview, the projected schedule with its reminder rollover,
//! live truck tracking, missed-collection reports, the cached news feed,
//! and the midnight refresh job.

pub mod home;
pub mod jobs;
pub mod news;
pub mod report;
pub mod schedule_flow;
pub mod session;
pub mod telemetry;
pub mod tracking;

pub use home::{greeting, home_overview, HomeOverview, SUB_GREETINGS};
pub use jobs::{build_scheduler, run_daily_refresh};
pub use news::{NewsClient, NewsError, NewsItem};
pub use report::{allowed_waste_types, submit_missed_collection};
pub use schedule_flow::load_schedule;
pub use session::{Session, SessionError};
pub use telemetry::init_tracing;
pub use tracking::{start_tracking, TrackingHandle};
