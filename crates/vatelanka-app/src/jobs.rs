//! Background jobs.
//!
//! The reminder refresh also runs whenever the schedule view loads; the
//! cron job is the explicit rollover tick for devices that stay open
//! across midnight.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use vatelanka_notify::{refresh_daily_reminders, LocalNotifier};
use vatelanka_store::schedules::fetch_user_schedules;
use vatelanka_store::{AuthClient, DocumentStore, KeyValueStore};

use crate::session::{Session, SessionError};

/// Default daily refresh moment, shortly after midnight local time.
const DAILY_REFRESH_CRON: &str = "0 5 0 * * *";

/// Build a scheduler carrying the daily reminder-rollover job. The caller
/// starts and shuts it down.
///
/// # Errors
///
/// Returns a [`JobSchedulerError`] when the scheduler or job cannot be
/// constructed.
pub async fn build_scheduler<S, A, K, N>(
    session: Arc<Session<S, A, K, N>>,
) -> Result<JobScheduler, JobSchedulerError>
where
    S: DocumentStore + 'static,
    A: AuthClient + 'static,
    K: KeyValueStore + 'static,
    N: LocalNotifier + 'static,
{
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(DAILY_REFRESH_CRON, move |_uuid, _lock| {
        let session = Arc::clone(&session);

        Box::pin(async move {
            tracing::info!("scheduler: starting daily reminder refresh");
            match run_daily_refresh(&session).await {
                Ok(()) => tracing::info!("scheduler: daily reminder refresh complete"),
                Err(e) => tracing::warn!(error = %e, "scheduler: daily reminder refresh failed"),
            }
        })
    })?;
    scheduler.add(job).await?;

    Ok(scheduler)
}

/// One rollover pass: re-fetch the signed-in user's rules and refresh
/// today's reminders.
///
/// # Errors
///
/// Surfaces auth, store, and notification failures; the cron wrapper logs
/// them and waits for the next tick.
pub async fn run_daily_refresh<S, A, K, N>(
    session: &Session<S, A, K, N>,
) -> Result<(), SessionError>
where
    S: DocumentStore,
    A: AuthClient,
    K: KeyValueStore,
    N: LocalNotifier,
{
    let uid = session.require_uid().await?;
    let rules = fetch_user_schedules(session.store.as_ref(), &uid).await?;
    refresh_daily_reminders(
        session.kv.as_ref(),
        session.notifier.as_ref(),
        &rules,
        session.clock.as_ref(),
        &session.config,
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use vatelanka_core::{Clock, Coordinate, EngineConfig, FixedClock, WardPlacement};
    use vatelanka_notify::RecordingNotifier;
    use vatelanka_store::kv::NOTIFICATIONS_ENABLED_KEY;
    use vatelanka_store::profile::{confirm_home_location, save_user_data, NewUser};
    use vatelanka_store::{paths, KeyValueStore as _, MemoryAuth, MemoryKv, MemoryStore};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn placement() -> WardPlacement {
        WardPlacement {
            municipal_council: "CMC".to_string(),
            district: "D1".to_string(),
            ward: "W3".to_string(),
        }
    }

    async fn signed_in_session() -> (
        Session<MemoryStore, MemoryAuth, MemoryKv, RecordingNotifier>,
        MemoryStore,
        MemoryKv,
        RecordingNotifier,
    ) {
        let store = MemoryStore::new();
        let kv = MemoryKv::new();
        let notifier = RecordingNotifier::new();
        let auth = MemoryAuth::new();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(monday(), 0, 5));

        auth.sign_up("amal@example.com", "pw").await.unwrap();
        auth.mark_verified("amal@example.com");
        let user = auth.login("amal@example.com", "pw").await.unwrap();

        save_user_data(
            &store,
            &user.uid,
            &NewUser {
                name: "Amal".to_string(),
                email: "amal@example.com".to_string(),
                municipal_council: "CMC".to_string(),
            },
            "2025-01-06T00:00:00Z".parse().unwrap(),
        )
        .await
        .unwrap();
        confirm_home_location(
            &store,
            &user.uid,
            &placement(),
            Coordinate {
                latitude: 6.9271,
                longitude: 79.8612,
            },
            "2025-01-06T00:00:00Z".parse().unwrap(),
        )
        .await
        .unwrap();

        let session = Session::new(
            EngineConfig::default(),
            store.clone(),
            auth,
            kv.clone(),
            notifier.clone(),
            clock,
        );
        (session, store, kv, notifier)
    }

    #[tokio::test]
    async fn refresh_pass_schedules_todays_reminders() {
        let (session, store, kv, notifier) = signed_in_session().await;
        kv.set(NOTIFICATIONS_ENABLED_KEY, "true").await.unwrap();
        store
            .add_doc(
                &paths::schedules(&placement()),
                json!({
                    "wasteType": "Degradable",
                    "day": "All",
                    "frequency": "Daily",
                    "timeSlot": { "start": "08:00", "end": "10:00" }
                }),
            )
            .await
            .unwrap();

        run_daily_refresh(&session).await.unwrap();
        let pending = notifier.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].identifier, "Degradable-2025-01-06-08:00");
    }

    #[tokio::test]
    async fn refresh_pass_requires_a_signed_in_user() {
        let store = MemoryStore::new();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(monday(), 0, 5));
        let session = Session::new(
            EngineConfig::default(),
            store,
            MemoryAuth::new(),
            MemoryKv::new(),
            RecordingNotifier::new(),
            clock,
        );
        let result = run_daily_refresh(&session).await;
        assert!(matches!(result, Err(SessionError::NotSignedIn)));
    }

    #[tokio::test]
    async fn scheduler_builds_with_the_daily_job() {
        let (session, _store, _kv, _notifier) = signed_in_session().await;
        let scheduler = build_scheduler(Arc::new(session)).await;
        assert!(scheduler.is_ok());
    }
}
