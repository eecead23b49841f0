//! The schedule view: projected calendar plus the daily reminder refresh.

use vatelanka_core::{schedule, Clock, ProjectedEvent};
use vatelanka_notify::{refresh_daily_reminders, LocalNotifier};
use vatelanka_store::schedules::fetch_user_schedules;
use vatelanka_store::{AuthClient, DocumentStore, KeyValueStore, StoreError};

use crate::session::Session;

/// Load the user's projected schedule and roll today's reminders over.
///
/// The reminder refresh is best-effort: a notification failure is logged
/// and the schedule view still renders.
///
/// # Errors
///
/// [`StoreError::LocationNotSet`] until the ward assignment is complete;
/// otherwise a [`StoreError`] from the rule fetch.
pub async fn load_schedule<S, A, K, N>(
    session: &Session<S, A, K, N>,
    uid: &str,
) -> Result<Vec<ProjectedEvent>, StoreError>
where
    S: DocumentStore,
    A: AuthClient,
    K: KeyValueStore,
    N: LocalNotifier,
{
    let rules = fetch_user_schedules(session.store.as_ref(), uid).await?;
    let events = schedule::project(&rules, session.clock.today(), session.config.horizon_days);

    if let Err(e) = refresh_daily_reminders(
        session.kv.as_ref(),
        session.notifier.as_ref(),
        &rules,
        session.clock.as_ref(),
        &session.config,
    )
    .await
    {
        tracing::warn!(error = %e, "reminder refresh failed; schedule view unaffected");
    }

    Ok(events)
}
