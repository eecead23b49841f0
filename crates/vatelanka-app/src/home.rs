//! Home-screen content: greeting, rotating sub-greeting, profile summary.

use chrono::NaiveDateTime;
use rand::Rng;

use vatelanka_core::{Clock, UserProfile};
use vatelanka_store::kv::{KeyValueStore, SUB_GREETING_KEY, SUB_GREETING_TIMESTAMP_KEY};
use vatelanka_store::profile::fetch_user_profile;
use vatelanka_store::{AuthClient, DocumentStore};

use crate::session::Session;
use vatelanka_notify::LocalNotifier;

/// Rotating second line under the greeting.
pub const SUB_GREETINGS: &[&str] = &[
    "Let's keep our city clean today.",
    "Every sorted bin counts.",
    "Your ward thanks you for recycling.",
    "Small habits, cleaner streets.",
];

/// Time-of-day greeting: morning before 12:00, afternoon before 18:00,
/// evening otherwise.
#[must_use]
pub fn greeting(now: NaiveDateTime) -> &'static str {
    use chrono::Timelike;
    match now.hour() {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// What the home screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeOverview {
    pub greeting: String,
    pub sub_greeting: String,
    /// `None` when the profile fetch failed; the view degrades instead of
    /// erroring.
    pub profile: Option<UserProfile>,
}

/// Assemble the home screen for the signed-in user.
///
/// The profile fetch and the sub-greeting refresh run as one parallel
/// batch. A failing profile fetch is logged and leaves `profile` empty; a
/// failing sub-greeting cache falls back to the first entry.
pub async fn home_overview<S, A, K, N>(
    session: &Session<S, A, K, N>,
    uid: &str,
) -> HomeOverview
where
    S: DocumentStore,
    A: AuthClient,
    K: KeyValueStore,
    N: LocalNotifier,
{
    let today = session.clock.today();
    let (profile, sub_greeting) = tokio::join!(
        fetch_user_profile(session.store.as_ref(), uid),
        daily_sub_greeting(session.kv.as_ref(), today),
    );

    let profile = match profile {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "profile fetch failed; rendering home without it");
            None
        }
    };

    HomeOverview {
        greeting: greeting(session.clock.now()).to_string(),
        sub_greeting,
        profile,
    }
}

/// Today's sub-greeting: cached per calendar day, re-rolled on a new day.
async fn daily_sub_greeting<K: KeyValueStore>(kv: &K, today: chrono::NaiveDate) -> String {
    let marker = today.to_string();
    match cached_sub_greeting(kv, &marker).await {
        Ok(Some(cached)) => return cached,
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "sub-greeting cache unavailable");
            return SUB_GREETINGS[0].to_string();
        }
    }

    let pick = SUB_GREETINGS[rand::rng().random_range(0..SUB_GREETINGS.len())].to_string();
    let stored = kv.set(SUB_GREETING_KEY, &pick).await;
    let stamped = kv.set(SUB_GREETING_TIMESTAMP_KEY, &marker).await;
    if let Err(e) = stored.and(stamped) {
        tracing::warn!(error = %e, "sub-greeting cache write failed");
    }
    pick
}

async fn cached_sub_greeting<K: KeyValueStore>(
    kv: &K,
    marker: &str,
) -> Result<Option<String>, vatelanka_store::StoreError> {
    if kv.get(SUB_GREETING_TIMESTAMP_KEY).await?.as_deref() == Some(marker) {
        return Ok(kv.get(SUB_GREETING_KEY).await?);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::session::Session;
    use vatelanka_core::{EngineConfig, FixedClock};
    use vatelanka_notify::RecordingNotifier;
    use vatelanka_store::profile::{save_user_data, NewUser};
    use vatelanka_store::{MemoryAuth, MemoryKv, MemoryStore};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn at(hour: u32) -> NaiveDateTime {
        monday().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn session_at(
        hour: u32,
    ) -> (
        Session<MemoryStore, MemoryAuth, MemoryKv, RecordingNotifier>,
        MemoryStore,
        MemoryKv,
        Arc<FixedClock>,
    ) {
        let store = MemoryStore::new();
        let kv = MemoryKv::new();
        let clock = Arc::new(FixedClock::at(monday(), hour, 0));
        let session = Session::new(
            EngineConfig::default(),
            store.clone(),
            MemoryAuth::new(),
            kv.clone(),
            RecordingNotifier::new(),
            Arc::clone(&clock) as Arc<dyn vatelanka_core::Clock>,
        );
        (session, store, kv, clock)
    }

    #[test]
    fn greeting_tracks_the_hour() {
        assert_eq!(greeting(at(7)), "Good morning");
        assert_eq!(greeting(at(11)), "Good morning");
        assert_eq!(greeting(at(12)), "Good afternoon");
        assert_eq!(greeting(at(17)), "Good afternoon");
        assert_eq!(greeting(at(18)), "Good evening");
        assert_eq!(greeting(at(23)), "Good evening");
    }

    #[tokio::test]
    async fn sub_greeting_is_stable_within_a_day_and_rolls_over() {
        let (session, _store, kv, clock) = session_at(8);
        let first = home_overview(&session, "u1").await.sub_greeting;
        assert!(SUB_GREETINGS.contains(&first.as_str()));

        let again = home_overview(&session, "u1").await.sub_greeting;
        assert_eq!(first, again);
        assert_eq!(
            kv.get(SUB_GREETING_TIMESTAMP_KEY).await.unwrap().as_deref(),
            Some("2025-01-06")
        );

        clock.advance(chrono::Duration::days(1));
        home_overview(&session, "u1").await;
        assert_eq!(
            kv.get(SUB_GREETING_TIMESTAMP_KEY).await.unwrap().as_deref(),
            Some("2025-01-07")
        );
    }

    #[tokio::test]
    async fn overview_carries_the_profile_when_present() {
        let (session, store, _kv, _clock) = session_at(9);
        save_user_data(
            &store,
            "u1",
            &NewUser {
                name: "Amal".to_string(),
                email: "amal@example.com".to_string(),
                municipal_council: "CMC".to_string(),
            },
            "2025-01-06T06:00:00Z".parse().unwrap(),
        )
        .await
        .unwrap();

        let overview = home_overview(&session, "u1").await;
        assert_eq!(overview.greeting, "Good morning");
        assert_eq!(overview.profile.unwrap().name, "Amal");
    }

    #[tokio::test]
    async fn overview_degrades_without_a_profile() {
        let (session, _store, _kv, _clock) = session_at(19);
        let overview = home_overview(&session, "ghost").await;
        assert_eq!(overview.greeting, "Good evening");
        assert!(overview.profile.is_none());
    }
}
