//! The explicit session object the flows hang off.
//!
//! Nothing in the workspace reaches for ambient singletons; a [`Session`]
//! is constructed once with its store, auth, key-value, notifier, and clock
//! implementations and passed to every flow. Tests build one over the
//! in-memory implementations with a pinned clock.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use vatelanka_core::{Clock, EngineConfig};
use vatelanka_notify::{LocalNotifier, NotifyError};
use vatelanka_store::{AuthClient, AuthError, DocumentStore, KeyValueStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not signed in")]
    NotSignedIn,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

pub struct Session<S, A, K, N> {
    pub config: EngineConfig,
    pub store: Arc<S>,
    pub auth: Arc<A>,
    pub kv: Arc<K>,
    pub notifier: Arc<N>,
    pub clock: Arc<dyn Clock>,
}

impl<S, A, K, N> Session<S, A, K, N>
where
    S: DocumentStore,
    A: AuthClient,
    K: KeyValueStore,
    N: LocalNotifier,
{
    pub fn new(
        config: EngineConfig,
        store: S,
        auth: A,
        kv: K,
        notifier: N,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store: Arc::new(store),
            auth: Arc::new(auth),
            kv: Arc::new(kv),
            notifier: Arc::new(notifier),
            clock,
        }
    }

    /// Uid of the signed-in user.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotSignedIn`] without an authenticated session.
    pub async fn require_uid(&self) -> Result<String, SessionError> {
        self.auth
            .current_user()
            .await
            .map(|user| user.uid)
            .ok_or(SessionError::NotSignedIn)
    }

    /// Current moment as a UTC timestamp for persisted records.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.clock.now())
    }
}
