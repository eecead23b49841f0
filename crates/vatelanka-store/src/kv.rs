//! Local key-value persistence.
//!
//! Backs the small amount of client-side state: the notifications toggle,
//! the last-notified-date rollover marker, today's collection windows,
//! per-vehicle alert timestamps, the cached sub-greeting, and the cached
//! news feed.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;

pub const NOTIFICATIONS_ENABLED_KEY: &str = "notificationsEnabled";
pub const LAST_NOTIFICATION_DATE_KEY: &str = "lastNotificationDate";
pub const TODAY_COLLECTION_TIMES_KEY: &str = "todayCollectionTimes";
pub const SUB_GREETING_KEY: &str = "subGreeting";
pub const SUB_GREETING_TIMESTAMP_KEY: &str = "subGreetingTimestamp";
pub const CACHED_NEWS_KEY: &str = "cached_news";

/// Key holding the last proximity-alert timestamp for one vehicle.
#[must_use]
pub fn truck_alert_key(vehicle_id: &str) -> String {
    format!("last_truck_notification_{vehicle_id}")
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-memory [`KeyValueStore`].
#[derive(Default, Clone)]
pub struct MemoryKv {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.lock().expect("kv lock").get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner
            .lock()
            .expect("kv lock")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.lock().expect("kv lock").remove(key);
        Ok(())
    }
}
