//! Truck-proximity alerts.
//!
//! A nearby truck fires an immediate notification, but only while a
//! collection window is open and never more than once per vehicle within
//! the cooldown. Today's windows are read from local storage, where the
//! daily reminder refresh leaves them.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;

use vatelanka_core::{Clock, CollectionRule, EngineConfig, NearbyVehicle, SlotTime, WasteType};
use vatelanka_store::kv::{
    truck_alert_key, KeyValueStore, NOTIFICATIONS_ENABLED_KEY, TODAY_COLLECTION_TIMES_KEY,
};

use crate::notifier::{LocalNotifier, NotificationRequest, NotifyError};

const ALERT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One of today's collection windows, as persisted to local storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWindow {
    pub waste_type: WasteType,
    pub start: SlotTime,
    pub end: SlotTime,
}

impl CollectionWindow {
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start.time() && time <= self.end.time()
    }
}

/// Persist today's collection windows for the proximity check.
///
/// # Errors
///
/// Returns a [`NotifyError`] when local storage rejects the write.
pub async fn store_today_windows<K: KeyValueStore>(
    kv: &K,
    collections: &[CollectionRule],
) -> Result<(), NotifyError> {
    let windows: Vec<CollectionWindow> = collections
        .iter()
        .filter_map(|rule| {
            rule.time_slot.map(|slot| CollectionWindow {
                waste_type: rule.waste_type,
                start: slot.start,
                end: slot.end,
            })
        })
        .collect();
    let raw = serde_json::to_string(&windows).map_err(|e| NotifyError::Backend(e.to_string()))?;
    kv.set(TODAY_COLLECTION_TIMES_KEY, &raw).await?;
    Ok(())
}

/// Today's stored collection windows. Missing or unreadable state reads as
/// no windows, which closes the alert gate rather than failing tracking.
///
/// # Errors
///
/// Returns a [`NotifyError`] when local storage itself fails.
pub async fn load_today_windows<K: KeyValueStore>(
    kv: &K,
) -> Result<Vec<CollectionWindow>, NotifyError> {
    let Some(raw) = kv.get(TODAY_COLLECTION_TIMES_KEY).await? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
        Ok(windows) => Ok(windows),
        Err(e) => {
            tracing::warn!(error = %e, "stored collection windows unreadable; treating as none");
            Ok(Vec::new())
        }
    }
}

/// Fire a proximity alert for one nearby truck if the gates allow it.
///
/// Gates, in order: notifications enabled, the current time inside at least
/// one of today's collection windows, and the per-vehicle cooldown elapsed.
/// Returns whether a notification was sent.
///
/// # Errors
///
/// Returns a [`NotifyError`] when local storage or the notification
/// backend fails.
pub async fn maybe_notify_truck<K: KeyValueStore, N: LocalNotifier>(
    kv: &K,
    notifier: &N,
    nearby: &NearbyVehicle,
    clock: &dyn Clock,
    config: &EngineConfig,
) -> Result<bool, NotifyError> {
    if kv.get(NOTIFICATIONS_ENABLED_KEY).await?.as_deref() != Some("true") {
        return Ok(false);
    }

    let now = clock.now();
    let windows = load_today_windows(kv).await?;
    if !windows.iter().any(|w| w.contains(now.time())) {
        return Ok(false);
    }

    let vehicle_id = nearby.vehicle.id.as_str();
    let alert_key = truck_alert_key(vehicle_id);
    if let Some(last) = last_alert_at(kv, &alert_key).await? {
        if now - last < Duration::minutes(config.truck_alert_cooldown_minutes) {
            return Ok(false);
        }
    }

    let label = nearby
        .vehicle
        .number_plate
        .as_deref()
        .unwrap_or(vehicle_id);
    notifier
        .schedule(NotificationRequest {
            identifier: format!("truck-{vehicle_id}"),
            title: "Collection Truck Nearby".to_string(),
            body: format!(
                "Truck {label} is about {} m from your home.",
                nearby.distance_m
            ),
            data: json!({ "vehicleId": vehicle_id, "distanceM": nearby.distance_m }),
            trigger_at: None,
        })
        .await?;
    kv.set(&alert_key, &now.format(ALERT_TIMESTAMP_FORMAT).to_string())
        .await?;
    tracing::debug!(vehicle = vehicle_id, distance_m = nearby.distance_m, "truck alert sent");
    Ok(true)
}

async fn last_alert_at<K: KeyValueStore>(
    kv: &K,
    key: &str,
) -> Result<Option<NaiveDateTime>, NotifyError> {
    let Some(raw) = kv.get(key).await? else {
        return Ok(None);
    };
    match NaiveDateTime::parse_from_str(&raw, ALERT_TIMESTAMP_FORMAT) {
        Ok(at) => Ok(Some(at)),
        Err(e) => {
            tracing::warn!(key, error = %e, "unreadable alert timestamp; ignoring");
            Ok(None)
        }
    }
}
