//! Live truck tracking for the map view.
//!
//! Consumes the merged ward truck feed, keeps the latest snapshot per
//! fleet, and on every snapshot recomputes the nearby list for the whole
//! known fleet set. Each nearby vehicle is offered to the proximity
//! notifier best-effort; alert failures never interrupt tracking.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use vatelanka_core::{geo, NearbyVehicle, VehiclePosition};
use vatelanka_notify::{maybe_notify_truck, LocalNotifier};
use vatelanka_store::trucks::subscribe_ward_trucks;
use vatelanka_store::{
    require_user_profile, AuthClient, DocumentStore, KeyValueStore, StoreError,
};

use crate::session::Session;

/// Running tracking pipeline. Stop (or drop) on teardown or whenever the
/// ward changes; the underlying subscriptions are torn down with it.
pub struct TrackingHandle {
    rx: mpsc::Receiver<Vec<NearbyVehicle>>,
    task: Option<JoinHandle<()>>,
}

impl TrackingHandle {
    /// Next nearby list, or `None` once tracking has shut down.
    pub async fn recv(&mut self) -> Option<Vec<NearbyVehicle>> {
        self.rx.recv().await
    }

    pub fn stop(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Start tracking trucks around the user's home.
///
/// # Errors
///
/// [`StoreError::LocationNotSet`] until the ward assignment and home
/// location are both confirmed.
pub async fn start_tracking<S, A, K, N>(
    session: &Session<S, A, K, N>,
    uid: &str,
) -> Result<TrackingHandle, StoreError>
where
    S: DocumentStore + 'static,
    A: AuthClient,
    K: KeyValueStore + 'static,
    N: LocalNotifier + 'static,
{
    let profile = require_user_profile(session.store.as_ref(), uid).await?;
    let home = profile.home_location.ok_or(StoreError::LocationNotSet)?;
    let mut feed = subscribe_ward_trucks(session.store.as_ref(), &profile).await?;

    let kv = Arc::clone(&session.kv);
    let notifier = Arc::clone(&session.notifier);
    let clock = Arc::clone(&session.clock);
    let config = session.config.clone();
    let (tx, rx) = mpsc::channel(16);

    let task = tokio::spawn(async move {
        let mut fleets: HashMap<String, Vec<VehiclePosition>> = HashMap::new();
        while let Some(snapshot) = feed.recv().await {
            fleets.insert(snapshot.supervisor_id, snapshot.trucks);
            let all: Vec<VehiclePosition> = fleets.values().flatten().cloned().collect();
            let nearby = geo::nearby(home, &all, config.proximity_radius_m);

            for vehicle in &nearby {
                if let Err(e) = maybe_notify_truck(
                    kv.as_ref(),
                    notifier.as_ref(),
                    vehicle,
                    clock.as_ref(),
                    &config,
                )
                .await
                {
                    tracing::warn!(
                        vehicle = %vehicle.vehicle.id,
                        error = %e,
                        "proximity alert failed"
                    );
                }
            }

            if tx.send(nearby).await.is_err() {
                break;
            }
        }
    });

    Ok(TrackingHandle {
        rx,
        task: Some(task),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::session::Session;
    use vatelanka_core::{Clock, Coordinate, EngineConfig, FixedClock, WardPlacement};
    use vatelanka_notify::{CollectionWindow, RecordingNotifier};
    use vatelanka_store::kv::{NOTIFICATIONS_ENABLED_KEY, TODAY_COLLECTION_TIMES_KEY};
    use vatelanka_store::profile::{confirm_home_location, save_user_data, NewUser};
    use vatelanka_store::{paths, MemoryAuth, MemoryKv, MemoryStore};

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

    fn session_parts() -> (
        Session<MemoryStore, MemoryAuth, MemoryKv, RecordingNotifier>,
        MemoryStore,
        MemoryKv,
        RecordingNotifier,
    ) {
        let store = MemoryStore::new();
        let kv = MemoryKv::new();
        let notifier = RecordingNotifier::new();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(monday(), 8, 0));
        let session = Session::new(
            EngineConfig::default(),
            store.clone(),
            MemoryAuth::new(),
            kv.clone(),
            notifier.clone(),
            clock,
        );
        (session, store, kv, notifier)
    }

    async fn located_user(store: &MemoryStore) {
        save_user_data(
            store,
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
        confirm_home_location(
            store,
            "u1",
            &placement(),
            Coordinate {
                latitude: 6.9271,
                longitude: 79.8612,
            },
            "2025-01-06T06:00:00Z".parse().unwrap(),
        )
        .await
        .unwrap();
    }

    async fn seed_fleet(store: &MemoryStore, latitude: f64, longitude: f64) -> String {
        store
            .set_doc(
                &format!("{}/sup-1", paths::supervisors(&placement())),
                json!({ "name": "Supervisor One" }),
            )
            .await
            .unwrap();
        let truck_path = format!("{}/t1", paths::trucks(&placement(), "sup-1"));
        store
            .set_doc(
                &truck_path,
                json!({
                    "numberPlate": "WP-CBK-9562",
                    "currentLocation": { "latitude": latitude, "longitude": longitude },
                    "routeStatus": "active",
                }),
            )
            .await
            .unwrap();
        truck_path
    }

    #[tokio::test]
    async fn tracking_requires_a_confirmed_home_location() {
        let (session, store, _kv, _notifier) = session_parts();
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

        let result = start_tracking(&session, "u1").await;
        assert!(matches!(result, Err(StoreError::LocationNotSet)));
    }

    #[tokio::test]
    async fn nearby_list_follows_truck_movement() {
        let (session, store, _kv, _notifier) = session_parts();
        located_user(&store).await;
        // ~100 m from home.
        let truck_path = seed_fleet(&store, 6.9280, 79.8615).await;

        let mut handle = start_tracking(&session, "u1").await.unwrap();
        let nearby = handle.recv().await.unwrap();
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].vehicle.id, "t1");
        assert!(nearby[0].distance_m <= 1_000);

        // The truck drives ~1.5 km away; the next recompute drops it.
        store
            .update_doc(
                &truck_path,
                json!({ "currentLocation": { "latitude": 6.9406, "longitude": 79.8612 } }),
            )
            .await
            .unwrap();
        let after_move = handle.recv().await.unwrap();
        assert!(after_move.is_empty());

        handle.stop();
    }

    #[tokio::test]
    async fn nearby_trucks_feed_the_proximity_notifier() {
        let (session, store, kv, notifier) = session_parts();
        located_user(&store).await;
        seed_fleet(&store, 6.9280, 79.8615).await;
        kv.set(NOTIFICATIONS_ENABLED_KEY, "true").await.unwrap();
        let windows = vec![CollectionWindow {
            waste_type: vatelanka_core::WasteType::Recyclable,
            start: vatelanka_core::SlotTime::parse("06:00").unwrap(),
            end: vatelanka_core::SlotTime::parse("12:00").unwrap(),
        }];
        kv.set(
            TODAY_COLLECTION_TIMES_KEY,
            &serde_json::to_string(&windows).unwrap(),
        )
        .await
        .unwrap();

        let mut handle = start_tracking(&session, "u1").await.unwrap();
        let nearby = handle.recv().await.unwrap();
        assert_eq!(nearby.len(), 1);

        let pending = notifier.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].identifier, "truck-t1");
        handle.stop();
    }
}
