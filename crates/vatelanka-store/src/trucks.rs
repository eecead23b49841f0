//! Live truck tracking.
//!
//! A ward's fleet is partitioned per supervisor; each partition gets its
//! own snapshot subscription and the results are merged into a single
//! feed. Every incoming snapshot fully replaces that fleet's truck list.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use vatelanka_core::{UserProfile, VehiclePosition};

use crate::client::{Document, DocumentStore, Subscription};
use crate::error::StoreError;
use crate::paths;

/// The complete current truck list for one supervisor's fleet.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetSnapshot {
    pub supervisor_id: String,
    pub trucks: Vec<VehiclePosition>,
}

/// Merged live feed over every fleet in the user's ward.
///
/// Must be stopped (or dropped) when the consuming view goes away or the
/// ward changes; leaking it leaves duplicate listeners feeding stale
/// proximity evaluations.
pub struct TruckFeed {
    rx: mpsc::Receiver<FleetSnapshot>,
    tasks: Vec<JoinHandle<()>>,
}

impl TruckFeed {
    /// Next fleet snapshot, or `None` once every subscription has closed.
    pub async fn recv(&mut self) -> Option<FleetSnapshot> {
        self.rx.recv().await
    }

    /// Tear down every underlying subscription.
    pub fn stop(mut self) {
        self.abort_all();
    }

    fn abort_all(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for TruckFeed {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Subscribe to all truck fleets in the user's ward.
///
/// A failing fleet subscription is logged and skipped so one bad partition
/// does not take down its siblings; only when every partition fails is the
/// whole call an error.
///
/// # Errors
///
/// [`StoreError::LocationNotSet`] until the ward assignment is complete;
/// [`StoreError::Backend`] when no fleet subscription could be
/// established.
pub async fn subscribe_ward_trucks<S: DocumentStore>(
    store: &S,
    profile: &UserProfile,
) -> Result<TruckFeed, StoreError> {
    let placement = profile.placement().ok_or(StoreError::LocationNotSet)?;
    let supervisors = store.get_docs(&paths::supervisors(&placement)).await?;

    let mut subscriptions: Vec<(String, Subscription)> = Vec::new();
    for supervisor in &supervisors {
        let collection = paths::trucks(&placement, &supervisor.id);
        match store.watch(&collection).await {
            Ok(sub) => subscriptions.push((supervisor.id.clone(), sub)),
            Err(e) => {
                tracing::warn!(
                    supervisor = %supervisor.id,
                    error = %e,
                    "fleet subscription failed; continuing with remaining fleets"
                );
            }
        }
    }
    if subscriptions.is_empty() && !supervisors.is_empty() {
        return Err(StoreError::Backend(
            "all fleet subscriptions failed".to_string(),
        ));
    }

    let (tx, rx) = mpsc::channel(16);
    let mut tasks = Vec::with_capacity(subscriptions.len());
    for (supervisor_id, mut sub) in subscriptions {
        let tx = tx.clone();
        tasks.push(tokio::spawn(async move {
            while let Some(docs) = sub.recv().await {
                let snapshot = FleetSnapshot {
                    trucks: parse_trucks(docs, &supervisor_id),
                    supervisor_id: supervisor_id.clone(),
                };
                if tx.send(snapshot).await.is_err() {
                    break;
                }
            }
        }));
    }

    Ok(TruckFeed { rx, tasks })
}

/// Parse truck documents, keeping only vehicles that are on route
/// (active or paused). Malformed documents are skipped with a warning.
fn parse_trucks(docs: Vec<Document>, supervisor_id: &str) -> Vec<VehiclePosition> {
    docs.into_iter()
        .filter_map(|doc| match doc.parse::<VehiclePosition>("trucks") {
            Ok(mut truck) => {
                truck.id = doc.id;
                truck.supervisor_id = supervisor_id.to_string();
                truck.route_status.is_on_route().then_some(truck)
            }
            Err(e) => {
                tracing::warn!(doc = %doc.id, error = %e, "skipping malformed truck document");
                None
            }
        })
        .collect()
}
