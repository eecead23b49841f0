//! Missed-collection report flow.

use vatelanka_core::{Clock, Ticket, WasteType};
use vatelanka_notify::LocalNotifier;
use vatelanka_store::tickets::{create_ticket, NewTicket};
use vatelanka_store::{
    fetch_today_waste_types, AuthClient, DocumentStore, KeyValueStore, StoreError,
};

use crate::session::Session;

/// Waste types the report form offers: whatever is scheduled today.
///
/// # Errors
///
/// [`StoreError::LocationNotSet`] until the ward assignment is complete.
pub async fn allowed_waste_types<S, A, K, N>(
    session: &Session<S, A, K, N>,
    uid: &str,
) -> Result<Vec<WasteType>, StoreError>
where
    S: DocumentStore,
    A: AuthClient,
    K: KeyValueStore,
    N: LocalNotifier,
{
    fetch_today_waste_types(session.store.as_ref(), uid, session.clock.today()).await
}

/// Validate and file a missed-collection report.
///
/// # Errors
///
/// As [`vatelanka_store::tickets::create_ticket`]: empty notes, a waste
/// type not scheduled today, or a missing ward assignment all fail before
/// any write.
pub async fn submit_missed_collection<S, A, K, N>(
    session: &Session<S, A, K, N>,
    uid: &str,
    waste_type: WasteType,
    notes: &str,
) -> Result<Ticket, StoreError>
where
    S: DocumentStore,
    A: AuthClient,
    K: KeyValueStore,
    N: LocalNotifier,
{
    create_ticket(
        session.store.as_ref(),
        uid,
        &NewTicket {
            waste_type,
            notes: notes.to_string(),
        },
        session.clock.today(),
        session.timestamp(),
    )
    .await
}
