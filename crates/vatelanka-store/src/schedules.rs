//! Collection-rule reads.

use chrono::NaiveDate;

use vatelanka_core::{schedule, CollectionRule, WardPlacement, WasteType};

use crate::client::DocumentStore;
use crate::error::StoreError;
use crate::paths;
use crate::profile::require_user_profile;

/// Rules for one ward, in stored order.
///
/// Malformed rule documents are skipped with a warning rather than failing
/// the whole fetch; one bad ward-admin edit should not blank the schedule
/// view.
///
/// # Errors
///
/// Returns a [`StoreError`] if the collection fetch itself fails.
pub async fn fetch_ward_schedules<S: DocumentStore>(
    store: &S,
    placement: &WardPlacement,
) -> Result<Vec<CollectionRule>, StoreError> {
    let collection = paths::schedules(placement);
    let docs = store.get_docs(&collection).await?;

    let mut rules = Vec::with_capacity(docs.len());
    for doc in docs {
        match doc.parse::<CollectionRule>(&collection) {
            Ok(mut rule) => {
                rule.id = doc.id;
                rules.push(rule);
            }
            Err(e) => {
                tracing::warn!(doc = %doc.id, error = %e, "skipping malformed schedule document");
            }
        }
    }
    Ok(rules)
}

/// Rules for the signed-in user's ward.
///
/// # Errors
///
/// [`StoreError::LocationNotSet`] until the user's ward assignment is
/// complete; otherwise as [`fetch_ward_schedules`].
pub async fn fetch_user_schedules<S: DocumentStore>(
    store: &S,
    uid: &str,
) -> Result<Vec<CollectionRule>, StoreError> {
    let profile = require_user_profile(store, uid).await?;
    let placement = profile.placement().ok_or(StoreError::LocationNotSet)?;
    fetch_ward_schedules(store, &placement).await
}

/// Waste types scheduled for the user today. Populates the report form's
/// allowed waste types.
///
/// # Errors
///
/// As [`fetch_user_schedules`].
pub async fn fetch_today_waste_types<S: DocumentStore>(
    store: &S,
    uid: &str,
    today: NaiveDate,
) -> Result<Vec<WasteType>, StoreError> {
    let rules = fetch_user_schedules(store, uid).await?;
    Ok(schedule::today_waste_types(&rules, today))
}
