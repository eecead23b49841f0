//! User profile operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use vatelanka_core::{validate, Coordinate, UserProfile, WardPlacement};

use crate::client::DocumentStore;
use crate::error::StoreError;
use crate::kv::{KeyValueStore, NOTIFICATIONS_ENABLED_KEY};
use crate::paths;

/// Fields captured at signup. District, ward, and home location arrive
/// later, at location confirmation.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub municipal_council: String,
}

/// Self-editable profile fields. Location and hierarchy fields are not
/// here: once confirmed they are locked.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub nic: Option<String>,
    pub birthday: Option<String>,
}

/// Create the profile document at signup.
///
/// # Errors
///
/// Returns a validation error before any write when a field is malformed,
/// or a [`StoreError`] if the write fails.
pub async fn save_user_data<S: DocumentStore>(
    store: &S,
    uid: &str,
    user: &NewUser,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    validate::require_non_empty("name", &user.name)?;
    validate::validate_email(&user.email)?;
    validate::require_non_empty("municipal council", &user.municipal_council)?;

    store
        .set_doc(
            &paths::user_doc(uid),
            json!({
                "name": user.name,
                "email": user.email,
                "municipalCouncil": user.municipal_council,
                "notificationsEnabled": false,
                "createdAt": now,
            }),
        )
        .await
}

/// Typed profile fetch; `None` when no profile document exists.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] if the document cannot be parsed.
pub async fn fetch_user_profile<S: DocumentStore>(
    store: &S,
    uid: &str,
) -> Result<Option<UserProfile>, StoreError> {
    let path = paths::user_doc(uid);
    let Some(doc) = store.get_doc(&path).await? else {
        return Ok(None);
    };
    let mut profile: UserProfile = doc.parse(paths::USERS)?;
    profile.uid = doc.id;
    Ok(Some(profile))
}

/// Profile fetch that treats a missing document as an error.
///
/// # Errors
///
/// [`StoreError::NotFound`] when the user has no profile document.
pub async fn require_user_profile<S: DocumentStore>(
    store: &S,
    uid: &str,
) -> Result<UserProfile, StoreError> {
    fetch_user_profile(store, uid)
        .await?
        .ok_or_else(|| StoreError::NotFound(paths::user_doc(uid)))
}

/// Update self-editable fields. Every provided value is validated before
/// the write; nothing reaches the store on failure.
///
/// # Errors
///
/// Validation errors for malformed fields; [`StoreError`] on write failure.
pub async fn update_user_profile<S: DocumentStore>(
    store: &S,
    uid: &str,
    update: &ProfileUpdate,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let mut patch = serde_json::Map::new();

    if let Some(name) = &update.name {
        validate::require_non_empty("name", name)?;
        patch.insert("name".to_string(), json!(name));
    }
    if let Some(phone) = &update.phone_number {
        validate::validate_phone(phone)?;
        patch.insert("phoneNumber".to_string(), json!(phone));
    }
    if let Some(nic) = &update.nic {
        validate::validate_nic(nic)?;
        patch.insert("nic".to_string(), json!(nic));
    }
    if let Some(birthday) = &update.birthday {
        validate::validate_birthday(birthday, today)?;
        patch.insert("birthday".to_string(), json!(birthday));
    }

    if patch.is_empty() {
        return Ok(());
    }
    patch.insert("updatedAt".to_string(), json!(now));
    store
        .update_doc(&paths::user_doc(uid), serde_json::Value::Object(patch))
        .await
}

/// Confirm the ward assignment and home coordinate, once.
///
/// # Errors
///
/// [`StoreError::LocationLocked`] if a home location was already
/// confirmed; profiles are location-locked after the first confirmation.
pub async fn confirm_home_location<S: DocumentStore>(
    store: &S,
    uid: &str,
    placement: &WardPlacement,
    home: Coordinate,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let profile = require_user_profile(store, uid).await?;
    if profile.home_location.is_some() {
        return Err(StoreError::LocationLocked);
    }

    store
        .update_doc(
            &paths::user_doc(uid),
            json!({
                "municipalCouncil": placement.municipal_council,
                "district": placement.district,
                "ward": placement.ward,
                "homeLocation": home,
                "updatedAt": now,
            }),
        )
        .await
}

/// Persist the notifications toggle to the profile and mirror it to local
/// storage so the reminder path can read it without a fetch.
///
/// # Errors
///
/// Returns a [`StoreError`] if either write fails.
pub async fn set_notifications_enabled<S: DocumentStore, K: KeyValueStore>(
    store: &S,
    kv: &K,
    uid: &str,
    enabled: bool,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    kv.set(NOTIFICATIONS_ENABLED_KEY, if enabled { "true" } else { "false" })
        .await?;
    store
        .update_doc(
            &paths::user_doc(uid),
            json!({
                "notificationsEnabled": enabled,
                "notificationUpdatedAt": now,
            }),
        )
        .await
}

/// Read the notifications toggle: local storage first, falling back to the
/// profile document and backfilling the local copy.
///
/// # Errors
///
/// Returns a [`StoreError`] only if both sources fail.
pub async fn notifications_enabled<S: DocumentStore, K: KeyValueStore>(
    store: &S,
    kv: &K,
    uid: &str,
) -> Result<bool, StoreError> {
    if let Some(cached) = kv.get(NOTIFICATIONS_ENABLED_KEY).await? {
        return Ok(cached == "true");
    }
    let enabled = fetch_user_profile(store, uid)
        .await?
        .is_some_and(|p| p.notifications_enabled);
    kv.set(NOTIFICATIONS_ENABLED_KEY, if enabled { "true" } else { "false" })
        .await?;
    Ok(enabled)
}
