//! Municipal-council / district / ward lookups for onboarding.

use serde::Deserialize;

use crate::client::DocumentStore;
use crate::error::StoreError;
use crate::paths;

/// A selectable entry in the hierarchy pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CouncilDoc {
    name: String,
    #[serde(default)]
    is_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct NamedDoc {
    name: String,
}

/// Councils currently open for signup (`isEnabled == true`).
///
/// # Errors
///
/// Returns a [`StoreError`] if the fetch fails or a document is malformed.
pub async fn fetch_municipal_councils<S: DocumentStore>(
    store: &S,
) -> Result<Vec<HierarchyEntry>, StoreError> {
    let docs = store.get_docs(paths::MUNICIPAL_COUNCILS).await?;
    let mut councils = Vec::new();
    for doc in docs {
        let parsed: CouncilDoc = doc.parse(paths::MUNICIPAL_COUNCILS)?;
        if parsed.is_enabled {
            councils.push(HierarchyEntry {
                id: doc.id,
                name: parsed.name,
            });
        }
    }
    Ok(councils)
}

/// Districts under one council.
///
/// # Errors
///
/// Returns a [`StoreError`] if the fetch fails or a document is malformed.
pub async fn fetch_districts<S: DocumentStore>(
    store: &S,
    council_id: &str,
) -> Result<Vec<HierarchyEntry>, StoreError> {
    fetch_named(store, &paths::districts(council_id)).await
}

/// Wards under one district.
///
/// # Errors
///
/// Returns a [`StoreError`] if the fetch fails or a document is malformed.
pub async fn fetch_wards<S: DocumentStore>(
    store: &S,
    council_id: &str,
    district_id: &str,
) -> Result<Vec<HierarchyEntry>, StoreError> {
    fetch_named(store, &paths::wards(council_id, district_id)).await
}

async fn fetch_named<S: DocumentStore>(
    store: &S,
    collection: &str,
) -> Result<Vec<HierarchyEntry>, StoreError> {
    let docs = store.get_docs(collection).await?;
    docs.into_iter()
        .map(|doc| {
            let parsed: NamedDoc = doc.parse(collection)?;
            Ok(HierarchyEntry {
                id: doc.id,
                name: parsed.name,
            })
        })
        .collect()
}
