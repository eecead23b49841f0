//! Missed-collection reports.

use chrono::{DateTime, NaiveDate, Utc};
use tokio::task::JoinHandle;

use vatelanka_core::{schedule, validate, Ticket, TicketStatus, WasteType, MISSED_COLLECTION};

use crate::client::{Document, DocumentStore};
use crate::error::StoreError;
use crate::paths;
use crate::profile::require_user_profile;

/// Fields the user fills in on the report form.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub waste_type: WasteType,
    pub notes: String,
}

/// File a missed-collection report into the user's ward queue.
///
/// The report is only accepted for a waste type actually scheduled today;
/// a complaint about a pickup that was never due is rejected before any
/// write.
///
/// # Errors
///
/// [`StoreError::LocationNotSet`] without a complete ward assignment,
/// [`StoreError::NotScheduledToday`] when the waste type has no collection
/// today, and validation errors for empty notes.
pub async fn create_ticket<S: DocumentStore>(
    store: &S,
    uid: &str,
    ticket: &NewTicket,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Ticket, StoreError> {
    validate::require_non_empty("notes", &ticket.notes)?;

    let profile = require_user_profile(store, uid).await?;
    let placement = profile.placement().ok_or(StoreError::LocationNotSet)?;

    let rules = crate::schedules::fetch_ward_schedules(store, &placement).await?;
    if !schedule::today_waste_types(&rules, today).contains(&ticket.waste_type) {
        return Err(StoreError::NotScheduledToday(ticket.waste_type));
    }

    let mut record = Ticket {
        id: String::new(),
        issue_type: MISSED_COLLECTION.to_string(),
        waste_type: ticket.waste_type,
        notes: ticket.notes.clone(),
        status: TicketStatus::Pending,
        user_id: uid.to_string(),
        user_name: profile.name.clone(),
        user_email: profile.email.clone(),
        phone_number: profile.phone_number.clone(),
        home_location: profile.home_location,
        created_at: now,
        updated_at: now,
        resolved_at: None,
    };

    let mut data = serde_json::to_value(&record)
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    if let Some(map) = data.as_object_mut() {
        map.remove("id");
    }
    record.id = store.add_doc(&paths::tickets(&placement), data).await?;
    tracing::info!(ticket = %record.id, waste_type = %record.waste_type, "ticket created");
    Ok(record)
}

/// The user's own tickets, newest first. The ward queue holds every
/// resident's tickets, so this filters to the caller.
///
/// # Errors
///
/// [`StoreError::LocationNotSet`] without a complete ward assignment.
pub async fn fetch_user_tickets<S: DocumentStore>(
    store: &S,
    uid: &str,
) -> Result<Vec<Ticket>, StoreError> {
    let profile = require_user_profile(store, uid).await?;
    let placement = profile.placement().ok_or(StoreError::LocationNotSet)?;

    let docs = store.get_docs(&paths::tickets(&placement)).await?;
    Ok(parse_user_tickets(docs, uid))
}

/// Live feed of the user's tickets, re-delivered in full on every change.
pub struct TicketFeed {
    rx: tokio::sync::mpsc::Receiver<Vec<Ticket>>,
    task: Option<JoinHandle<()>>,
}

impl TicketFeed {
    pub async fn recv(&mut self) -> Option<Vec<Ticket>> {
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

impl Drop for TicketFeed {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Watch the ward ticket queue, delivering the user's tickets newest first.
///
/// # Errors
///
/// [`StoreError::LocationNotSet`] without a complete ward assignment.
pub async fn watch_user_tickets<S: DocumentStore>(
    store: &S,
    uid: &str,
) -> Result<TicketFeed, StoreError> {
    let profile = require_user_profile(store, uid).await?;
    let placement = profile.placement().ok_or(StoreError::LocationNotSet)?;

    let mut sub = store.watch(&paths::tickets(&placement)).await?;
    let uid = uid.to_string();
    let (tx, rx) = tokio::sync::mpsc::channel(16);
    let task = tokio::spawn(async move {
        while let Some(docs) = sub.recv().await {
            if tx.send(parse_user_tickets(docs, &uid)).await.is_err() {
                break;
            }
        }
    });
    Ok(TicketFeed {
        rx,
        task: Some(task),
    })
}

fn parse_user_tickets(docs: Vec<Document>, uid: &str) -> Vec<Ticket> {
    let mut tickets: Vec<Ticket> = docs
        .into_iter()
        .filter_map(|doc| match doc.parse::<Ticket>("tickets") {
            Ok(mut ticket) => {
                ticket.id = doc.id;
                (ticket.user_id == uid).then_some(ticket)
            }
            Err(e) => {
                tracing::warn!(doc = %doc.id, error = %e, "skipping malformed ticket document");
                None
            }
        })
        .collect();
    tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    tickets
}
