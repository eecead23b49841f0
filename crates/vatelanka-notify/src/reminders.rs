//! Collection-day reminder scheduling.
//!
//! Once per day the pending reminders are cancelled wholesale and today's
//! set is planned fresh; `lastNotificationDate` in local storage marks the
//! day so repeat runs are no-ops until the date rolls over. Planning is
//! pure; [`refresh_daily_reminders`] does the IO around it.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::json;

use vatelanka_core::{schedule, Clock, CollectionRule, EngineConfig, SlotTime, WasteType};
use vatelanka_store::kv::{
    KeyValueStore, LAST_NOTIFICATION_DATE_KEY, NOTIFICATIONS_ENABLED_KEY,
};

use crate::notifier::{LocalNotifier, NotificationRequest, NotifyError};
use crate::proximity::store_today_windows;

/// Deterministic per-slot reminder id, stable across re-planning.
#[must_use]
pub fn reminder_identifier(waste_type: WasteType, date: NaiveDate, start: SlotTime) -> String {
    format!("{waste_type}-{date}-{start}")
}

/// Why a collection got no reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The rule has no time slot to anchor a reminder to.
    NoTimeSlot,
    /// The reminder moment has already passed.
    AlreadyPast,
    /// The reminder moment is less than the minimum notice away.
    TooSoon,
}

/// Planning result for one of today's collections.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderOutcome {
    Scheduled(NotificationRequest),
    Skipped {
        identifier: String,
        waste_type: WasteType,
        reason: SkipReason,
    },
}

/// Plan reminders for today's collections.
///
/// Each collection with a time slot gets a candidate fire time of
/// `start - lead`; the candidate is scheduled unless it is already in the
/// past or closer than `min_notice`.
#[must_use]
pub fn plan_reminders(
    collections: &[CollectionRule],
    today: NaiveDate,
    now: NaiveDateTime,
    lead: Duration,
    min_notice: Duration,
) -> Vec<ReminderOutcome> {
    collections
        .iter()
        .map(|rule| {
            let Some(slot) = rule.time_slot else {
                return ReminderOutcome::Skipped {
                    identifier: format!("{}-{today}", rule.waste_type),
                    waste_type: rule.waste_type,
                    reason: SkipReason::NoTimeSlot,
                };
            };
            let identifier = reminder_identifier(rule.waste_type, today, slot.start);
            let fire_at = today.and_time(slot.start.time()) - lead;
            if fire_at <= now {
                return ReminderOutcome::Skipped {
                    identifier,
                    waste_type: rule.waste_type,
                    reason: SkipReason::AlreadyPast,
                };
            }
            if fire_at < now + min_notice {
                return ReminderOutcome::Skipped {
                    identifier,
                    waste_type: rule.waste_type,
                    reason: SkipReason::TooSoon,
                };
            }
            ReminderOutcome::Scheduled(NotificationRequest {
                identifier,
                title: format!("{} Waste Collection Soon", rule.waste_type),
                body: format!(
                    "Collection runs {} to {} today. Have your {} waste ready.",
                    slot.start, slot.end, rule.waste_type
                ),
                data: json!({ "wasteType": rule.waste_type, "date": today }),
                trigger_at: Some(fire_at),
            })
        })
        .collect()
}

/// Lifecycle of one reminder slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReminderState {
    #[default]
    NoReminderScheduled,
    Scheduled,
    Fired,
    Skipped,
}

/// Per-day reminder states, keyed by reminder identifier.
#[derive(Debug, Default)]
pub struct ReminderDay {
    states: HashMap<String, ReminderState>,
}

impl ReminderDay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_scheduled(&mut self, identifier: &str) {
        self.states
            .insert(identifier.to_string(), ReminderState::Scheduled);
    }

    pub fn record_skipped(&mut self, identifier: &str) {
        self.states
            .insert(identifier.to_string(), ReminderState::Skipped);
    }

    /// Transition a scheduled reminder to fired. Returns `false` (and leaves
    /// the state alone) for anything not currently scheduled.
    pub fn mark_fired(&mut self, identifier: &str) -> bool {
        match self.states.get_mut(identifier) {
            Some(state @ ReminderState::Scheduled) => {
                *state = ReminderState::Fired;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn state(&self, identifier: &str) -> ReminderState {
        self.states
            .get(identifier)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn scheduled_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| **s == ReminderState::Scheduled)
            .count()
    }
}

/// Result of a [`refresh_daily_reminders`] pass.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Notifications are off; the day rolled over but nothing was scheduled.
    Disabled,
    /// No collections today; the day rolled over with nothing to schedule.
    NothingToday,
    /// The marker already shows today; reminders are in place.
    SameDay,
    /// New day: reminders were cancelled and re-planned.
    Refreshed(ReminderDay),
}

/// Roll reminders over to the current day.
///
/// On a new day this cancels every pending notification, rewrites the
/// stored collection windows from today's (possibly empty) collections,
/// and advances the day marker, so nothing from yesterday survives even
/// when notifications are off or today has no collections. Scheduling
/// itself is gated on the enabled flag and runs best-effort: a failing
/// item is logged and does not abort the pass. Re-runs on the same day
/// are no-ops.
///
/// # Errors
///
/// Returns a [`NotifyError`] when local storage or the bulk cancel fails;
/// individual schedule failures do not surface here.
pub async fn refresh_daily_reminders<K: KeyValueStore, N: LocalNotifier>(
    kv: &K,
    notifier: &N,
    rules: &[CollectionRule],
    clock: &dyn Clock,
    config: &EngineConfig,
) -> Result<RefreshOutcome, NotifyError> {
    let today = clock.today();
    let marker = today.to_string();
    if kv.get(LAST_NOTIFICATION_DATE_KEY).await?.as_deref() == Some(marker.as_str()) {
        return Ok(RefreshOutcome::SameDay);
    }

    // Yesterday's reminders and windows must go regardless of what today
    // holds; otherwise the proximity gate reads stale windows.
    notifier.cancel_all().await?;
    let collections = schedule::today_collections(rules, today);
    store_today_windows(kv, &collections).await?;
    kv.set(LAST_NOTIFICATION_DATE_KEY, &marker).await?;

    if kv.get(NOTIFICATIONS_ENABLED_KEY).await?.as_deref() != Some("true") {
        return Ok(RefreshOutcome::Disabled);
    }
    if collections.is_empty() {
        return Ok(RefreshOutcome::NothingToday);
    }

    let mut day = ReminderDay::new();
    let outcomes = plan_reminders(
        &collections,
        today,
        clock.now(),
        Duration::minutes(config.reminder_lead_minutes),
        Duration::minutes(config.reminder_min_notice_minutes),
    );
    for outcome in outcomes {
        match outcome {
            ReminderOutcome::Scheduled(request) => {
                let identifier = request.identifier.clone();
                match notifier.schedule(request).await {
                    Ok(()) => day.record_scheduled(&identifier),
                    Err(e) => {
                        tracing::warn!(reminder = %identifier, error = %e, "scheduling reminder failed");
                    }
                }
            }
            ReminderOutcome::Skipped {
                identifier,
                waste_type,
                reason,
            } => {
                tracing::debug!(waste_type = %waste_type, ?reason, "reminder skipped");
                day.record_skipped(&identifier);
            }
        }
    }

    tracing::info!(
        date = %marker,
        scheduled = day.scheduled_count(),
        "daily reminders refreshed"
    );
    Ok(RefreshOutcome::Refreshed(day))
}
