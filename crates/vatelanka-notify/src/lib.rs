//! Reminder scheduling and truck-proximity alerts.
//!
//! Planning is pure and clock-driven; the IO around it goes through the
//! [`LocalNotifier`] and key-value traits, so everything here is testable
//! with recorded notifiers and a pinned clock.

pub mod notifier;
pub mod proximity;
pub mod reminders;

pub use notifier::{LocalNotifier, NotificationRequest, NotifyError, RecordingNotifier};
pub use proximity::{load_today_windows, maybe_notify_truck, store_today_windows, CollectionWindow};
pub use reminders::{
    plan_reminders, refresh_daily_reminders, reminder_identifier, RefreshOutcome, ReminderDay,
    ReminderOutcome, ReminderState, SkipReason,
};
