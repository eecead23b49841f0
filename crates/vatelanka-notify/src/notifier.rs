//! Device-notification boundary.
//!
//! The OS notification surface is consumed through [`LocalNotifier`]; the
//! engine only ever schedules and bulk-cancels. [`RecordingNotifier`] is
//! the in-process implementation used by tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use thiserror::Error;

use vatelanka_store::StoreError;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One notification to schedule. `trigger_at` of `None` fires immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
    pub trigger_at: Option<NaiveDateTime>,
}

pub trait LocalNotifier: Send + Sync {
    fn schedule(
        &self,
        request: NotificationRequest,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;

    /// Cancel every pending scheduled notification.
    fn cancel_all(&self) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

#[derive(Default)]
struct RecordingInner {
    pending: Vec<NotificationRequest>,
    cancel_count: usize,
    failing_identifiers: Vec<String>,
}

/// In-memory [`LocalNotifier`] recording everything it is asked to do.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    inner: Arc<Mutex<RecordingInner>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications currently scheduled and not yet cancelled.
    #[must_use]
    pub fn pending(&self) -> Vec<NotificationRequest> {
        self.lock().pending.clone()
    }

    #[must_use]
    pub fn cancel_count(&self) -> usize {
        self.lock().cancel_count
    }

    /// Make future `schedule` calls for this identifier fail.
    pub fn fail_identifier(&self, identifier: &str) {
        self.lock().failing_identifiers.push(identifier.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingInner> {
        self.inner.lock().expect("notifier lock")
    }
}

impl LocalNotifier for RecordingNotifier {
    async fn schedule(&self, request: NotificationRequest) -> Result<(), NotifyError> {
        let mut inner = self.lock();
        if inner.failing_identifiers.contains(&request.identifier) {
            return Err(NotifyError::Backend(format!(
                "schedule refused for {}",
                request.identifier
            )));
        }
        inner.pending.push(request);
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), NotifyError> {
        let mut inner = self.lock();
        inner.pending.clear();
        inner.cancel_count += 1;
        Ok(())
    }
}
