use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use taskboard_core::{Notification, NotificationId, Severity};
use taskboard_settings::NotificationSettings;

const EVENT_CAPACITY: usize = 64;

/// Why a notification left the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DismissReason {
    Manual,
    Expired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationEvent {
    Added(Notification),
    Dismissed {
        id: NotificationId,
        reason: DismissReason,
    },
}

struct Entry {
    notification: Notification,
    timer: Option<CancellationToken>,
}

struct QueueInner {
    entries: Mutex<Vec<Entry>>,
    events: broadcast::Sender<NotificationEvent>,
    lifetimes: NotificationSettings,
}

impl Drop for QueueInner {
    fn drop(&mut self) {
        for entry in self.entries.get_mut().iter() {
            if let Some(timer) = &entry.timer {
                timer.cancel();
            }
        }
    }
}

/// Ordered queue of ephemeral notifications. Insertion order is display
/// order. Each notification with a non-zero lifetime owns an expiry timer;
/// dismissing it early cancels that timer.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<QueueInner>,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(NotificationSettings::default())
    }
}

impl NotificationQueue {
    pub fn new(lifetimes: NotificationSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(QueueInner {
                entries: Mutex::new(Vec::new()),
                events,
                lifetimes,
            }),
        }
    }

    /// Add a notification. `lifetime_ms == 0` keeps it until dismissed.
    ///
    /// Expiry timers run on the ambient tokio runtime; outside a runtime
    /// the notification stays until dismissed.
    pub fn enqueue(
        &self,
        message: impl Into<String>,
        severity: Severity,
        lifetime_ms: u64,
    ) -> NotificationId {
        let notification = Notification::new(message, severity, lifetime_ms);
        let id = notification.id.clone();
        debug!(
            notification_id = %id,
            severity = %severity,
            lifetime_ms,
            "notification enqueued"
        );

        // The timer is armed under the entries lock so an expiry on another
        // worker can only run after the entry and its Added event exist.
        let mut entries = self.inner.entries.lock();
        let timer = notification
            .lifetime()
            .and_then(|lifetime| self.schedule_expiry(id.clone(), lifetime));
        entries.push(Entry {
            notification: notification.clone(),
            timer,
        });
        let _ = self.inner.events.send(NotificationEvent::Added(notification));
        drop(entries);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.enqueue(message, Severity::Success, self.inner.lifetimes.success_lifetime_ms)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.enqueue(message, Severity::Error, self.inner.lifetimes.error_lifetime_ms)
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.enqueue(message, Severity::Info, self.inner.lifetimes.info_lifetime_ms)
    }

    pub fn warning(&self, message: impl Into<String>) -> NotificationId {
        self.enqueue(message, Severity::Warning, self.inner.lifetimes.warning_lifetime_ms)
    }

    /// Manual close. Returns false if the id was already gone.
    pub fn dismiss(&self, id: &NotificationId) -> bool {
        remove(&self.inner, id, DismissReason::Manual)
    }

    /// Dismiss everything and cancel all pending timers.
    pub fn clear(&self) {
        let drained: Vec<Entry> = self.inner.entries.lock().drain(..).collect();
        for entry in drained {
            if let Some(timer) = entry.timer {
                timer.cancel();
            }
            let _ = self.inner.events.send(NotificationEvent::Dismissed {
                id: entry.notification.id,
                reason: DismissReason::Manual,
            });
        }
    }

    /// Notifications currently queued, in display order.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner
            .entries
            .lock()
            .iter()
            .map(|e| e.notification.clone())
            .collect()
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.inner
            .entries
            .lock()
            .iter()
            .any(|e| e.notification.id == *id)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.lock().is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    /// Number of expiry timers still armed.
    pub fn pending_timers(&self) -> usize {
        self.inner
            .entries
            .lock()
            .iter()
            .filter(|e| e.timer.as_ref().is_some_and(|t| !t.is_cancelled()))
            .count()
    }

    fn schedule_expiry(&self, id: NotificationId, lifetime: Duration) -> Option<CancellationToken> {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(notification_id = %id, "no tokio runtime, notification will not auto-expire");
            return None;
        };
        // Deadline is fixed now, not when the task first gets polled.
        let deadline = Instant::now() + lifetime;
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let queue: Weak<QueueInner> = Arc::downgrade(&self.inner);
        drop(handle.spawn(async move {
            tokio::select! {
                () = cancelled.cancelled() => {}
                () = tokio::time::sleep_until(deadline) => {
                    if let Some(inner) = queue.upgrade() {
                        remove(&inner, &id, DismissReason::Expired);
                    }
                }
            }
        }));
        Some(token)
    }
}

fn remove(inner: &QueueInner, id: &NotificationId, reason: DismissReason) -> bool {
    let removed = {
        let mut entries = inner.entries.lock();
        entries
            .iter()
            .position(|e| e.notification.id == *id)
            .map(|pos| entries.remove(pos))
    };
    let Some(entry) = removed else {
        return false;
    };
    if let Some(timer) = entry.timer {
        timer.cancel();
    }
    debug!(notification_id = %id, ?reason, "notification dismissed");
    let _ = inner.events.send(NotificationEvent::Dismissed {
        id: id.clone(),
        reason,
    });
    true
}
