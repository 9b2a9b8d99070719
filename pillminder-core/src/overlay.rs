//! Notification overlay queue
//!
//! Pending interrupt pages, front-is-active. While the queue is non-empty the
//! navigator draws the front entry instead of the current menu page; the user
//! acknowledges it with Select, which pops it.
//!
//! The queue has its own lock, separate from the navigation lock. The
//! navigator may take this lock while holding its own; code holding this
//! lock never calls into the navigator.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::warn;

use crate::page::PageRef;

/// Callback run every time a notification is drawn
pub type LoadFn = Arc<dyn Fn() + Send + Sync>;

/// Queue length above which a warning is logged on every push
///
/// The queue itself is unbounded.
pub const BACKLOG_WARN_LEN: usize = 16;

/// One pending interrupt page
#[derive(Clone)]
pub struct Notification {
    /// Run each time the entry is rendered as the active overlay
    pub on_load: Option<LoadFn>,
    /// Page to show; its `on_visit` runs on acknowledgement
    pub page: PageRef,
}

impl Notification {
    /// Create a notification
    pub fn new(on_load: Option<LoadFn>, page: PageRef) -> Self {
        Self { on_load, page }
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("on_load", &self.on_load.is_some())
            .field("page", &self.page.label())
            .finish()
    }
}

/// FIFO of pending notifications
#[derive(Debug, Default)]
pub struct NotificationQueue {
    entries: Mutex<VecDeque<Notification>>,
}

impl NotificationQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&self, entry: Notification) {
        let mut entries = self.lock();
        entries.push_back(entry);
        if entries.len() > BACKLOG_WARN_LEN {
            warn!("{} notifications pending", entries.len());
        }
    }

    /// Clone of the active (front) entry
    pub fn front(&self) -> Option<Notification> {
        self.lock().front().cloned()
    }

    /// Remove the active entry
    pub fn pop_front(&self) -> Option<Notification> {
        self.lock().pop_front()
    }

    /// Number of pending entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
