//! Notification derivation and the append-only notification log.
//!
//! Notifications are derived from deltas in the polled state. Identity
//! is a pure function of the signal category and the signal timestamp,
//! so repeated cycles carrying the same signal never create duplicates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::PolledState;

/// Fixed prefix for all derived notification ids.
pub const NOTIFICATION_ID_PREFIX: &str = "statewatch";

// ─── Notification ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum NotificationCategory {
    MediaInserted,
}

impl NotificationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MediaInserted => "media-inserted",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the notification log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Deterministic id: `statewatch-{category}-{signal timestamp}`.
    pub id: String,
    pub category: NotificationCategory,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// Deterministic notification id for a signal observation.
///
/// Two cycles observing the same (category, timestamp) pair always
/// produce the same id.
pub fn notification_id(category: NotificationCategory, signal_at: DateTime<Utc>) -> String {
    format!(
        "{NOTIFICATION_ID_PREFIX}-{}-{}",
        category.as_str(),
        signal_at.to_rfc3339()
    )
}

// ─── Notification Log ────────────────────────────────────────────

/// Append-only notification log, newest first.
///
/// Entries persist across cycles until explicitly dismissed by a
/// consumer; the log never expires them on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive notifications from a freshly polled state.
    ///
    /// Inspects the media-insertion signal. Idempotent: if an entry with
    /// the derived id already exists, nothing is created. Returns the
    /// newly created entry, if any — the caller decides whether it also
    /// triggers ephemeral presentation.
    pub fn derive_from_state(
        &mut self,
        state: &PolledState,
        now: DateTime<Utc>,
    ) -> Option<&Notification> {
        let (signal_at, slot) = state.media_signal()?;
        let id = notification_id(NotificationCategory::MediaInserted, signal_at);

        if self.entries.iter().any(|n| n.id == id) {
            return None;
        }

        let message = match slot {
            Some(slot) => format!("Storage media inserted in {slot}"),
            None => "Storage media inserted".to_string(),
        };
        self.entries.insert(
            0,
            Notification {
                id,
                category: NotificationCategory::MediaInserted,
                title: "Media inserted".to_string(),
                message,
                created_at: now,
                read: false,
            },
        );
        self.entries.first()
    }

    /// Mark an entry read. Returns `false` if the id is unknown.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(entry) => {
                entry.read = true;
                true
            }
            None => false,
        }
    }

    /// Remove an entry. Returns `false` if the id is unknown.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────
