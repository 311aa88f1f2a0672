//! Short-lived user notifications.
//!
//! Operations push a message describing their outcome. Messages are shown
//! newest first and disappear once older than the configured lifetime.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// An operation completed.
    Success,
    /// An operation failed.
    Error,
    /// Neutral information.
    Info,
    /// Something needs attention.
    Warning,
}

impl Kind {
    /// Symbol printed before the message.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Error => "✗",
            Self::Info => "ℹ",
            Self::Warning => "⚠",
        }
    }
}

/// A single message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Identifier, unique within one [`Notifier`].
    pub id: u64,
    /// Severity.
    pub kind: Kind,
    /// Message text.
    pub text: String,
    /// When the message was pushed.
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.symbol(), self.text)
    }
}

/// Newest-first list of notifications with a fixed lifetime.
#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    next_id: u64,
    items: Vec<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::seconds(5))
    }
}

impl Notifier {
    /// Create a notifier whose messages expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 1,
            items: Vec::new(),
        }
    }

    /// Push a message stamped with the current time. Returns its id.
    pub fn push(&mut self, kind: Kind, text: impl Into<String>) -> u64 {
        self.push_at(kind, text, Utc::now())
    }

    /// Push a message stamped with `now`. Returns its id.
    pub fn push_at(&mut self, kind: Kind, text: impl Into<String>, now: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.insert(
            0,
            Notification {
                id,
                kind,
                text: text.into(),
                created_at: now,
            },
        );
        id
    }

    /// Shorthand for a [`Kind::Success`] message.
    pub fn success(&mut self, text: impl Into<String>) -> u64 {
        self.push(Kind::Success, text)
    }

    /// Shorthand for a [`Kind::Error`] message.
    pub fn error(&mut self, text: impl Into<String>) -> u64 {
        self.push(Kind::Error, text)
    }

    /// Shorthand for a [`Kind::Info`] message.
    pub fn info(&mut self, text: impl Into<String>) -> u64 {
        self.push(Kind::Info, text)
    }

    /// Shorthand for a [`Kind::Warning`] message.
    pub fn warning(&mut self, text: impl Into<String>) -> u64 {
        self.push(Kind::Warning, text)
    }

    /// Remove the message with `id`. Returns `true` if it was present.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Drop expired messages and return the rest, newest first.
    pub fn active(&mut self, now: DateTime<Utc>) -> &[Notification] {
        let ttl = self.ttl;
        self.items.retain(|n| now - n.created_at < ttl);
        &self.items
    }

    /// Take every unexpired message, leaving the list empty.
    pub fn drain(&mut self, now: DateTime<Utc>) -> Vec<Notification> {
        self.active(now);
        std::mem::take(&mut self.items)
    }

    /// Number of stored messages, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no messages are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
