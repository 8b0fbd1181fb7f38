//! Notification registry
//!
//! Notifications are appended on demand and leave the registry either when
//! dismissed or once their time-to-live has passed. Time is read from an
//! injected [`Clock`] so expiry can be driven by hand in tests.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

/// Default lifetime of a notification.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3000);

/// Source of monotonic time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

/// Severity level for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ToastLevel::Info => "info",
            ToastLevel::Warning => "warning",
            ToastLevel::Error => "error",
            ToastLevel::Success => "success",
        };
        f.write_str(s)
    }
}

/// A notification message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub level: ToastLevel,
    /// When the toast was created
    #[serde(skip)]
    pub created: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created) >= ttl
    }
}

/// Active notifications, oldest first.
#[derive(Debug)]
pub struct Notifications {
    ttl: Duration,
    toasts: Vec<Toast>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            toasts: Vec::new(),
        }
    }

    /// Append a notification and return its id.
    pub fn push(&mut self, message: impl Into<String>, level: ToastLevel, now: Instant) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            message: message.into(),
            level,
            created: now,
        };
        tracing::debug!(level = %toast.level, message = %toast.message, "notify");
        let id = toast.id;
        self.toasts.push(toast);
        id
    }

    pub fn success(&mut self, message: impl Into<String>, now: Instant) -> Uuid {
        self.push(message, ToastLevel::Success, now)
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) -> Uuid {
        self.push(message, ToastLevel::Error, now)
    }

    /// Remove one notification. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop every notification whose lifetime has run out.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.toasts.len();
        let ttl = self.ttl;
        self.toasts.retain(|t| !t.is_expired(now, ttl));
        before - self.toasts.len()
    }

    pub fn active(&self) -> &[Toast] {
        &self.toasts
    }

    /// When the oldest notification expires.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.toasts.iter().map(|t| t.created + self.ttl).min()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
