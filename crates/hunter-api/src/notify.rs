//! Transient user-visible notifications raised by the request layer.
//!
//! The request layer emits exactly one notification per `AuthError` or
//! `ApplicationError`; transport failures stay silent and are left to the
//! caller to surface.

use std::time::Duration;

/// How long a notification stays on screen before auto-dismissing.
pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(5);

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationLevel {
    Warning,
    Error,
}

/// A dismissable message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub duration: Duration,
}

impl Notification {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
            duration: NOTIFICATION_DURATION,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            duration: NOTIFICATION_DURATION,
        }
    }
}

/// Sink for notifications. Front-ends render them however they like.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Default notifier: writes notifications to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Warning => {
                tracing::warn!(text = %notification.message, "notification");
            }
            NotificationLevel::Error => {
                tracing::error!(text = %notification.message, "notification");
            }
        }
    }
}
