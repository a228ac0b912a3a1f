#![forbid(unsafe_code)]

use crate::report::FailureReason;
use std::fmt;
use tracing::trace;

/// Progress notifications emitted while a snapshot is restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreEvent {
    RestoreStarted {
        app_name: String,
        window_title: String,
    },
    Restored {
        app_name: String,
        window_title: String,
    },
    RestoreFailed {
        app_name: String,
        window_title: String,
        reason: FailureReason,
    },
    LaunchAttempt {
        app_name: String,
        command: String,
    },
    LaunchResult {
        app_name: String,
        success: bool,
        detail: String,
    },
}

impl fmt::Display for RestoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RestoreStarted {
                app_name,
                window_title,
            } => write!(f, "restoring {app_name} {window_title:?}"),
            Self::Restored {
                app_name,
                window_title,
            } => write!(f, "restored {app_name} {window_title:?}"),
            Self::RestoreFailed {
                app_name,
                window_title,
                reason,
            } => write!(f, "failed {app_name} {window_title:?}: {reason}"),
            Self::LaunchAttempt { app_name, command } => {
                write!(f, "launching {app_name} ({command})")
            }
            Self::LaunchResult {
                app_name,
                success: true,
                detail,
            } => write!(f, "launched {app_name}: {detail}"),
            Self::LaunchResult {
                app_name,
                success: false,
                detail,
            } => write!(f, "launch of {app_name} failed: {detail}"),
        }
    }
}

/// Receives restore events. Emission is fire-and-forget: sinks must not
/// block and cannot fail the restore.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RestoreEvent);
}

#[derive(Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: RestoreEvent) {}
}

impl EventSink for flume::Sender<RestoreEvent> {
    fn emit(&self, event: RestoreEvent) {
        if self.send(event).is_err() {
            trace!("restore event receiver dropped");
        }
    }
}
