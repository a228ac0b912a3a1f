#![forbid(unsafe_code)]

use crate::domain::WindowDescriptor;
use serde::Serialize;
use serde_with::{TimestampMilliSeconds, serde_as};
use std::fmt;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Every launch strategy failed.
    LaunchFailed,
    /// The app launched but no window showed up within the wait.
    WindowTimeout,
    /// The restore was cancelled before this item completed.
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LaunchFailed => "launch_failed",
            Self::WindowTimeout => "window_timeout",
            Self::Cancelled => "cancelled",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub app_name: String,
    pub window_title: String,
    pub restored: bool,
    pub launched: bool,
    pub reason: Option<FailureReason>,
}

impl ItemOutcome {
    pub fn restored(window: &WindowDescriptor, launched: bool) -> Self {
        Self {
            app_name: window.app_name.clone(),
            window_title: window.window_title.clone(),
            restored: true,
            launched,
            reason: None,
        }
    }

    pub fn failed(window: &WindowDescriptor, launched: bool, reason: FailureReason) -> Self {
        Self {
            app_name: window.app_name.clone(),
            window_title: window.window_title.clone(),
            restored: false,
            launched,
            reason: Some(reason),
        }
    }
}

/// Outcome of one restore call. Built fresh per call and never persisted.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestorationReport {
    pub snapshot_name: String,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub started_at: SystemTime,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub finished_at: SystemTime,
    pub total: usize,
    pub restored_count: usize,
    pub failed_count: usize,
    pub items: Vec<ItemOutcome>,
}

impl RestorationReport {
    pub fn from_items(
        snapshot_name: impl Into<String>,
        started_at: SystemTime,
        finished_at: SystemTime,
        items: Vec<ItemOutcome>,
    ) -> Self {
        let restored_count = items.iter().filter(|item| item.restored).count();
        Self {
            snapshot_name: snapshot_name.into(),
            started_at,
            finished_at,
            total: items.len(),
            restored_count,
            failed_count: items.len() - restored_count,
            items,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed_count == 0
    }

    /// Sorted, de-duplicated names of apps with at least one failed item.
    pub fn failed_apps(&self) -> Vec<&str> {
        let mut apps: Vec<&str> = self
            .items
            .iter()
            .filter(|item| !item.restored)
            .map(|item| item.app_name.as_str())
            .collect();
        apps.sort_unstable();
        apps.dedup();
        apps
    }
}
