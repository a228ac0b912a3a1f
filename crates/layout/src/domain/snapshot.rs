#![forbid(unsafe_code)]

use super::{DisplayDescriptor, DisplayId, WindowDescriptor};
use serde::{Deserialize, Serialize};
use serde_with::{TimestampSeconds, serde_as};
use std::collections::BTreeMap;
use std::time::SystemTime;

/// A named capture of window and display layout.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Assigned by the store on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub created_at: SystemTime,
    /// Capture order; not significant for restoration.
    pub windows: Vec<WindowDescriptor>,
    /// Display configuration at capture time.
    pub displays: Vec<DisplayDescriptor>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Snapshot {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        windows: Vec<WindowDescriptor>,
        displays: Vec<DisplayDescriptor>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            created_at: SystemTime::now(),
            windows,
            displays,
            metadata: BTreeMap::new(),
        }
    }

    pub fn display(&self, id: DisplayId) -> Option<&DisplayDescriptor> {
        self.displays.iter().find(|d| d.display_id == id)
    }

    /// Drop the first window entry of `app_name`, restricted to an exact
    /// title match when `window_title` is given. Returns whether an entry
    /// was removed.
    pub fn remove_window(&mut self, app_name: &str, window_title: Option<&str>) -> bool {
        let position = self.windows.iter().position(|w| {
            w.app_name == app_name && window_title.is_none_or(|title| w.window_title == title)
        });
        match position {
            Some(index) => {
                self.windows.remove(index);
                true
            }
            None => false,
        }
    }
}
