#![forbid(unsafe_code)]

use super::{DisplayId, Rect};
use serde::{Deserialize, Serialize};

/// One window's placement, either captured into a snapshot or observed live.
///
/// `process_id` and `window_id` only mean something while the owning
/// process is alive; they are never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDescriptor {
    pub app_name: String,
    #[serde(default)]
    pub window_title: String,
    #[serde(flatten)]
    pub bounds: Rect,
    /// Approximate: derived from the owning app being hidden, not from a
    /// per-window minimize flag.
    #[serde(default)]
    pub is_minimized: bool,
    #[serde(default)]
    pub is_hidden: bool,
    pub display_id: DisplayId,
    #[serde(skip)]
    pub process_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<u64>,
    #[serde(skip)]
    pub window_id: Option<u32>,
}

impl WindowDescriptor {
    pub fn new(app_name: impl Into<String>, window_title: impl Into<String>, bounds: Rect) -> Self {
        Self {
            app_name: app_name.into(),
            window_title: window_title.into(),
            bounds,
            is_minimized: false,
            is_hidden: false,
            display_id: 0,
            process_id: 0,
            bundle_id: None,
            space_id: None,
            window_id: None,
        }
    }

    pub fn with_bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_id = Some(bundle_id.into());
        self
    }

    pub fn with_process_id(mut self, pid: u32) -> Self {
        self.process_id = pid;
        self
    }

    pub fn with_display(mut self, display_id: DisplayId) -> Self {
        self.display_id = display_id;
        self
    }

    pub fn minimized(mut self, minimized: bool) -> Self {
        self.is_minimized = minimized;
        self
    }
}
