#![forbid(unsafe_code)]

use super::Rect;
use serde::{Deserialize, Serialize};

/// OS display identifier. Stable for the lifetime of the window server
/// session, not across reboots or reconnects.
pub type DisplayId = u32;

/// Identifier of the hard-coded display used when nothing can be queried.
pub const FALLBACK_DISPLAY_ID: DisplayId = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDescriptor {
    pub display_id: DisplayId,
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub x: i32,
    pub y: i32,
    pub is_main: bool,
}

impl DisplayDescriptor {
    pub fn new(display_id: DisplayId, name: impl Into<String>, bounds: Rect, is_main: bool) -> Self {
        Self {
            display_id,
            name: name.into(),
            width: bounds.width,
            height: bounds.height,
            x: bounds.x,
            y: bounds.y,
            is_main,
        }
    }

    /// 1920x1080 main display at the origin.
    pub fn fallback() -> Self {
        Self::new(
            FALLBACK_DISPLAY_ID,
            "Display",
            Rect::new(0, 0, 1920, 1080),
            true,
        )
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}
