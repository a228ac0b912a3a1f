#![forbid(unsafe_code)]

use crate::domain::Rect;
use crate::error::ControlError;

/// Moves, resizes and unminimizes windows of another process.
///
/// With a title, the first window of `pid` whose title matches exactly is
/// targeted; without one, its frontmost window.
pub trait GeometryMutator: Send + Sync {
    fn move_resize(&self, pid: u32, bounds: Rect, title: Option<&str>) -> Result<(), ControlError>;

    fn unminimize(&self, pid: u32, title: Option<&str>) -> Result<(), ControlError>;
}
