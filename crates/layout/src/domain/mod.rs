#![forbid(unsafe_code)]

mod app;
mod display;
mod geometry;
mod snapshot;
mod window;

pub use app::RunningApp;
pub use display::{DisplayDescriptor, DisplayId, FALLBACK_DISPLAY_ID};
pub use geometry::Rect;
pub use snapshot::Snapshot;
pub use window::WindowDescriptor;
