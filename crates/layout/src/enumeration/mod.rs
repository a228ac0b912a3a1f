#![forbid(unsafe_code)]

mod displays;
mod windows;

pub use displays::{DisplayBackend, DisplayEnumerator, RawDisplay};
pub use windows::{RawWindow, WindowBackend, WindowEnumerator};
