#![forbid(unsafe_code)]

use layout::control::{AppBackend, GeometryMutator, LaunchStrategy};
use layout::domain::{Rect, RunningApp};
use layout::enumeration::{DisplayBackend, RawDisplay, RawWindow, WindowBackend};
use layout::{ControlError, EnumerationError};

/// Desktop for hosts without a window-server integration. Every query
/// fails, which the enumerators turn into fallback results.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedDesktop;

impl DisplayBackend for UnsupportedDesktop {
    fn online_displays(&self) -> Result<Vec<RawDisplay>, EnumerationError> {
        Err(EnumerationError::Unsupported)
    }

    fn main_display(&self) -> Result<RawDisplay, EnumerationError> {
        Err(EnumerationError::Unsupported)
    }
}

impl WindowBackend for UnsupportedDesktop {
    fn permission_granted(&self) -> bool {
        false
    }

    fn on_screen_windows(&self) -> Result<Vec<RawWindow>, EnumerationError> {
        Err(EnumerationError::Unsupported)
    }
}

impl AppBackend for UnsupportedDesktop {
    fn running_apps(&self) -> Result<Vec<RunningApp>, ControlError> {
        Err(ControlError::Unsupported)
    }

    fn process_exists(&self, _pid: u32) -> bool {
        false
    }

    fn activate(&self, _pid: u32) -> Result<(), ControlError> {
        Err(ControlError::Unsupported)
    }

    fn set_hidden(&self, _pid: u32, _hidden: bool) -> Result<(), ControlError> {
        Err(ControlError::Unsupported)
    }

    fn launch(&self, _strategy: &LaunchStrategy) -> Result<(), ControlError> {
        Err(ControlError::Unsupported)
    }
}

impl GeometryMutator for UnsupportedDesktop {
    fn move_resize(&self, _pid: u32, _bounds: Rect, _title: Option<&str>) -> Result<(), ControlError> {
        Err(ControlError::Unsupported)
    }

    fn unminimize(&self, _pid: u32, _title: Option<&str>) -> Result<(), ControlError> {
        Err(ControlError::Unsupported)
    }
}
