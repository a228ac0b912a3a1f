#![deny(unsafe_code)]

pub mod applescript;
#[cfg(target_os = "macos")]
#[allow(unsafe_code)]
mod macos;
mod process;
mod unsupported;

#[cfg(target_os = "macos")]
pub use macos::MacDesktop;
pub use process::ProcessProbe;
pub use unsupported::UnsupportedDesktop;

use layout::clock::SystemClock;
use layout::{ControlError, EventSink, Services};
use std::fmt;

/// How to grant the privacy permissions window management needs.
pub const PERMISSION_INSTRUCTIONS: &str = "\
SpaceWarp needs two macOS privacy permissions:

1. Accessibility (move, resize and focus windows)
   System Settings > Privacy & Security > Accessibility
   Add your terminal (or the spacewarp binary) and enable it.

2. Screen Recording (read window titles)
   System Settings > Privacy & Security > Screen Recording
   Add the same application and enable it.

Restart the terminal after granting either permission.";

const PRIVACY_SETTINGS_URL: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Accessibility,
    ScreenRecording,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accessibility => "Accessibility",
            Self::ScreenRecording => "Screen Recording",
        })
    }
}

/// Privacy permissions this process has not been granted.
pub fn missing_permissions() -> Vec<Permission> {
    #[cfg(target_os = "macos")]
    {
        macos::missing_permissions()
    }
    #[cfg(not(target_os = "macos"))]
    {
        vec![Permission::Accessibility, Permission::ScreenRecording]
    }
}

/// Opens the Privacy & Security pane of System Settings.
pub fn open_privacy_settings() -> Result<(), ControlError> {
    if cfg!(target_os = "macos") {
        applescript::open(&[PRIVACY_SETTINGS_URL.to_owned()])
    } else {
        Err(ControlError::Unsupported)
    }
}

/// Engine services backed by the host OS.
pub fn native_services(events: Box<dyn EventSink>) -> Services {
    #[cfg(target_os = "macos")]
    let desktop = MacDesktop::new();
    #[cfg(not(target_os = "macos"))]
    let desktop = UnsupportedDesktop;

    Services {
        displays: Box::new(desktop.clone()),
        windows: Box::new(desktop.clone()),
        apps: Box::new(desktop.clone()),
        geometry: Box::new(desktop),
        clock: Box::new(SystemClock),
        events,
    }
}
