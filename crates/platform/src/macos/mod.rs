//! Window-server and automation backends for macOS.
//!
//! Displays and windows come from CoreGraphics. Activation, visibility,
//! geometry and launches go through System Events scripts and `open`.

mod apps;
mod displays;
mod windows;

use crate::Permission;
use crate::process::ProcessProbe;
use std::sync::Arc;

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
}

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGPreflightScreenCaptureAccess() -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct MacDesktop {
    processes: Arc<ProcessProbe>,
}

impl MacDesktop {
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) fn missing_permissions() -> Vec<Permission> {
    let mut missing = Vec::new();
    // SAFETY: both calls take no arguments and only read TCC state.
    if !unsafe { AXIsProcessTrusted() } {
        missing.push(Permission::Accessibility);
    }
    if !unsafe { CGPreflightScreenCaptureAccess() } {
        missing.push(Permission::ScreenRecording);
    }
    missing
}
