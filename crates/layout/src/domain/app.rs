#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// A running application process as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningApp {
    pub name: String,
    pub bundle_id: Option<String>,
    pub pid: u32,
    pub is_hidden: bool,
    /// User-facing app (shows in the Dock), as opposed to agents and
    /// background-only helpers.
    pub is_regular: bool,
    pub is_active: bool,
}
