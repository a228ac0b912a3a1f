#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Window enumeration filters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Enumeration {
    /// Owner names of system-shell processes whose windows are never listed.
    pub excluded_owners: Vec<String>,
}

impl Default for Enumeration {
    fn default() -> Self {
        Self {
            excluded_owners: [
                "Window Server",
                "Dock",
                "SystemUIServer",
                "Control Center",
                "Notification Center",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Enumeration {
    pub fn is_excluded(&self, owner: &str) -> bool {
        self.excluded_owners.iter().any(|name| name == owner)
    }
}
