#![forbid(unsafe_code)]

use crate::domain::{DisplayDescriptor, DisplayId, Rect};
use crate::error::EnumerationError;
use tracing::{debug, warn};

/// A display as reported by the OS, before naming and main-flagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDisplay {
    pub id: DisplayId,
    pub bounds: Rect,
}

pub trait DisplayBackend: Send + Sync {
    /// Connected displays in OS enumeration order.
    fn online_displays(&self) -> Result<Vec<RawDisplay>, EnumerationError>;
    fn main_display(&self) -> Result<RawDisplay, EnumerationError>;
}

/// Lists displays, absorbing every failure into a fallback chain so that
/// the result is never empty.
#[derive(Clone, Copy)]
pub struct DisplayEnumerator<'a> {
    backend: &'a dyn DisplayBackend,
}

impl<'a> DisplayEnumerator<'a> {
    pub fn new(backend: &'a dyn DisplayBackend) -> Self {
        Self { backend }
    }

    pub fn enumerate(&self) -> Vec<DisplayDescriptor> {
        let raw = match self.backend.online_displays() {
            Ok(raw) if !raw.is_empty() => raw,
            Ok(_) => {
                warn!("display list is empty, using main display fallback");
                return self.fallback();
            }
            Err(err) => {
                warn!(%err, "failed to list displays, using main display fallback");
                return self.fallback();
            }
        };

        let main_id = match self.backend.main_display() {
            Ok(main) => Some(main.id),
            Err(err) => {
                debug!(%err, "main display unknown, flagging the first display");
                None
            }
        };
        let main_id = main_id
            .filter(|id| raw.iter().any(|display| display.id == *id))
            .unwrap_or(raw[0].id);

        raw.into_iter()
            .map(|display| {
                DisplayDescriptor::new(
                    display.id,
                    format!("Display {}", display.id),
                    display.bounds,
                    display.id == main_id,
                )
            })
            .collect()
    }

    fn fallback(&self) -> Vec<DisplayDescriptor> {
        match self.backend.main_display() {
            Ok(main) if main.id != 0 => {
                vec![DisplayDescriptor::new(main.id, "Main Display", main.bounds, true)]
            }
            Ok(_) => {
                warn!("main display id is zero, using hard-coded geometry");
                vec![DisplayDescriptor::fallback()]
            }
            Err(err) => {
                warn!(%err, "main display unavailable, using hard-coded geometry");
                vec![DisplayDescriptor::fallback()]
            }
        }
    }
}
