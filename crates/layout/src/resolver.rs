#![forbid(unsafe_code)]

use crate::domain::{DisplayDescriptor, DisplayId, FALLBACK_DISPLAY_ID, Rect};

/// Maps window rectangles to the display they belong to.
///
/// Resolution order:
///
/// 1. The display with the largest positive intersection area. On equal
///    areas the display enumerated first keeps priority.
/// 2. The first display containing the window's centre point.
/// 3. The main display.
///
/// Testing only the top-left corner would misassign windows that straddle
/// a display boundary, hence the area comparison.
#[derive(Debug, Clone, Copy)]
pub struct DisplayResolver<'a> {
    displays: &'a [DisplayDescriptor],
    main: DisplayId,
}

impl<'a> DisplayResolver<'a> {
    pub fn new(displays: &'a [DisplayDescriptor]) -> Self {
        Self {
            displays,
            main: main_display_id(displays),
        }
    }

    pub fn main(&self) -> DisplayId {
        self.main
    }

    pub fn resolve(&self, window: &Rect) -> DisplayId {
        let mut best: Option<(DisplayId, i64)> = None;
        for display in self.displays {
            let area = display.bounds().intersection_area(window);
            if area > 0 && best.is_none_or(|(_, best_area)| area > best_area) {
                best = Some((display.display_id, area));
            }
        }
        if let Some((id, _)) = best {
            return id;
        }

        let center = window.center();
        self.displays
            .iter()
            .find(|display| display.bounds().contains_point(center))
            .map_or(self.main, |display| display.display_id)
    }
}

/// The display flagged as main, else the first one, else the hard-coded
/// fallback id.
pub fn main_display_id(displays: &[DisplayDescriptor]) -> DisplayId {
    displays
        .iter()
        .find(|display| display.is_main)
        .or_else(|| displays.first())
        .map_or(FALLBACK_DISPLAY_ID, |display| display.display_id)
}
