#![forbid(unsafe_code)]

use super::MacDesktop;
use core_graphics::display::CGDisplay;
use core_graphics::geometry::CGRect;
use layout::EnumerationError;
use layout::domain::Rect;
use layout::enumeration::{DisplayBackend, RawDisplay};

/// Rounds a CoreGraphics rectangle onto the integer point grid.
pub(super) fn to_rect(rect: CGRect) -> Rect {
    Rect::new(
        rect.origin.x.round() as i32,
        rect.origin.y.round() as i32,
        rect.size.width.round() as i32,
        rect.size.height.round() as i32,
    )
}

impl DisplayBackend for MacDesktop {
    fn online_displays(&self) -> Result<Vec<RawDisplay>, EnumerationError> {
        let ids = CGDisplay::active_displays()
            .map_err(|code| EnumerationError::Os(format!("CGGetActiveDisplayList failed ({code})")))?;
        Ok(ids
            .into_iter()
            .map(|id| RawDisplay {
                id,
                bounds: to_rect(CGDisplay::new(id).bounds()),
            })
            .collect())
    }

    fn main_display(&self) -> Result<RawDisplay, EnumerationError> {
        let main = CGDisplay::main();
        if main.id == 0 {
            return Err(EnumerationError::Os("CGMainDisplayID returned 0".into()));
        }
        Ok(RawDisplay {
            id: main.id,
            bounds: to_rect(main.bounds()),
        })
    }
}
