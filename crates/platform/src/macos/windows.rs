use super::MacDesktop;
use super::displays::to_rect;
use core_foundation::base::{CFType, TCFType};
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::number::CFNumber;
use core_foundation::string::CFString;
use core_graphics::display::CGDisplay;
use core_graphics::geometry::CGRect;
use core_graphics::window::{
    copy_window_info, kCGNullWindowID, kCGWindowListExcludeDesktopElements,
    kCGWindowListOptionOnScreenOnly,
};
use layout::EnumerationError;
use layout::enumeration::{RawWindow, WindowBackend};
use std::ffi::c_void;
use tracing::trace;

const WINDOW_NUMBER: &str = "kCGWindowNumber";
const OWNER_NAME: &str = "kCGWindowOwnerName";
const OWNER_PID: &str = "kCGWindowOwnerPID";
const NAME: &str = "kCGWindowName";
const BOUNDS: &str = "kCGWindowBounds";
const LAYER: &str = "kCGWindowLayer";

type WindowInfo = CFDictionary<CFString, CFType>;

fn number(info: &WindowInfo, key: &'static str) -> Option<i64> {
    info.find(&CFString::from_static_string(key))?
        .downcast::<CFNumber>()?
        .to_i64()
}

fn string(info: &WindowInfo, key: &'static str) -> Option<String> {
    info.find(&CFString::from_static_string(key))?
        .downcast::<CFString>()
        .map(|value| value.to_string())
}

fn bounds(info: &WindowInfo) -> Option<CGRect> {
    let value = info.find(&CFString::from_static_string(BOUNDS))?;
    if value.type_of() != CFDictionary::<*const c_void, *const c_void>::type_id() {
        return None;
    }
    // SAFETY: the type id check above guarantees a CFDictionary, and the get
    // rule retains it for the lifetime of `dict`.
    let dict: CFDictionary =
        unsafe { CFDictionary::wrap_under_get_rule(value.as_CFTypeRef() as CFDictionaryRef) };
    CGRect::from_dict_representation(&dict)
}

fn raw_window(info: &WindowInfo) -> Option<RawWindow> {
    Some(RawWindow {
        window_id: number(info, WINDOW_NUMBER).and_then(|id| u32::try_from(id).ok()),
        owner_name: string(info, OWNER_NAME).unwrap_or_default(),
        owner_pid: u32::try_from(number(info, OWNER_PID)?).ok()?,
        title: string(info, NAME).unwrap_or_default(),
        bounds: to_rect(bounds(info)?),
        layer: number(info, LAYER).and_then(|layer| i32::try_from(layer).ok())?,
        space_id: None,
    })
}

impl WindowBackend for MacDesktop {
    fn permission_granted(&self) -> bool {
        CGDisplay::main().id != 0
            && copy_window_info(kCGWindowListOptionOnScreenOnly, kCGNullWindowID).is_some()
    }

    fn on_screen_windows(&self) -> Result<Vec<RawWindow>, EnumerationError> {
        let list = copy_window_info(
            kCGWindowListOptionOnScreenOnly | kCGWindowListExcludeDesktopElements,
            kCGNullWindowID,
        )
        .ok_or_else(|| EnumerationError::Os("CGWindowListCopyWindowInfo returned null".into()))?;

        let mut windows = Vec::with_capacity(list.len() as usize);
        for item in list.iter() {
            let item: *const c_void = *item;
            if item.is_null() {
                continue;
            }
            // SAFETY: CGWindowListCopyWindowInfo returns an array of
            // CFDictionary; the get rule retains each entry while in use.
            let info: WindowInfo = unsafe { CFDictionary::wrap_under_get_rule(item as CFDictionaryRef) };
            match raw_window(&info) {
                Some(window) => windows.push(window),
                None => trace!("skipping window entry with missing fields"),
            }
        }
        Ok(windows)
    }
}
