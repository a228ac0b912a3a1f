#![forbid(unsafe_code)]

use super::{DisplayBackend, DisplayEnumerator};
use crate::control::AppBackend;
use crate::domain::{DisplayDescriptor, Rect, RunningApp, WindowDescriptor};
use crate::error::EnumerationError;
use crate::resolver::DisplayResolver;
use config::Enumeration;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A window entry as reported by the window server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWindow {
    pub window_id: Option<u32>,
    pub owner_name: String,
    pub owner_pid: u32,
    pub title: String,
    pub bounds: Rect,
    pub layer: i32,
    pub space_id: Option<u64>,
}

pub trait WindowBackend: Send + Sync {
    /// Whether the process may read window titles and geometry.
    fn permission_granted(&self) -> bool;

    /// On-screen windows, front to back.
    fn on_screen_windows(&self) -> Result<Vec<RawWindow>, EnumerationError>;
}

/// Turns raw window-server entries into [`WindowDescriptor`]s.
#[derive(Clone, Copy)]
pub struct WindowEnumerator<'a> {
    windows: &'a dyn WindowBackend,
    displays: &'a dyn DisplayBackend,
    apps: &'a dyn AppBackend,
    filter: &'a Enumeration,
}

impl<'a> WindowEnumerator<'a> {
    pub fn new(
        windows: &'a dyn WindowBackend,
        displays: &'a dyn DisplayBackend,
        apps: &'a dyn AppBackend,
        filter: &'a Enumeration,
    ) -> Self {
        Self {
            windows,
            displays,
            apps,
            filter,
        }
    }

    /// Enumerates displays once and resolves every window against them.
    pub fn enumerate(&self, app: Option<&str>) -> Vec<WindowDescriptor> {
        let displays = DisplayEnumerator::new(self.displays).enumerate();
        self.enumerate_on(app, &displays)
    }

    pub fn enumerate_on(
        &self,
        app: Option<&str>,
        displays: &[DisplayDescriptor],
    ) -> Vec<WindowDescriptor> {
        if !self.windows.permission_granted() {
            debug!("window information permission missing");
            return Vec::new();
        }

        let raw = match self.windows.on_screen_windows() {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, "failed to list windows");
                return Vec::new();
            }
        };

        let apps = self.apps_by_pid();
        let resolver = DisplayResolver::new(displays);

        raw.into_iter()
            .filter(|window| self.keep(window, app))
            .map(|window| {
                let owner = apps.get(&window.owner_pid);
                let hidden = owner.is_some_and(|app| app.is_hidden);
                WindowDescriptor {
                    display_id: resolver.resolve(&window.bounds),
                    bundle_id: owner.and_then(|app| app.bundle_id.clone()),
                    is_minimized: hidden,
                    is_hidden: hidden,
                    process_id: window.owner_pid,
                    space_id: window.space_id,
                    window_id: window.window_id,
                    ..WindowDescriptor::new(window.owner_name, window.title, window.bounds)
                }
            })
            .collect()
    }

    fn keep(&self, window: &RawWindow, app: Option<&str>) -> bool {
        window.layer == 0
            && !window.owner_name.is_empty()
            && !self.filter.is_excluded(&window.owner_name)
            && app.is_none_or(|app| window.owner_name == app)
            && window.bounds.is_valid()
    }

    fn apps_by_pid(&self) -> HashMap<u32, RunningApp> {
        match self.apps.running_apps() {
            Ok(apps) => apps.into_iter().map(|app| (app.pid, app)).collect(),
            Err(err) => {
                debug!(%err, "running apps unavailable, windows will not carry bundle ids");
                HashMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::LaunchStrategy;
    use crate::enumeration::RawDisplay;
    use crate::error::ControlError;
    use pretty_assertions::assert_eq;

    struct Desk {
        permitted: bool,
        windows: Result<Vec<RawWindow>, EnumerationError>,
        apps: Vec<RunningApp>,
    }

    impl WindowBackend for Desk {
        fn permission_granted(&self) -> bool {
            self.permitted
        }

        fn on_screen_windows(&self) -> Result<Vec<RawWindow>, EnumerationError> {
            self.windows.clone()
        }
    }

    impl DisplayBackend for Desk {
        fn online_displays(&self) -> Result<Vec<RawDisplay>, EnumerationError> {
            Ok(vec![
                RawDisplay {
                    id: 1,
                    bounds: Rect::new(0, 0, 1440, 900),
                },
                RawDisplay {
                    id: 2,
                    bounds: Rect::new(1440, 0, 1920, 1080),
                },
            ])
        }

        fn main_display(&self) -> Result<RawDisplay, EnumerationError> {
            Ok(RawDisplay {
                id: 1,
                bounds: Rect::new(0, 0, 1440, 900),
            })
        }
    }

    impl AppBackend for Desk {
        fn running_apps(&self) -> Result<Vec<RunningApp>, ControlError> {
            Ok(self.apps.clone())
        }

        fn process_exists(&self, _pid: u32) -> bool {
            true
        }

        fn activate(&self, _pid: u32) -> Result<(), ControlError> {
            Ok(())
        }

        fn set_hidden(&self, _pid: u32, _hidden: bool) -> Result<(), ControlError> {
            Ok(())
        }

        fn launch(&self, _strategy: &LaunchStrategy) -> Result<(), ControlError> {
            Ok(())
        }
    }

    fn raw(owner: &str, pid: u32, title: &str, bounds: Rect) -> RawWindow {
        RawWindow {
            window_id: Some(pid * 10),
            owner_name: owner.into(),
            owner_pid: pid,
            title: title.into(),
            bounds,
            layer: 0,
            space_id: None,
        }
    }

    fn app(name: &str, pid: u32, bundle_id: &str, is_hidden: bool) -> RunningApp {
        RunningApp {
            name: name.into(),
            bundle_id: Some(bundle_id.into()),
            pid,
            is_hidden,
            is_regular: true,
            is_active: false,
        }
    }

    fn desk() -> Desk {
        let mut menu_bar = raw("Safari", 100, "", Rect::new(0, 0, 1440, 24));
        menu_bar.layer = 25;
        Desk {
            permitted: true,
            windows: Ok(vec![
                raw("Safari", 100, "Docs", Rect::new(100, 100, 800, 600)),
                menu_bar,
                raw("Dock", 50, "", Rect::new(0, 850, 1440, 50)),
                raw("Terminal", 200, "zsh", Rect::new(1600, 50, 640, 480)),
                raw("", 300, "", Rect::new(0, 0, 10, 10)),
                raw("Finder", 400, "", Rect::new(0, 0, 0, 0)),
            ]),
            apps: vec![
                app("Safari", 100, "com.apple.Safari", false),
                app("Terminal", 200, "com.apple.Terminal", true),
            ],
        }
    }

    #[test]
    fn filters_and_enriches_windows() {
        let desk = desk();
        let filter = Enumeration::default();
        let windows = WindowEnumerator::new(&desk, &desk, &desk, &filter).enumerate(None);

        let names: Vec<_> = windows.iter().map(|w| w.app_name.as_str()).collect();
        assert_eq!(names, ["Safari", "Terminal"]);

        let safari = &windows[0];
        assert_eq!(safari.display_id, 1);
        assert_eq!(safari.bundle_id.as_deref(), Some("com.apple.Safari"));
        assert_eq!(safari.process_id, 100);
        assert_eq!(safari.window_id, Some(1000));
        assert!(!safari.is_minimized);

        let terminal = &windows[1];
        assert_eq!(terminal.display_id, 2);
        assert!(terminal.is_hidden);
        assert!(terminal.is_minimized);
    }

    #[test]
    fn filters_by_app_name() {
        let desk = desk();
        let filter = Enumeration::default();
        let windows = WindowEnumerator::new(&desk, &desk, &desk, &filter).enumerate(Some("Terminal"));
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].window_title, "zsh");
    }

    #[test]
    fn custom_exclusions_apply() {
        let desk = desk();
        let filter = Enumeration {
            excluded_owners: vec!["Safari".into()],
        };
        let windows = WindowEnumerator::new(&desk, &desk, &desk, &filter).enumerate(None);
        let names: Vec<_> = windows.iter().map(|w| w.app_name.as_str()).collect();
        assert_eq!(names, ["Dock", "Terminal"]);
    }

    #[test]
    fn missing_permission_yields_nothing() {
        let desk = Desk {
            permitted: false,
            ..desk()
        };
        let filter = Enumeration::default();
        assert!(WindowEnumerator::new(&desk, &desk, &desk, &filter).enumerate(None).is_empty());
    }

    #[test]
    fn backend_failure_yields_nothing() {
        let desk = Desk {
            windows: Err(EnumerationError::Os("CGWindowListCopyWindowInfo returned null".into())),
            ..desk()
        };
        let filter = Enumeration::default();
        assert!(WindowEnumerator::new(&desk, &desk, &desk, &filter).enumerate(None).is_empty());
    }
}
