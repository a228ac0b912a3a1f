#![forbid(unsafe_code)]
#![allow(dead_code)]

use layout::clock::Clock;
use layout::control::{AppBackend, GeometryMutator, LaunchStrategy};
use layout::domain::{Rect, RunningApp};
use layout::enumeration::{DisplayBackend, RawDisplay, RawWindow, WindowBackend};
use layout::{ControlError, EnumerationError, RestoreEvent, Services};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// An app that is not running yet but can be launched.
#[derive(Debug, Clone)]
pub struct Installed {
    pub app: RunningApp,
    /// Windows that show up as soon as the launch is accepted.
    pub windows: Vec<RawWindow>,
}

#[derive(Debug, Default)]
pub struct State {
    pub displays: Vec<RawDisplay>,
    pub displays_fail: bool,
    pub permitted: bool,
    pub windows: Vec<RawWindow>,
    pub apps: Vec<RunningApp>,
    pub installed: Vec<Installed>,
    pub apps_fail: bool,
    pub geometry_fails: bool,

    pub moves: Vec<(u32, Rect, Option<String>)>,
    pub unminimized: Vec<u32>,
    pub activated: Vec<u32>,
    pub visibility: Vec<(u32, bool)>,
    pub launches: Vec<LaunchStrategy>,
    pub window_polls: usize,
}

/// In-memory desktop implementing every OS port.
#[derive(Debug, Clone)]
pub struct FakeDesktop {
    pub state: Arc<Mutex<State>>,
}

impl Default for FakeDesktop {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDesktop {
    pub fn new() -> Self {
        let state = State {
            displays: vec![
                RawDisplay {
                    id: 1,
                    bounds: Rect::new(0, 0, 1440, 900),
                },
                RawDisplay {
                    id: 2,
                    bounds: Rect::new(1440, 0, 2560, 1440),
                },
            ],
            permitted: true,
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn run(&self, name: &str, bundle_id: &str, pid: u32) -> &Self {
        self.state.lock().apps.push(app(name, bundle_id, pid));
        self
    }

    pub fn open(&self, name: &str, pid: u32, title: &str, bounds: Rect) -> &Self {
        self.state.lock().windows.push(window(name, pid, title, bounds));
        self
    }

    pub fn install(&self, name: &str, bundle_id: &str, pid: u32, windows: &[(&str, Rect)]) -> &Self {
        let installed = Installed {
            app: app(name, bundle_id, pid),
            windows: windows
                .iter()
                .map(|(title, bounds)| window(name, pid, title, *bounds))
                .collect(),
        };
        self.state.lock().installed.push(installed);
        self
    }

    pub fn moves(&self) -> Vec<(u32, Rect, Option<String>)> {
        self.state.lock().moves.clone()
    }

    pub fn bounds_of(&self, pid: u32, title: &str) -> Option<Rect> {
        self.state
            .lock()
            .windows
            .iter()
            .find(|w| w.owner_pid == pid && w.title == title)
            .map(|w| w.bounds)
    }

    pub fn services(&self, clock: &ManualClock, events: flume::Sender<RestoreEvent>) -> Services {
        Services {
            displays: Box::new(self.clone()),
            windows: Box::new(self.clone()),
            apps: Box::new(self.clone()),
            geometry: Box::new(self.clone()),
            clock: Box::new(clock.clone()),
            events: Box::new(events),
        }
    }
}

pub fn app(name: &str, bundle_id: &str, pid: u32) -> RunningApp {
    RunningApp {
        name: name.into(),
        bundle_id: (!bundle_id.is_empty()).then(|| bundle_id.to_owned()),
        pid,
        is_hidden: false,
        is_regular: true,
        is_active: false,
    }
}

pub fn window(owner: &str, pid: u32, title: &str, bounds: Rect) -> RawWindow {
    RawWindow {
        window_id: None,
        owner_name: owner.into(),
        owner_pid: pid,
        title: title.into(),
        bounds,
        layer: 0,
        space_id: None,
    }
}

fn target_window<'s>(state: &'s mut State, pid: u32, title: Option<&str>) -> Option<&'s mut RawWindow> {
    state
        .windows
        .iter_mut()
        .find(|w| w.owner_pid == pid && title.is_none_or(|title| w.title == title))
}

impl DisplayBackend for FakeDesktop {
    fn online_displays(&self) -> Result<Vec<RawDisplay>, EnumerationError> {
        let state = self.state.lock();
        if state.displays_fail {
            return Err(EnumerationError::Os("display list unavailable".into()));
        }
        Ok(state.displays.clone())
    }

    fn main_display(&self) -> Result<RawDisplay, EnumerationError> {
        let state = self.state.lock();
        if state.displays_fail {
            return Err(EnumerationError::Os("main display unavailable".into()));
        }
        state
            .displays
            .first()
            .copied()
            .ok_or(EnumerationError::Os("no displays".into()))
    }
}

impl WindowBackend for FakeDesktop {
    fn permission_granted(&self) -> bool {
        self.state.lock().permitted
    }

    fn on_screen_windows(&self) -> Result<Vec<RawWindow>, EnumerationError> {
        let mut state = self.state.lock();
        state.window_polls += 1;
        Ok(state.windows.clone())
    }
}

impl AppBackend for FakeDesktop {
    fn running_apps(&self) -> Result<Vec<RunningApp>, ControlError> {
        let state = self.state.lock();
        if state.apps_fail {
            return Err(ControlError::Script {
                status: Some(1),
                stderr: "System Events got an error".into(),
            });
        }
        Ok(state.apps.clone())
    }

    fn process_exists(&self, pid: u32) -> bool {
        self.state.lock().apps.iter().any(|app| app.pid == pid)
    }

    fn activate(&self, pid: u32) -> Result<(), ControlError> {
        self.state.lock().activated.push(pid);
        Ok(())
    }

    fn set_hidden(&self, pid: u32, hidden: bool) -> Result<(), ControlError> {
        let mut state = self.state.lock();
        state.visibility.push((pid, hidden));
        let app = state
            .apps
            .iter_mut()
            .find(|app| app.pid == pid)
            .ok_or(ControlError::ProcessNotFound(pid))?;
        app.is_hidden = hidden;
        Ok(())
    }

    fn launch(&self, strategy: &LaunchStrategy) -> Result<(), ControlError> {
        let mut state = self.state.lock();
        state.launches.push(strategy.clone());

        let position = state.installed.iter().position(|installed| match strategy {
            LaunchStrategy::BundleId(id) | LaunchStrategy::OpenBundleId(id) => {
                installed.app.bundle_id.as_deref() == Some(id.as_str())
            }
            LaunchStrategy::Name(name) | LaunchStrategy::OpenName(name) => {
                installed.app.name == *name
            }
        });
        let Some(position) = position else {
            return Err(ControlError::Script {
                status: Some(1),
                stderr: format!("can't find application for {strategy}"),
            });
        };

        let installed = state.installed.remove(position);
        state.apps.push(installed.app);
        state.windows.extend(installed.windows);
        Ok(())
    }
}

impl GeometryMutator for FakeDesktop {
    fn move_resize(&self, pid: u32, bounds: Rect, title: Option<&str>) -> Result<(), ControlError> {
        let mut state = self.state.lock();
        state.moves.push((pid, bounds, title.map(String::from)));
        if state.geometry_fails {
            return Err(ControlError::NoWindow { pid });
        }
        let window = target_window(&mut state, pid, title).ok_or(ControlError::NoWindow { pid })?;
        window.bounds = bounds;
        Ok(())
    }

    fn unminimize(&self, pid: u32, title: Option<&str>) -> Result<(), ControlError> {
        let mut state = self.state.lock();
        state.unminimized.push(pid);
        if state.geometry_fails {
            return Err(ControlError::NoWindow { pid });
        }
        target_window(&mut state, pid, title)
            .map(|_| ())
            .ok_or(ControlError::NoWindow { pid })
    }
}

/// Clock that only advances when slept on. Can cancel a token once a
/// given amount of time has been slept.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ClockState>>,
}

#[derive(Debug)]
struct ClockState {
    now: Instant,
    slept: Duration,
    sleeps: usize,
    cancel_after: Option<(Duration, CancellationToken)>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ClockState {
                now: Instant::now(),
                slept: Duration::ZERO,
                sleeps: 0,
                cancel_after: None,
            })),
        }
    }

    pub fn cancel_after(&self, after: Duration, token: CancellationToken) {
        self.inner.lock().cancel_after = Some((after, token));
    }

    pub fn slept(&self) -> Duration {
        self.inner.lock().slept
    }

    pub fn sleeps(&self) -> usize {
        self.inner.lock().sleeps
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.inner.lock().now
    }

    fn sleep(&self, duration: Duration) {
        let mut inner = self.inner.lock();
        inner.now += duration;
        inner.slept += duration;
        inner.sleeps += 1;
        if let Some((after, token)) = &inner.cancel_after {
            if inner.slept >= *after {
                token.cancel();
            }
        }
    }
}
