#![forbid(unsafe_code)]

use crate::clock::Clock;
use crate::control::{AppBackend, AppControl, AppSet, GeometryMutator};
use crate::domain::{DisplayDescriptor, Rect, RunningApp, Snapshot, WindowDescriptor};
use crate::enumeration::{DisplayBackend, DisplayEnumerator, WindowBackend, WindowEnumerator};
use crate::events::{EventSink, RestoreEvent};
use crate::report::{FailureReason, ItemOutcome, RestorationReport};
use config::Config;
use std::time::SystemTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn};

/// OS-facing ports the engine drives.
pub struct Services {
    pub displays: Box<dyn DisplayBackend>,
    pub windows: Box<dyn WindowBackend>,
    pub apps: Box<dyn AppBackend>,
    pub geometry: Box<dyn GeometryMutator>,
    pub clock: Box<dyn Clock>,
    pub events: Box<dyn EventSink>,
}

/// Captures the live layout and drives it back to a saved snapshot.
///
/// All calls are blocking and sequential. No OS failure escapes: queries
/// degrade to empty or fallback results and per-window failures end up in
/// the [`RestorationReport`].
pub struct RestoreEngine {
    config: Config,
    services: Services,
}

impl RestoreEngine {
    pub fn new(config: Config, services: Services) -> Self {
        Self { config, services }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn permission_granted(&self) -> bool {
        self.services.windows.permission_granted()
    }

    pub fn displays(&self) -> Vec<DisplayDescriptor> {
        DisplayEnumerator::new(self.services.displays.as_ref()).enumerate()
    }

    pub fn windows(&self, app: Option<&str>) -> Vec<WindowDescriptor> {
        self.window_enumerator().enumerate(app)
    }

    pub fn running_apps(&self) -> Vec<RunningApp> {
        match self.services.apps.running_apps() {
            Ok(apps) => apps,
            Err(err) => {
                warn!(%err, "failed to list running apps");
                Vec::new()
            }
        }
    }

    /// Snapshot of every visible window, resolved against one display
    /// enumeration.
    pub fn capture(&self, name: &str, description: &str) -> Snapshot {
        let displays = self.displays();
        let windows = self.window_enumerator().enumerate_on(None, &displays);
        info!(
            snapshot = name,
            windows = windows.len(),
            displays = displays.len(),
            "captured layout"
        );

        let mut snapshot = Snapshot::new(name, description, windows, displays);
        snapshot
            .metadata
            .insert("window_count".into(), snapshot.windows.len().into());
        snapshot
            .metadata
            .insert("display_count".into(), snapshot.displays.len().into());
        snapshot
            .metadata
            .insert("app_version".into(), env!("CARGO_PKG_VERSION").into());
        snapshot
    }

    /// Restores every window of `snapshot` in order. Always returns a report
    /// covering each window exactly once.
    pub fn restore(&self, snapshot: &Snapshot, cancel: &CancellationToken) -> RestorationReport {
        let _span = info_span!("restore", snapshot = %snapshot.name).entered();
        let started_at = SystemTime::now();
        let control = self.app_control();

        if self.config.restore.hide_others && !cancel.is_cancelled() {
            let hidden = control.hide_all_except(&AppSet::from(snapshot));
            debug!(?hidden, "hid apps");
        }

        let mut live = self.windows(None);
        let mut items = Vec::with_capacity(snapshot.windows.len());

        for target in &snapshot.windows {
            self.services.events.emit(RestoreEvent::RestoreStarted {
                app_name: target.app_name.clone(),
                window_title: target.window_title.clone(),
            });

            if cancel.is_cancelled() {
                items.push(self.finish(ItemOutcome::failed(target, false, FailureReason::Cancelled)));
                continue;
            }

            let outcome = match pick_candidate(&live, target) {
                Some(index) => {
                    let window = live[index].clone();
                    live[index].bounds = self.place(&control, &window, target);
                    ItemOutcome::restored(target, false)
                }
                None => self.launch_and_place(&control, target, cancel, &mut live),
            };
            items.push(self.finish(outcome));
        }

        let report = RestorationReport::from_items(&snapshot.name, started_at, SystemTime::now(), items);
        info!(
            total = report.total,
            restored = report.restored_count,
            failed = report.failed_count,
            "restore finished"
        );
        report
    }

    fn launch_and_place(
        &self,
        control: &AppControl<'_>,
        target: &WindowDescriptor,
        cancel: &CancellationToken,
        live: &mut Vec<WindowDescriptor>,
    ) -> ItemOutcome {
        let launch = control.launch_by_identity(target.bundle_id.as_deref(), &target.app_name);
        if !launch.success {
            return ItemOutcome::failed(target, false, FailureReason::LaunchFailed);
        }

        match self.wait_for_window(target, cancel) {
            Ok((index, mut appeared)) => {
                let window = appeared[index].clone();
                appeared[index].bounds = self.place(control, &window, target);
                live.extend(appeared);
                ItemOutcome::restored(target, true)
            }
            Err(reason) => ItemOutcome::failed(target, true, reason),
        }
    }

    /// Polls until a window of the launched app appears. Returns every
    /// window of the app seen on that poll and the index of the chosen one.
    fn wait_for_window(
        &self,
        target: &WindowDescriptor,
        cancel: &CancellationToken,
    ) -> Result<(usize, Vec<WindowDescriptor>), FailureReason> {
        let restore = &self.config.restore;
        let clock = self.services.clock.as_ref();
        let started = clock.now();

        loop {
            if cancel.is_cancelled() {
                return Err(FailureReason::Cancelled);
            }

            let windows = self.windows(Some(&target.app_name));
            if let Some(index) = pick_candidate(&windows, target) {
                debug!(app = %target.app_name, waited = ?clock.now().duration_since(started), "window appeared");
                return Ok((index, windows));
            }

            let elapsed = clock.now().duration_since(started);
            if elapsed >= restore.window_timeout {
                warn!(app = %target.app_name, timeout = ?restore.window_timeout, "no window appeared after launch");
                return Err(FailureReason::WindowTimeout);
            }
            let remaining = restore.window_timeout - elapsed;
            clock.sleep(restore.poll_interval(elapsed).min(remaining));
        }
    }

    /// Brings `live` forward and moves it onto `target`. Returns the bounds
    /// the window is believed to have afterwards.
    fn place(&self, control: &AppControl<'_>, live: &WindowDescriptor, target: &WindowDescriptor) -> Rect {
        let restore = &self.config.restore;
        let pid = live.process_id;

        control.unhide(pid);
        control.activate(pid);
        self.services.clock.sleep(restore.settle_delay);

        let title = Some(live.window_title.as_str()).filter(|title| !title.is_empty());
        let mut bounds = live.bounds;
        if !target.bounds.is_valid() {
            debug!(app = %target.app_name, bounds = ?target.bounds, "target bounds are degenerate, not moving");
        } else if live.bounds.within_tolerance(&target.bounds, restore.geometry_tolerance) {
            debug!(app = %target.app_name, "window already in place");
        } else {
            match self.services.geometry.move_resize(pid, target.bounds, title) {
                Ok(()) => bounds = target.bounds,
                Err(err) => warn!(app = %target.app_name, pid, %err, "geometry mutation failed"),
            }
        }

        if target.is_minimized {
            if let Err(err) = self.services.geometry.unminimize(pid, title) {
                warn!(app = %target.app_name, pid, %err, "failed to unminimize window");
            }
        }
        bounds
    }

    fn finish(&self, outcome: ItemOutcome) -> ItemOutcome {
        let event = match outcome.reason {
            None => RestoreEvent::Restored {
                app_name: outcome.app_name.clone(),
                window_title: outcome.window_title.clone(),
            },
            Some(reason) => RestoreEvent::RestoreFailed {
                app_name: outcome.app_name.clone(),
                window_title: outcome.window_title.clone(),
                reason,
            },
        };
        self.services.events.emit(event);
        outcome
    }

    fn app_control(&self) -> AppControl<'_> {
        AppControl::new(self.services.apps.as_ref(), self.services.events.as_ref())
    }

    fn window_enumerator(&self) -> WindowEnumerator<'_> {
        WindowEnumerator::new(
            self.services.windows.as_ref(),
            self.services.displays.as_ref(),
            self.services.apps.as_ref(),
            &self.config.enumeration,
        )
    }
}

/// Index of the first live window of the target's app with the same title,
/// else of the first window of that app.
fn pick_candidate(live: &[WindowDescriptor], target: &WindowDescriptor) -> Option<usize> {
    let mut candidates = live
        .iter()
        .enumerate()
        .filter(|(_, w)| w.app_name == target.app_name);
    let (first, window) = candidates.next()?;
    if window.window_title == target.window_title {
        return Some(first);
    }
    candidates
        .find(|(_, w)| w.window_title == target.window_title)
        .map(|(index, _)| index)
        .or(Some(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn window(app: &str, title: &str) -> WindowDescriptor {
        WindowDescriptor::new(app, title, Rect::new(0, 0, 100, 100))
    }

    #[test]
    fn exact_title_wins_over_order() {
        let live = [window("Safari", "News"), window("Mail", "Inbox"), window("Safari", "Docs")];
        assert_eq!(pick_candidate(&live, &window("Safari", "Docs")), Some(2));
    }

    #[test]
    fn falls_back_to_first_window_of_app() {
        let live = [window("Mail", "Inbox"), window("Safari", "News"), window("Safari", "Docs")];
        assert_eq!(pick_candidate(&live, &window("Safari", "Gone")), Some(1));
    }

    #[test]
    fn no_candidate_for_absent_app() {
        let live = [window("Mail", "Inbox")];
        assert_eq!(pick_candidate(&live, &window("Safari", "")), None);
    }
}
