#![forbid(unsafe_code)]

use crate::domain::{RunningApp, Snapshot, WindowDescriptor};
use crate::error::ControlError;
use crate::events::{EventSink, RestoreEvent};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Process-level operations on running applications.
pub trait AppBackend: Send + Sync {
    fn running_apps(&self) -> Result<Vec<RunningApp>, ControlError>;
    fn process_exists(&self, pid: u32) -> bool;
    fn activate(&self, pid: u32) -> Result<(), ControlError>;
    fn set_hidden(&self, pid: u32, hidden: bool) -> Result<(), ControlError>;
    /// Issues one launch attempt. `Ok` means the OS accepted the request,
    /// not that a window exists yet.
    fn launch(&self, strategy: &LaunchStrategy) -> Result<(), ControlError>;
}

/// One way of asking the OS to start an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchStrategy {
    /// Launch through the automation interface by bundle identifier.
    BundleId(String),
    /// `open -b <id>`
    OpenBundleId(String),
    /// Launch through the automation interface by display name.
    Name(String),
    /// `open -a <name>`
    OpenName(String),
}

impl LaunchStrategy {
    /// Strategies in the order they are tried. Identity-based strategies
    /// come first and are skipped when no identity is known.
    pub fn cascade(bundle_id: Option<&str>, name: &str) -> Vec<Self> {
        let mut strategies = Vec::with_capacity(4);
        if let Some(id) = bundle_id.filter(|id| !id.is_empty()) {
            strategies.push(Self::BundleId(id.to_owned()));
            strategies.push(Self::OpenBundleId(id.to_owned()));
        }
        if !name.is_empty() {
            strategies.push(Self::Name(name.to_owned()));
            strategies.push(Self::OpenName(name.to_owned()));
        }
        strategies
    }

    pub fn describe(&self) -> String {
        match self {
            Self::BundleId(id) => format!("application id \"{id}\""),
            Self::OpenBundleId(id) => format!("open -b {id}"),
            Self::Name(name) => format!("application \"{name}\""),
            Self::OpenName(name) => format!("open -a {name}"),
        }
    }
}

impl fmt::Display for LaunchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub success: bool,
    pub launched_with: Option<LaunchStrategy>,
    pub detail: String,
}

/// Apps that must stay visible: matched by name or by bundle identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSet {
    names: HashSet<String>,
    identities: HashSet<String>,
}

impl AppSet {
    pub fn insert(&mut self, name: &str, bundle_id: Option<&str>) {
        if !name.is_empty() {
            self.names.insert(name.to_owned());
        }
        if let Some(id) = bundle_id.filter(|id| !id.is_empty()) {
            self.identities.insert(id.to_owned());
        }
    }

    pub fn contains(&self, app: &RunningApp) -> bool {
        self.names.contains(&app.name)
            || app
                .bundle_id
                .as_ref()
                .is_some_and(|id| self.identities.contains(id))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.identities.is_empty()
    }
}

impl<'a> FromIterator<&'a WindowDescriptor> for AppSet {
    fn from_iter<I: IntoIterator<Item = &'a WindowDescriptor>>(iter: I) -> Self {
        let mut set = Self::default();
        for window in iter {
            set.insert(&window.app_name, window.bundle_id.as_deref());
        }
        set
    }
}

impl From<&Snapshot> for AppSet {
    fn from(snapshot: &Snapshot) -> Self {
        snapshot.windows.iter().collect()
    }
}

/// Activation, visibility and launch, with failures logged and absorbed.
#[derive(Clone, Copy)]
pub struct AppControl<'a> {
    backend: &'a dyn AppBackend,
    events: &'a dyn EventSink,
}

impl<'a> AppControl<'a> {
    pub fn new(backend: &'a dyn AppBackend, events: &'a dyn EventSink) -> Self {
        Self { backend, events }
    }

    pub fn activate(&self, pid: u32) {
        if !self.backend.process_exists(pid) {
            debug!(pid, "process gone, not activating");
            return;
        }
        if let Err(err) = self.backend.activate(pid) {
            warn!(pid, %err, "failed to activate process");
        }
    }

    pub fn hide(&self, pid: u32) -> bool {
        self.set_hidden(pid, true)
    }

    pub fn unhide(&self, pid: u32) -> bool {
        self.set_hidden(pid, false)
    }

    fn set_hidden(&self, pid: u32, hidden: bool) -> bool {
        let apps = match self.backend.running_apps() {
            Ok(apps) => apps,
            Err(err) => {
                warn!(pid, %err, "failed to list running apps");
                return false;
            }
        };
        let Some(app) = apps.iter().find(|app| app.pid == pid) else {
            debug!(pid, "no running app with this pid");
            return false;
        };
        if !app.is_regular || app.is_hidden == hidden {
            return false;
        }
        self.request_hidden(app, hidden)
    }

    fn request_hidden(&self, app: &RunningApp, hidden: bool) -> bool {
        match self.backend.set_hidden(app.pid, hidden) {
            Ok(()) => true,
            Err(err) => {
                warn!(app = %app.name, pid = app.pid, hidden, %err, "failed to change visibility");
                false
            }
        }
    }

    /// Hides every visible regular app not in `keep`. Returns the names of
    /// the apps hidden.
    pub fn hide_all_except(&self, keep: &AppSet) -> Vec<String> {
        let apps = match self.backend.running_apps() {
            Ok(apps) => apps,
            Err(err) => {
                warn!(%err, "failed to list running apps, hiding nothing");
                return Vec::new();
            }
        };

        let hidden: Vec<String> = apps
            .iter()
            .filter(|app| app.is_regular && !app.is_hidden && !keep.contains(app))
            .filter(|app| self.request_hidden(app, true))
            .map(|app| app.name.clone())
            .collect();
        info!(count = hidden.len(), "hid apps outside the snapshot");
        hidden
    }

    /// Tries each [`LaunchStrategy`] in cascade order until one is accepted.
    pub fn launch_by_identity(&self, bundle_id: Option<&str>, name: &str) -> LaunchOutcome {
        let mut last_error = String::from("no launch strategy available");

        for strategy in LaunchStrategy::cascade(bundle_id, name) {
            self.events.emit(RestoreEvent::LaunchAttempt {
                app_name: name.to_owned(),
                command: strategy.describe(),
            });

            match self.backend.launch(&strategy) {
                Ok(()) => {
                    let detail = format!("launched via {strategy}");
                    self.events.emit(RestoreEvent::LaunchResult {
                        app_name: name.to_owned(),
                        success: true,
                        detail: detail.clone(),
                    });
                    info!(app = name, %strategy, "launch accepted");
                    return LaunchOutcome {
                        success: true,
                        launched_with: Some(strategy),
                        detail,
                    };
                }
                Err(err) => {
                    debug!(app = name, %strategy, %err, "launch attempt failed");
                    last_error = format!("{strategy}: {err}");
                    self.events.emit(RestoreEvent::LaunchResult {
                        app_name: name.to_owned(),
                        success: false,
                        detail: last_error.clone(),
                    });
                }
            }
        }

        warn!(app = name, error = %last_error, "every launch strategy failed");
        LaunchOutcome {
            success: false,
            launched_with: None,
            detail: last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rect;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Recorder {
        apps: Vec<RunningApp>,
        apps_fail: bool,
        accept: Option<LaunchStrategy>,
        activated: Mutex<Vec<u32>>,
        hidden: Mutex<Vec<(u32, bool)>>,
        launches: Mutex<Vec<LaunchStrategy>>,
        events: Mutex<Vec<RestoreEvent>>,
    }

    impl AppBackend for Recorder {
        fn running_apps(&self) -> Result<Vec<RunningApp>, ControlError> {
            if self.apps_fail {
                return Err(ControlError::Unsupported);
            }
            Ok(self.apps.clone())
        }

        fn process_exists(&self, pid: u32) -> bool {
            self.apps.iter().any(|app| app.pid == pid)
        }

        fn activate(&self, pid: u32) -> Result<(), ControlError> {
            self.activated.lock().push(pid);
            Ok(())
        }

        fn set_hidden(&self, pid: u32, hidden: bool) -> Result<(), ControlError> {
            self.hidden.lock().push((pid, hidden));
            Ok(())
        }

        fn launch(&self, strategy: &LaunchStrategy) -> Result<(), ControlError> {
            self.launches.lock().push(strategy.clone());
            if self.accept.as_ref() == Some(strategy) {
                Ok(())
            } else {
                Err(ControlError::Script {
                    status: Some(1),
                    stderr: "Unable to find application".into(),
                })
            }
        }
    }

    impl EventSink for Recorder {
        fn emit(&self, event: RestoreEvent) {
            self.events.lock().push(event);
        }
    }

    fn app(name: &str, bundle_id: Option<&str>, pid: u32) -> RunningApp {
        RunningApp {
            name: name.into(),
            bundle_id: bundle_id.map(String::from),
            pid,
            is_hidden: false,
            is_regular: true,
            is_active: false,
        }
    }

    #[test]
    fn cascade_order() {
        assert_eq!(
            LaunchStrategy::cascade(Some("com.apple.Safari"), "Safari"),
            vec![
                LaunchStrategy::BundleId("com.apple.Safari".into()),
                LaunchStrategy::OpenBundleId("com.apple.Safari".into()),
                LaunchStrategy::Name("Safari".into()),
                LaunchStrategy::OpenName("Safari".into()),
            ]
        );
        assert_eq!(
            LaunchStrategy::cascade(Some(""), "Safari"),
            vec![
                LaunchStrategy::Name("Safari".into()),
                LaunchStrategy::OpenName("Safari".into()),
            ]
        );
        assert!(LaunchStrategy::cascade(None, "").is_empty());
    }

    #[test]
    fn launch_stops_at_first_success() {
        let backend = Recorder {
            accept: Some(LaunchStrategy::Name("Notes".into())),
            ..Default::default()
        };
        let outcome = AppControl::new(&backend, &backend).launch_by_identity(Some("com.apple.Notes"), "Notes");

        assert!(outcome.success);
        assert_eq!(outcome.launched_with, Some(LaunchStrategy::Name("Notes".into())));
        assert_eq!(backend.launches.lock().len(), 3);

        let events = backend.events.lock();
        assert_eq!(events.len(), 6);
        assert!(matches!(&events[0], RestoreEvent::LaunchAttempt { command, .. } if command.contains("com.apple.Notes")));
        assert!(matches!(&events[1], RestoreEvent::LaunchResult { success: false, .. }));
        assert!(matches!(&events[5], RestoreEvent::LaunchResult { success: true, .. }));
    }

    #[test]
    fn launch_failure_reports_last_error() {
        let backend = Recorder::default();
        let outcome = AppControl::new(&backend, &backend).launch_by_identity(None, "Ghost");

        assert!(!outcome.success);
        assert_eq!(outcome.launched_with, None);
        assert!(outcome.detail.starts_with("open -a Ghost"));
        assert_eq!(backend.events.lock().len(), 4);
    }

    #[test]
    fn hide_skips_apps_in_requested_state() {
        let mut hidden = app("Mail", None, 7);
        hidden.is_hidden = true;
        let mut agent = app("Helper", None, 8);
        agent.is_regular = false;
        let backend = Recorder {
            apps: vec![hidden, agent, app("Notes", None, 9)],
            ..Default::default()
        };
        let control = AppControl::new(&backend, &backend);

        assert!(!control.hide(7));
        assert!(control.unhide(7));
        assert!(!control.hide(8));
        assert!(!control.unhide(9));
        assert!(control.hide(9));
        assert!(!control.hide(404));
        assert_eq!(*backend.hidden.lock(), vec![(7, false), (9, true)]);
    }

    #[test]
    fn activate_skips_vanished_process() {
        let backend = Recorder {
            apps: vec![app("Notes", None, 9)],
            ..Default::default()
        };
        let control = AppControl::new(&backend, &backend);

        control.activate(404);
        control.activate(9);
        assert_eq!(*backend.activated.lock(), vec![9]);
    }

    #[test]
    fn unreadable_app_list_changes_nothing() {
        let backend = Recorder {
            apps: vec![app("Notes", None, 9), app("Mail", None, 7)],
            apps_fail: true,
            ..Default::default()
        };
        let control = AppControl::new(&backend, &backend);

        assert!(!control.hide(9));
        assert!(!control.unhide(7));
        assert!(control.hide_all_except(&AppSet::default()).is_empty());
        assert!(backend.hidden.lock().is_empty());
    }

    #[test]
    fn snapshot_keeps_its_apps_even_without_titles() {
        let mut snapshot = Snapshot::new(
            "work",
            "",
            vec![
                WindowDescriptor::new("Safari", "", Rect::new(0, 0, 10, 10))
                    .with_bundle_id("com.apple.Safari"),
            ],
            Vec::new(),
        );
        snapshot.windows.push(WindowDescriptor::new("Terminal", "", Rect::default()));
        let keep = AppSet::from(&snapshot);

        assert!(keep.contains(&app("Safari", None, 1)));
        assert!(keep.contains(&app("Safari Technology Preview", Some("com.apple.Safari"), 2)));
        assert!(keep.contains(&app("Terminal", None, 3)));
        assert!(!keep.contains(&app("Mail", Some("com.apple.mail"), 4)));
        assert!(AppSet::default().is_empty());
    }

    fn apps_strategy() -> impl Strategy<Value = Vec<RunningApp>> {
        prop::collection::vec(
            (
                "[A-D]",
                prop::option::of("id\\.[a-d]"),
                any::<bool>(),
                any::<bool>(),
            ),
            0..12,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(pid, (name, bundle_id, is_hidden, is_regular))| RunningApp {
                    name,
                    bundle_id,
                    pid: pid as u32 + 1,
                    is_hidden,
                    is_regular,
                    is_active: false,
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn hide_all_except_never_hides_kept_apps(
            apps in apps_strategy(),
            keep_names in prop::collection::vec("[A-D]", 0..3),
            keep_ids in prop::collection::vec("id\\.[a-d]", 0..3),
        ) {
            let mut keep = AppSet::default();
            for name in &keep_names {
                keep.insert(name, None);
            }
            for id in &keep_ids {
                keep.insert("", Some(id.as_str()));
            }
            let backend = Recorder { apps: apps.clone(), ..Default::default() };
            let hidden = AppControl::new(&backend, &backend).hide_all_except(&keep);

            for (pid, state) in backend.hidden.lock().iter() {
                prop_assert!(*state);
                let app = apps.iter().find(|app| app.pid == *pid).unwrap();
                prop_assert!(!keep.contains(app));
                prop_assert!(app.is_regular && !app.is_hidden);
            }
            let expected = apps
                .iter()
                .filter(|app| app.is_regular && !app.is_hidden && !keep.contains(app))
                .count();
            prop_assert_eq!(hidden.len(), expected);
        }
    }
}
