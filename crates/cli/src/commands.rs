use crate::cli::{Cli, Command, ConfigCommand};
use crate::error::Error;
use crate::signals::{SignalEvent, wait_for_signal};
use chrono::{DateTime, Local};
use config::Config;
use flume::Receiver;
use layout::domain::{DisplayDescriptor, RunningApp, Snapshot, WindowDescriptor};
use layout::persistence::{SnapshotStore, SqliteSnapshotStore};
use layout::{RestorationReport, RestoreEngine, RestoreEvent};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Exit status of a restore that left some windows unrestored.
pub const PARTIAL_FAILURE: u8 = 2;

/// Run one subcommand. Results go to `out`, progress and hints to `err`.
pub async fn run(
    cli: Cli,
    config: Config,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<ExitCode, Error> {
    let database = cli
        .database
        .clone()
        .unwrap_or_else(|| config.persistence.database_path());

    match cli.command {
        Command::Displays => {
            let engine = native_engine(config, Box::new(layout::NoopSink));
            print_displays(out, &engine.displays())?;
        }
        Command::Windows { app } => {
            let engine = native_engine(config, Box::new(layout::NoopSink));
            warn_without_permission(&engine, err)?;
            print_windows(out, &engine.windows(app.as_deref()))?;
        }
        Command::Apps => {
            let engine = native_engine(config, Box::new(layout::NoopSink));
            print_apps(out, &engine.running_apps())?;
        }
        Command::Permissions { open } => {
            let missing = platform::missing_permissions();
            if missing.is_empty() {
                writeln!(out, "All permissions granted.")?;
            } else {
                let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
                writeln!(out, "Missing permissions: {}", names.join(", "))?;
                writeln!(out)?;
                writeln!(out, "{}", platform::PERMISSION_INSTRUCTIONS)?;
            }
            if open {
                if let Err(error) = platform::open_privacy_settings() {
                    warn!(%error, "failed to open privacy settings");
                    writeln!(err, "Could not open System Settings: {error}")?;
                }
            }
        }
        Command::Capture { name, description } => {
            let engine = native_engine(config, Box::new(layout::NoopSink));
            warn_without_permission(&engine, err)?;
            let store = SqliteSnapshotStore::new(database).await?;
            capture(&engine, &store, &name, &description, out).await?;
        }
        Command::List => {
            let store = SqliteSnapshotStore::new(database).await?;
            print_snapshots(out, &store.list().await?)?;
        }
        Command::Show { name, json } => {
            let store = SqliteSnapshotStore::new(database).await?;
            let snapshot = load(&store, &name).await?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &snapshot)?;
                writeln!(out)?;
            } else {
                print_snapshot(out, &snapshot)?;
            }
        }
        Command::Restore {
            name,
            json,
            keep_others,
        } => {
            let store = SqliteSnapshotStore::new(database).await?;
            let snapshot = load(&store, &name).await?;
            return restore(config, snapshot, json, keep_others, out, err).await;
        }
        Command::Delete { name } => {
            let store = SqliteSnapshotStore::new(database).await?;
            delete(&store, &name, out).await?;
        }
        Command::RemoveWindow { name, app, title } => {
            let store = SqliteSnapshotStore::new(database).await?;
            remove_window(&store, &name, &app, title.as_deref(), out).await?;
        }
        Command::Config(ConfigCommand::Init { path, force }) => {
            let path = path.unwrap_or_else(config::default_config_path);
            config_init(&path, force, out)?;
        }
        Command::Config(ConfigCommand::Show) => {
            write!(out, "{}", config.to_toml()?)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn native_engine(config: Config, events: Box<dyn layout::EventSink>) -> RestoreEngine {
    RestoreEngine::new(config, platform::native_services(events))
}

fn warn_without_permission(engine: &RestoreEngine, err: &mut dyn Write) -> Result<(), Error> {
    if !engine.permission_granted() {
        warn!("window information is not readable");
        writeln!(
            err,
            "Window information is not available; run `spacewarp permissions` for help."
        )?;
    }
    Ok(())
}

async fn load(store: &dyn SnapshotStore, name: &str) -> Result<Snapshot, Error> {
    store
        .get(name)
        .await?
        .ok_or_else(|| Error::SnapshotNotFound(name.to_owned()))
}

pub async fn capture(
    engine: &RestoreEngine,
    store: &dyn SnapshotStore,
    name: &str,
    description: &str,
    out: &mut dyn Write,
) -> Result<Snapshot, Error> {
    let mut snapshot = engine.capture(name, description);
    let id = store.save(&snapshot).await?;
    snapshot.id = Some(id);
    info!(snapshot = name, id, "snapshot saved");
    writeln!(
        out,
        "Saved {name:?}: {} windows on {} displays",
        snapshot.windows.len(),
        snapshot.displays.len()
    )?;
    Ok(snapshot)
}

async fn restore(
    mut config: Config,
    snapshot: Snapshot,
    json: bool,
    keep_others: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<ExitCode, Error> {
    if keep_others {
        config.restore.hide_others = false;
    }

    let (events_tx, events_rx) = flume::unbounded();
    let engine = native_engine(config, Box::new(events_tx));
    let cancel = CancellationToken::new();

    let (signal_tx, signal_rx) = flume::bounded(8);
    let listener = tokio::spawn(async move { wait_for_signal(&signal_tx).await });
    let canceller = tokio::spawn(cancel_on_signal(signal_rx, cancel.clone()));

    let result = drive_restore(engine, snapshot, events_rx, cancel, !json, err).await;
    listener.abort();
    canceller.abort();

    let report = result?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        print_report(out, &report)?;
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(PARTIAL_FAILURE)
    })
}

async fn cancel_on_signal(signals: Receiver<SignalEvent>, cancel: CancellationToken) {
    if let Ok(event) = signals.recv_async().await {
        warn!(?event, "cancelling restore");
        cancel.cancel();
    }
}

/// Runs the blocking restore on the blocking pool while rendering its
/// progress events. The event channel closes when the engine is dropped.
pub async fn drive_restore(
    engine: RestoreEngine,
    snapshot: Snapshot,
    events: Receiver<RestoreEvent>,
    cancel: CancellationToken,
    show_progress: bool,
    err: &mut dyn Write,
) -> Result<RestorationReport, Error> {
    let worker_cancel = cancel.clone();
    let worker = tokio::task::spawn_blocking(move || engine.restore(&snapshot, &worker_cancel));

    while let Ok(event) = events.recv_async().await {
        debug!(%event, "restore progress");
        if show_progress && let Err(error) = writeln!(err, "{event}") {
            cancel.cancel();
            return Err(error.into());
        }
    }

    Ok(worker.await?)
}

pub async fn delete(store: &dyn SnapshotStore, name: &str, out: &mut dyn Write) -> Result<(), Error> {
    if !store.delete(name).await? {
        return Err(Error::SnapshotNotFound(name.to_owned()));
    }
    writeln!(out, "Deleted {name:?}")?;
    Ok(())
}

pub async fn remove_window(
    store: &dyn SnapshotStore,
    name: &str,
    app: &str,
    title: Option<&str>,
    out: &mut dyn Write,
) -> Result<(), Error> {
    if store.get(name).await?.is_none() {
        return Err(Error::SnapshotNotFound(name.to_owned()));
    }
    if !store.remove_window(name, app, title).await? {
        return Err(Error::WindowNotFound {
            snapshot: name.to_owned(),
            app: app.to_owned(),
        });
    }
    writeln!(out, "Removed a {app} window from {name:?}")?;
    Ok(())
}

pub fn config_init(path: &Path, force: bool, out: &mut dyn Write) -> Result<PathBuf, Error> {
    if path.exists() && !force {
        return Err(Error::ConfigExists(path.to_owned()));
    }
    Config::default().write(path)?;
    writeln!(out, "Wrote default configuration to {}", path.display())?;
    Ok(path.to_owned())
}

fn title_or_placeholder(title: &str) -> &str {
    if title.is_empty() { "-" } else { title }
}

pub fn print_displays(out: &mut dyn Write, displays: &[DisplayDescriptor]) -> Result<(), Error> {
    writeln!(out, "{:<12} {:<20} {:>11} {:>13}  MAIN", "ID", "NAME", "ORIGIN", "SIZE")?;
    for display in displays {
        writeln!(
            out,
            "{:<12} {:<20} {:>11} {:>13}  {}",
            display.display_id,
            display.name,
            format!("{},{}", display.x, display.y),
            format!("{}x{}", display.width, display.height),
            if display.is_main { "yes" } else { "" }
        )?;
    }
    Ok(())
}

pub fn print_windows(out: &mut dyn Write, windows: &[WindowDescriptor]) -> Result<(), Error> {
    writeln!(
        out,
        "{:<24} {:<32} {:>11} {:>11} {:>10}",
        "APP", "TITLE", "ORIGIN", "SIZE", "DISPLAY"
    )?;
    for window in windows {
        writeln!(
            out,
            "{:<24} {:<32} {:>11} {:>11} {:>10}{}",
            window.app_name,
            title_or_placeholder(&window.window_title),
            format!("{},{}", window.bounds.x, window.bounds.y),
            format!("{}x{}", window.bounds.width, window.bounds.height),
            window.display_id,
            if window.is_minimized { "  (minimized)" } else { "" }
        )?;
    }
    Ok(())
}

pub fn print_apps(out: &mut dyn Write, apps: &[RunningApp]) -> Result<(), Error> {
    writeln!(out, "{:>7}  {:<28} {:<40} STATE", "PID", "NAME", "BUNDLE ID")?;
    for app in apps.iter().filter(|app| app.is_regular) {
        let state = match (app.is_active, app.is_hidden) {
            (true, _) => "active",
            (false, true) => "hidden",
            (false, false) => "",
        };
        writeln!(
            out,
            "{:>7}  {:<28} {:<40} {state}",
            app.pid,
            app.name,
            app.bundle_id.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

pub fn print_snapshots(out: &mut dyn Write, snapshots: &[Snapshot]) -> Result<(), Error> {
    if snapshots.is_empty() {
        writeln!(out, "No snapshots saved.")?;
        return Ok(());
    }
    writeln!(out, "{:<24} {:<16} {:>7}  DESCRIPTION", "NAME", "CREATED", "WINDOWS")?;
    for snapshot in snapshots {
        let created: DateTime<Local> = snapshot.created_at.into();
        writeln!(
            out,
            "{:<24} {:<16} {:>7}  {}",
            snapshot.name,
            created.format("%Y-%m-%d %H:%M"),
            snapshot.windows.len(),
            snapshot.description
        )?;
    }
    Ok(())
}

pub fn print_snapshot(out: &mut dyn Write, snapshot: &Snapshot) -> Result<(), Error> {
    let created: DateTime<Local> = snapshot.created_at.into();
    writeln!(out, "Snapshot {:?}", snapshot.name)?;
    if !snapshot.description.is_empty() {
        writeln!(out, "  {}", snapshot.description)?;
    }
    writeln!(out, "  created {}", created.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out)?;
    print_displays(out, &snapshot.displays)?;
    writeln!(out)?;
    print_windows(out, &snapshot.windows)
}

pub fn print_report(out: &mut dyn Write, report: &RestorationReport) -> Result<(), Error> {
    writeln!(
        out,
        "Restored {}/{} windows of {:?}",
        report.restored_count, report.total, report.snapshot_name
    )?;
    for item in report.items.iter().filter(|item| !item.restored) {
        let reason = item
            .reason
            .map(|reason| reason.to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "  failed: {} {:?} ({reason}{})",
            item.app_name,
            item.window_title,
            if item.launched { ", launched" } else { "" }
        )?;
    }
    Ok(())
}
