#![forbid(unsafe_code)]

//! System Events automation through `osascript`, plus the `open` launcher.
//!
//! Script construction and output parsing are plain string work and build
//! on every platform; only running them needs macOS.

use layout::ControlError;
use layout::control::LaunchStrategy;
use layout::domain::{Rect, RunningApp};
use std::process::{Command, Output};
use tracing::trace;

/// Lists every process known to System Events, one per line:
/// name, bundle id, pid, visible, background only, frontmost (tab separated).
pub const PROCESS_TABLE: &str = r#"
set output to ""
tell application "System Events"
    repeat with p in (every process)
        set bid to bundle identifier of p
        if bid is missing value then set bid to ""
        set output to output & (name of p) & tab & bid & tab & ((unix id of p) as text) & tab & ((visible of p) as text) & tab & ((background only of p) as text) & tab & ((frontmost of p) as text) & linefeed
    end repeat
end tell
return output
"#;

/// AppleScript string literal for `value`.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' | '\r' => quoted.push(' '),
            ch => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

fn process(pid: u32) -> String {
    format!("(first process whose unix id is {pid})")
}

fn window(title: Option<&str>) -> String {
    match title {
        Some(title) => format!("(first window whose name is {})", quote(title)),
        None => "window 1".to_owned(),
    }
}

pub fn activate(pid: u32) -> String {
    format!(
        "tell application \"System Events\" to set frontmost of {} to true",
        process(pid)
    )
}

pub fn set_visible(pid: u32, visible: bool) -> String {
    format!(
        "tell application \"System Events\" to set visible of {} to {visible}",
        process(pid)
    )
}

pub fn move_resize(pid: u32, bounds: Rect, title: Option<&str>) -> String {
    format!(
        "tell application \"System Events\"\n\
         \ttell {}\n\
         \t\tset target to {}\n\
         \t\tset position of target to {{{}, {}}}\n\
         \t\tset size of target to {{{}, {}}}\n\
         \tend tell\n\
         end tell",
        process(pid),
        window(title),
        bounds.x,
        bounds.y,
        bounds.width,
        bounds.height,
    )
}

pub fn unminimize(pid: u32, title: Option<&str>) -> String {
    format!(
        "tell application \"System Events\"\n\
         \ttell {}\n\
         \t\tset value of attribute \"AXMinimized\" of {} to false\n\
         \tend tell\n\
         end tell",
        process(pid),
        window(title),
    )
}

/// The `osascript` source or `open` arguments for one launch strategy.
pub enum Launch {
    Script(String),
    Open(Vec<String>),
}

pub fn launch(strategy: &LaunchStrategy) -> Launch {
    match strategy {
        LaunchStrategy::BundleId(id) => {
            Launch::Script(format!("tell application id {} to activate", quote(id)))
        }
        LaunchStrategy::OpenBundleId(id) => Launch::Open(vec!["-b".into(), id.clone()]),
        LaunchStrategy::Name(name) => {
            Launch::Script(format!("tell application {} to activate", quote(name)))
        }
        LaunchStrategy::OpenName(name) => Launch::Open(vec!["-a".into(), name.clone()]),
    }
}

/// Parses [`PROCESS_TABLE`] output. Malformed lines are skipped.
pub fn parse_process_table(output: &str) -> Vec<RunningApp> {
    output.lines().filter_map(parse_process_line).collect()
}

fn parse_process_line(line: &str) -> Option<RunningApp> {
    let mut fields = line.split('\t');
    let name = fields.next()?.trim();
    let bundle_id = fields.next()?.trim();
    let pid = fields.next()?.trim().parse().ok()?;
    let visible = parse_bool(fields.next()?)?;
    let background_only = parse_bool(fields.next()?)?;
    let frontmost = parse_bool(fields.next()?)?;

    if name.is_empty() {
        return None;
    }
    Some(RunningApp {
        name: name.to_owned(),
        bundle_id: (!bundle_id.is_empty() && bundle_id != "missing value")
            .then(|| bundle_id.to_owned()),
        pid,
        is_hidden: !visible,
        is_regular: !background_only,
        is_active: frontmost,
    })
}

fn parse_bool(field: &str) -> Option<bool> {
    match field.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Runs `source` through `osascript` and returns its standard output.
pub fn run(source: &str) -> Result<String, ControlError> {
    trace!(source, "running osascript");
    let output = Command::new("osascript").arg("-e").arg(source).output()?;
    checked(output).map(|stdout| stdout.trim_end().to_owned())
}

/// Runs `open` with `args`.
pub fn open(args: &[String]) -> Result<(), ControlError> {
    trace!(?args, "running open");
    let output = Command::new("open").args(args).output()?;
    checked(output).map(drop)
}

fn checked(output: Output) -> Result<String, ControlError> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(ControlError::Script {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}
