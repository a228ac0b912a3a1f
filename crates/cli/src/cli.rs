use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::{Path, PathBuf};

/// SpaceWarp: save and restore macOS window layouts
///
/// Captures the position and size of every visible window into a named
/// snapshot, and later drives the desktop back to it: running apps are
/// focused and their windows moved, missing apps are launched first.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// Defaults to ~/.spacewarp/config.toml when it exists.
    #[arg(short, long, value_parser = validate_file)]
    pub config: Option<PathBuf>,

    /// Snapshot database, overriding the configured path.
    #[arg(long)]
    pub database: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone, PartialEq, Eq)]
pub enum Command {
    /// List connected displays.
    Displays,

    /// List visible windows.
    Windows {
        /// Only windows owned by this application.
        #[arg(short, long)]
        app: Option<String>,
    },

    /// List running applications.
    Apps,

    /// Show which privacy permissions are missing and how to grant them.
    Permissions {
        /// Open the Privacy & Security settings pane.
        #[arg(long)]
        open: bool,
    },

    /// Capture the current layout and save it under NAME.
    ///
    /// An existing snapshot with the same name is replaced.
    Capture {
        #[arg(value_parser = validate_name)]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List saved snapshots, newest first.
    List,

    /// Print a saved snapshot.
    Show {
        name: String,

        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Restore a saved snapshot.
    ///
    /// Exits with status 2 when some windows could not be restored.
    Restore {
        name: String,

        /// Print the restoration report as JSON.
        #[arg(long)]
        json: bool,

        /// Leave apps that are not part of the snapshot visible.
        #[arg(long)]
        keep_others: bool,
    },

    /// Delete a saved snapshot.
    Delete { name: String },

    /// Remove one window entry from a saved snapshot.
    RemoveWindow {
        name: String,

        app: String,

        /// Only remove the entry with exactly this window title.
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Manage the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Write the default configuration as TOML.
    Init {
        /// Destination, defaults to ~/.spacewarp/config.toml.
        path: Option<PathBuf>,

        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration.
    Show,
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}

/// Snapshot names must contain something besides whitespace.
#[inline(always)]
fn validate_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err("Snapshot name must not be empty".to_string())
    } else {
        Ok(trimmed.to_owned())
    }
}
