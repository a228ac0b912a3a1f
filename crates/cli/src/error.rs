use crate::signals::SignalEvent;
use flume::SendError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to install signal handler: {0}")]
    SignalHandler(#[source] io::Error),

    #[error("Failed to send signal event: {0}")]
    SendSignal(#[from] SendError<SignalEvent>),

    #[error("No snapshot named {0:?}")]
    SnapshotNotFound(String),

    #[error("Snapshot {snapshot:?} has no window of {app:?}")]
    WindowNotFound { snapshot: String, app: String },

    #[error("Config file already exists: {0:?} (use --force to overwrite)")]
    ConfigExists(PathBuf),

    #[error(transparent)]
    Config(#[from] config::Error),

    #[error(transparent)]
    Store(#[from] layout::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Restore worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
