#![forbid(unsafe_code)]

/// Errors from the snapshot store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot name must not be empty")]
    EmptyName,
}

/// Failure to query windows or displays. Never escapes the enumerators;
/// they degrade to an empty or fallback result instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnumerationError {
    #[error("window or display enumeration is not supported on this platform")]
    Unsupported,

    #[error("permission to read window information was not granted")]
    PermissionDenied,

    #[error("os query failed: {0}")]
    Os(String),
}

/// Failure of an activation, visibility, launch or geometry request.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("app control is not supported on this platform")]
    Unsupported,

    #[error("no process with pid {0}")]
    ProcessNotFound(u32),

    #[error("process {pid} has no matching window")]
    NoWindow { pid: u32 },

    #[error("automation script failed (status {status:?}): {stderr}")]
    Script { status: Option<i32>, stderr: String },

    #[error("failed to spawn command: {0}")]
    Io(#[from] std::io::Error),
}
