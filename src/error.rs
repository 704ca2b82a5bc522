use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors while loading the session snapshot.
/// Lookup failures are never errors; they resolve to "Unknown …" strings.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session file not found: {}", .0.display())]
    MissingInputFile(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("No session records under \"{0}\"")]
    NoSessions(String),
}

impl SessionError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionError::MissingInputFile(_)
            | SessionError::Read { .. }
            | SessionError::Malformed(_)
            | SessionError::NoSessions(_) => 1,
        }
    }
}
