use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrtError {
    #[error("you must initialize ort in the root folder of a git project")]
    NotAGitProject,

    #[error(
        "ort is already initialized; run `ort reset` to start over, or remove the .ort folder if a previous init ended in an error"
    )]
    AlreadyInitialized,

    #[error("ort hooks are already installed for: {}; run `ort reset` to reinstall", .slots.join(", "))]
    AlreadyInstalled { slots: Vec<String> },

    #[error("could not find snapshot {id}")]
    NotFound { id: String },

    #[error("snapshot {id} failed: {reason}")]
    SnapshotFailed { id: String, reason: String },

    #[error("restore of snapshot {id} failed: {reason}")]
    RestoreFailed { id: String, reason: String },

    #[error("no ort project found in this directory or any of its parents")]
    NoProjectFound,

    #[error("configuration field {field} must not be empty")]
    InvalidConfig { field: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
