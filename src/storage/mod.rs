use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ort::OrtConfig;
use crate::error::OrtError;
use crate::storage::snapshots::Namespace;

pub mod snapshots;

pub const ORT_DIR: &str = ".ort";

pub fn ort_dir(root: &Path) -> PathBuf {
    root.join(ORT_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    ort_dir(root).join("config")
}

pub fn hooks_dir(root: &Path) -> PathBuf {
    root.join(".git").join("hooks")
}

/// Create the `.ort` folder and both snapshot namespaces. Refuses outside a
/// git project root and refuses to touch an existing `.ort`.
pub fn init_at(root: &Path) -> Result<(), OrtError> {
    if !root.join(".git").is_dir() {
        return Err(OrtError::NotAGitProject);
    }
    if ort_dir(root).exists() {
        return Err(OrtError::AlreadyInitialized);
    }
    for namespace in [Namespace::Ref, Namespace::Named] {
        fs::create_dir_all(ort_dir(root).join(namespace.dir_name()))?;
    }
    Ok(())
}

/// Walk upward from the current directory until a directory containing
/// `.ort` is found.
pub fn find_root() -> Result<PathBuf, OrtError> {
    let mut dir = std::env::current_dir()?;
    loop {
        if dir.join(ORT_DIR).is_dir() {
            return Ok(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    Err(OrtError::NoProjectFound)
}

pub fn load_config(root: &Path) -> Result<OrtConfig, OrtError> {
    let content = fs::read_to_string(config_path(root))?;
    let config: OrtConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_config(root: &Path, config: &OrtConfig) -> Result<(), OrtError> {
    let path = config_path(root);
    let content = serde_json::to_string_pretty(config)?;
    // Write atomically: write to temp file then rename
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

/// Delete the whole `.ort` tree, snapshots included.
pub fn remove(root: &Path) -> Result<(), OrtError> {
    fs::remove_dir_all(ort_dir(root))?;
    Ok(())
}
