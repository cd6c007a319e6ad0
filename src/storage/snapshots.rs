use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::OrtError;
use crate::storage;

/// The two snapshot address spaces: `ref` names are git commit hashes,
/// `named` names are arbitrary user labels. Same name, different namespace,
/// different file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Namespace {
    Ref,
    Named,
}

impl Namespace {
    pub fn dir_name(self) -> &'static str {
        match self {
            Namespace::Ref => "ref_snapshots",
            Namespace::Named => "named_snapshots",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Namespace::Ref => "ref",
            Namespace::Named => "named",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotId {
    pub namespace: Namespace,
    pub name: String,
}

impl SnapshotId {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            namespace: Namespace::Named,
            name: name.into(),
        }
    }

    pub fn for_ref(name: impl Into<String>) -> Self {
        Self {
            namespace: Namespace::Ref,
            name: name.into(),
        }
    }

    /// Pure path composition; the same (root, namespace, name) always
    /// resolves to the same file, and no I/O happens here.
    pub fn path_under(&self, root: &Path) -> PathBuf {
        storage::ort_dir(root)
            .join(self.namespace.dir_name())
            .join(sanitize(&self.name))
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace {
            Namespace::Ref => write!(f, "for ref '{}'", self.name),
            Namespace::Named => write!(f, "named '{}'", self.name),
        }
    }
}

// Keeps user-supplied names from escaping the namespace directory.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn exists(path: &Path) -> bool {
    path.is_file()
}

/// Sibling staging path for an in-progress dump.
pub fn stage_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}

/// Move a completed stage file into place. The rename stays within one
/// directory, so a concurrent reader sees either the old dump or the new
/// one, never a partial write.
pub fn commit(stage: &Path, dest: &Path) -> Result<(), OrtError> {
    fs::rename(stage, dest)?;
    Ok(())
}

pub fn write(dest: &Path, bytes: &[u8]) -> Result<(), OrtError> {
    let stage = stage_path(dest);
    fs::write(&stage, bytes)?;
    commit(&stage, dest)
}

/// Open a snapshot for restoring. An identifier that has never been
/// snapshotted is reported to the user, not a crash, and the caller must not
/// go on to run the restore command.
pub fn read_for_restore(id: &SnapshotId, path: &Path) -> Result<File, OrtError> {
    if !exists(path) {
        return Err(OrtError::NotFound { id: id.to_string() });
    }
    Ok(File::open(path)?)
}
