use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OrtError;

pub const MANAGED_EXT: &str = "ort";
pub const USERSCRIPT_EXT: &str = "userscript";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookSlot {
    PostCommit,
    PostMerge,
    PostCheckout,
}

impl HookSlot {
    pub const ALL: [HookSlot; 3] = [
        HookSlot::PostCommit,
        HookSlot::PostMerge,
        HookSlot::PostCheckout,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            HookSlot::PostCommit => "post-commit",
            HookSlot::PostMerge => "post-merge",
            HookSlot::PostCheckout => "post-checkout",
        }
    }

    /// Body of the managed script installed at `<slot>.ort`. post-commit
    /// and post-merge capture the schema under the new HEAD; post-checkout
    /// receives the refs it moved between as `$1`/`$2` plus a branch-change
    /// flag as `$3`, snapshots the ref being left and restores the one
    /// checked out.
    pub fn script_body(self) -> &'static str {
        match self {
            HookSlot::PostCommit | HookSlot::PostMerge => {
                "#!/bin/sh\nort snapshot --ref \"$(git rev-parse HEAD)\"\n"
            }
            HookSlot::PostCheckout => {
                "#!/bin/sh\n\
                 # $1 previous HEAD, $2 new HEAD, $3 = 1 for branch checkouts\n\
                 [ \"$3\" = \"1\" ] || exit 0\n\
                 ort snapshot --ref \"$1\"\n\
                 ort restore --ref \"$2\"\n"
            }
        }
    }
}

pub fn entry_path(hooks_dir: &Path, slot: HookSlot) -> PathBuf {
    hooks_dir.join(slot.file_name())
}

pub fn managed_path(hooks_dir: &Path, slot: HookSlot) -> PathBuf {
    hooks_dir.join(format!("{}.{}", slot.file_name(), MANAGED_EXT))
}

pub fn userscript_path(hooks_dir: &Path, slot: HookSlot) -> PathBuf {
    hooks_dir.join(format!("{}.{}", slot.file_name(), USERSCRIPT_EXT))
}

fn is_installed(hooks_dir: &Path, slot: HookSlot) -> bool {
    // A leftover userscript without a managed script means an interrupted
    // installation; report it the same way and leave cleanup to `ort reset`.
    managed_path(hooks_dir, slot).exists() || userscript_path(hooks_dir, slot).exists()
}

/// Refuse when any slot already carries a managed script.
pub fn check_not_installed(hooks_dir: &Path) -> Result<(), OrtError> {
    let installed: Vec<String> = HookSlot::ALL
        .into_iter()
        .filter(|slot| is_installed(hooks_dir, *slot))
        .map(|slot| slot.file_name().to_string())
        .collect();
    if installed.is_empty() {
        Ok(())
    } else {
        Err(OrtError::AlreadyInstalled { slots: installed })
    }
}

/// Install `body` into a hook slot, chaining around any pre-existing script.
///
/// A pre-existing hook moves aside to `<slot>.userscript` and the new
/// entrypoint runs it before the managed script, handing the hook's
/// positional arguments to both; if the userscript fails, the managed script
/// does not run. Installing twice fails instead of overwriting.
pub fn install(hooks_dir: &Path, slot: HookSlot, body: &str) -> Result<(), OrtError> {
    if is_installed(hooks_dir, slot) {
        return Err(OrtError::AlreadyInstalled {
            slots: vec![slot.file_name().to_string()],
        });
    }
    fs::create_dir_all(hooks_dir)?;

    let entry = entry_path(hooks_dir, slot);
    let had_user_hook = entry.exists();
    if had_user_hook {
        // Rename keeps the original bytes; the entrypoint calls the
        // userscript directly, so it must end up executable either way.
        let userscript = userscript_path(hooks_dir, slot);
        fs::rename(&entry, &userscript)?;
        make_executable(&userscript)?;
    }

    write_executable(&managed_path(hooks_dir, slot), body)?;
    write_executable(&entry, &entrypoint_script(slot, had_user_hook))?;
    Ok(())
}

/// Install every slot with its generated body. Scans all slots first so a
/// partial prior installation fails as a whole without touching any file.
pub fn install_all(hooks_dir: &Path) -> Result<(), OrtError> {
    check_not_installed(hooks_dir)?;
    for slot in HookSlot::ALL {
        install(hooks_dir, slot, slot.script_body())?;
    }
    Ok(())
}

/// Remove the managed scripts and entrypoints; a preserved userscript moves
/// back into the entrypoint position.
pub fn uninstall_all(hooks_dir: &Path) -> Result<(), OrtError> {
    for slot in HookSlot::ALL {
        let entry = entry_path(hooks_dir, slot);
        let managed = managed_path(hooks_dir, slot);
        let userscript = userscript_path(hooks_dir, slot);

        if managed.exists() {
            fs::remove_file(&managed)?;
            if entry.exists() {
                fs::remove_file(&entry)?;
            }
        }
        if userscript.exists() {
            fs::rename(&userscript, &entry)?;
        }
    }
    Ok(())
}

fn entrypoint_script(slot: HookSlot, chain_userscript: bool) -> String {
    let name = slot.file_name();
    if chain_userscript {
        format!(
            "#!/bin/sh\n\
             hook_dir=\"$(dirname \"$0\")\"\n\
             \"$hook_dir/{name}.{USERSCRIPT_EXT}\" \"$@\" && \"$hook_dir/{name}.{MANAGED_EXT}\" \"$@\"\n"
        )
    } else {
        format!("#!/bin/sh\n\"$(dirname \"$0\")/{name}.{MANAGED_EXT}\" \"$@\"\n")
    }
}

fn write_executable(path: &Path, content: &str) -> Result<(), OrtError> {
    fs::write(path, content)?;
    make_executable(path)?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::{TempDir, tempdir};

    fn hooks_dir() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let hooks = dir.path().join("hooks");
        fs::create_dir_all(&hooks).unwrap();
        (dir, hooks)
    }

    fn echo_body(word: &str) -> String {
        format!("#!/bin/sh\necho {word}\n")
    }

    #[cfg(unix)]
    fn assert_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0, "{} is not executable", path.display());
    }

    #[cfg(unix)]
    fn run_entrypoint(hooks: &Path, slot: HookSlot, args: &[&str]) -> std::process::Output {
        Command::new(entry_path(hooks, slot))
            .args(args)
            .output()
            .unwrap()
    }

    #[test]
    fn fresh_install_runs_only_the_managed_script() {
        let (_dir, hooks) = hooks_dir();
        install(&hooks, HookSlot::PostCommit, &echo_body("managed")).unwrap();

        let entry = fs::read_to_string(entry_path(&hooks, HookSlot::PostCommit)).unwrap();
        assert!(entry.contains("post-commit.ort"));
        assert!(!entry.contains("userscript"));
        assert!(!userscript_path(&hooks, HookSlot::PostCommit).exists());
    }

    #[test]
    fn existing_hook_is_preserved_verbatim_and_chained_first() {
        let (_dir, hooks) = hooks_dir();
        let original = "#!/bin/sh\necho hi\n";
        fs::write(entry_path(&hooks, HookSlot::PostCommit), original).unwrap();

        install(&hooks, HookSlot::PostCommit, &echo_body("managed")).unwrap();

        let preserved = fs::read(userscript_path(&hooks, HookSlot::PostCommit)).unwrap();
        assert_eq!(preserved, original.as_bytes());

        let entry = fs::read_to_string(entry_path(&hooks, HookSlot::PostCommit)).unwrap();
        let user_at = entry.find("post-commit.userscript").unwrap();
        let managed_at = entry.find("post-commit.ort").unwrap();
        assert!(user_at < managed_at);
        assert!(entry.contains("&&"));
    }

    #[test]
    fn reinstall_fails_and_leaves_all_files_untouched() {
        let (_dir, hooks) = hooks_dir();
        fs::write(entry_path(&hooks, HookSlot::PostCommit), "#!/bin/sh\necho hi\n").unwrap();
        install(&hooks, HookSlot::PostCommit, &echo_body("managed")).unwrap();

        let before: Vec<Vec<u8>> = [
            entry_path(&hooks, HookSlot::PostCommit),
            managed_path(&hooks, HookSlot::PostCommit),
            userscript_path(&hooks, HookSlot::PostCommit),
        ]
        .iter()
        .map(|p| fs::read(p).unwrap())
        .collect();

        let err = install(&hooks, HookSlot::PostCommit, &echo_body("other")).unwrap_err();
        match err {
            OrtError::AlreadyInstalled { slots } => assert_eq!(slots, vec!["post-commit"]),
            other => panic!("expected AlreadyInstalled, got {other}"),
        }

        let after: Vec<Vec<u8>> = [
            entry_path(&hooks, HookSlot::PostCommit),
            managed_path(&hooks, HookSlot::PostCommit),
            userscript_path(&hooks, HookSlot::PostCommit),
        ]
        .iter()
        .map(|p| fs::read(p).unwrap())
        .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn leftover_userscript_counts_as_installed() {
        let (_dir, hooks) = hooks_dir();
        fs::write(
            userscript_path(&hooks, HookSlot::PostMerge),
            "#!/bin/sh\necho hi\n",
        )
        .unwrap();

        let err = install(&hooks, HookSlot::PostMerge, &echo_body("managed")).unwrap_err();
        assert!(matches!(err, OrtError::AlreadyInstalled { .. }));
    }

    #[test]
    fn install_all_covers_every_slot() {
        let (_dir, hooks) = hooks_dir();
        install_all(&hooks).unwrap();
        for slot in HookSlot::ALL {
            assert!(entry_path(&hooks, slot).is_file());
            assert!(managed_path(&hooks, slot).is_file());
        }
    }

    #[test]
    fn install_all_names_every_affected_slot() {
        let (_dir, hooks) = hooks_dir();
        install_all(&hooks).unwrap();
        let err = install_all(&hooks).unwrap_err();
        match err {
            OrtError::AlreadyInstalled { slots } => {
                assert_eq!(slots, vec!["post-commit", "post-merge", "post-checkout"]);
            }
            other => panic!("expected AlreadyInstalled, got {other}"),
        }
    }

    #[test]
    fn uninstall_restores_the_preserved_userscript() {
        let (_dir, hooks) = hooks_dir();
        let original = "#!/bin/sh\necho hi\n";
        fs::write(entry_path(&hooks, HookSlot::PostCheckout), original).unwrap();
        install(&hooks, HookSlot::PostCheckout, &echo_body("managed")).unwrap();

        uninstall_all(&hooks).unwrap();

        assert_eq!(
            fs::read(entry_path(&hooks, HookSlot::PostCheckout)).unwrap(),
            original.as_bytes()
        );
        assert!(!managed_path(&hooks, HookSlot::PostCheckout).exists());
        assert!(!userscript_path(&hooks, HookSlot::PostCheckout).exists());
    }

    #[test]
    fn uninstall_leaves_foreign_hooks_alone() {
        let (_dir, hooks) = hooks_dir();
        let foreign = "#!/bin/sh\necho mine\n";
        fs::write(entry_path(&hooks, HookSlot::PostCommit), foreign).unwrap();

        uninstall_all(&hooks).unwrap();

        assert_eq!(
            fs::read(entry_path(&hooks, HookSlot::PostCommit)).unwrap(),
            foreign.as_bytes()
        );
    }

    #[cfg(unix)]
    #[test]
    fn all_installed_files_are_executable() {
        let (_dir, hooks) = hooks_dir();
        fs::write(entry_path(&hooks, HookSlot::PostCommit), "#!/bin/sh\necho hi\n").unwrap();
        install(&hooks, HookSlot::PostCommit, &echo_body("managed")).unwrap();

        assert_executable(&entry_path(&hooks, HookSlot::PostCommit));
        assert_executable(&managed_path(&hooks, HookSlot::PostCommit));
        assert_executable(&userscript_path(&hooks, HookSlot::PostCommit));
    }

    #[cfg(unix)]
    #[test]
    fn entrypoint_runs_userscript_then_managed_script() {
        let (_dir, hooks) = hooks_dir();
        fs::write(entry_path(&hooks, HookSlot::PostCommit), "#!/bin/sh\necho hi\n").unwrap();
        // The userscript had no executable bit; the installer must set it.
        install(&hooks, HookSlot::PostCommit, &echo_body("managed")).unwrap();

        let output = run_entrypoint(&hooks, HookSlot::PostCommit, &[]);
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "hi\nmanaged\n");
    }

    #[cfg(unix)]
    #[test]
    fn failing_userscript_short_circuits_the_managed_script() {
        let (_dir, hooks) = hooks_dir();
        fs::write(
            entry_path(&hooks, HookSlot::PostCommit),
            "#!/bin/sh\necho hi\nexit 3\n",
        )
        .unwrap();
        install(&hooks, HookSlot::PostCommit, &echo_body("managed")).unwrap();

        let output = run_entrypoint(&hooks, HookSlot::PostCommit, &[]);
        assert!(!output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "hi\n");
    }

    #[cfg(unix)]
    #[test]
    fn positional_arguments_pass_through_unchanged() {
        let (_dir, hooks) = hooks_dir();
        fs::write(
            entry_path(&hooks, HookSlot::PostCheckout),
            "#!/bin/sh\necho \"user:$1\"\n",
        )
        .unwrap();
        install(
            &hooks,
            HookSlot::PostCheckout,
            "#!/bin/sh\necho \"managed:$2:$3\"\n",
        )
        .unwrap();

        let output = run_entrypoint(&hooks, HookSlot::PostCheckout, &["aaa", "bbb", "1"]);
        assert!(output.status.success());
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "user:aaa\nmanaged:bbb:1\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn fresh_entrypoint_runs_the_managed_script_alone() {
        let (_dir, hooks) = hooks_dir();
        install(&hooks, HookSlot::PostMerge, &echo_body("managed")).unwrap();

        let output = run_entrypoint(&hooks, HookSlot::PostMerge, &["1"]);
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "managed\n");
    }
}
