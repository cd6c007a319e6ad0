use std::path::Path;
use std::process::Command;

use anyhow::{Result, bail};

use super::{ConnectionProfile, DumpEngine};

pub struct MySqlDriver;

impl MySqlDriver {
    /// Full-schema dump command, drop/recreate statements included. The
    /// password is embedded in plain text and is visible in process listings
    /// and shell history; this exposure is inherited from the design.
    pub fn dump_command(&self, profile: &ConnectionProfile, dest: &Path) -> String {
        format!(
            "mysqldump --user={} --password={} --port={} --host={} --result-file={} --add-drop-database --databases {}",
            profile.username,
            profile.password,
            profile.port,
            profile.host,
            dest.display(),
            profile.schema,
        )
    }

    /// Command feeding `source` into the mysql client over the same
    /// connection. Same plaintext password exposure as `dump_command`.
    pub fn restore_command(&self, profile: &ConnectionProfile, source: &Path) -> String {
        format!(
            "mysql --user={} --password={} --port={} --host={} < {}",
            profile.username,
            profile.password,
            profile.port,
            profile.host,
            source.display(),
        )
    }
}

impl DumpEngine for MySqlDriver {
    fn dump(&self, profile: &ConnectionProfile, dest: &Path) -> Result<()> {
        run_shell(&self.dump_command(profile, dest))
    }

    fn restore(&self, profile: &ConnectionProfile, source: &Path) -> Result<()> {
        run_shell(&self.restore_command(profile, source))
    }
}

fn run_shell(command: &str) -> Result<()> {
    let status = Command::new("sh").arg("-c").arg(command).status()?;
    if !status.success() {
        let name = command.split_whitespace().next().unwrap_or("command");
        bail!("`{name}` exited with {status}");
    }
    Ok(())
}
