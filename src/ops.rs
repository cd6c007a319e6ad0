use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Local};
use colored::*;
use comfy_table::{Attribute, Cell, ContentArrangement, Table, presets::UTF8_FULL};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::ort::{DatabaseConfig, OrtConfig};
use crate::drivers::{ConnectionProfile, DumpEngine};
use crate::error::OrtError;
use crate::hooks;
use crate::storage::{
    self,
    snapshots::{self, Namespace, SnapshotId},
};

pub fn do_init(root: &Path) -> Result<()> {
    // Fail fast before prompting.
    if !root.join(".git").is_dir() {
        return Err(OrtError::NotAGitProject.into());
    }
    if storage::ort_dir(root).exists() {
        return Err(OrtError::AlreadyInitialized.into());
    }
    hooks::check_not_installed(&storage::hooks_dir(root))?;

    let database = prompt_database_config()?;
    init_with_config(root, database)
}

pub fn init_with_config(root: &Path, database: DatabaseConfig) -> Result<()> {
    hooks::check_not_installed(&storage::hooks_dir(root))?;
    storage::init_at(root)?;
    println!(
        "{} {}",
        "✔".green().bold(),
        "Created .ort configuration folder".green()
    );

    storage::save_config(root, &OrtConfig::new(database))?;
    hooks::install_all(&storage::hooks_dir(root))?;
    println!(
        "{} {}",
        "✔".green().bold(),
        "Installed git hooks: post-commit, post-merge, post-checkout".green()
    );
    Ok(())
}

pub fn do_reset(root: &Path) -> Result<()> {
    if !storage::ort_dir(root).is_dir() || !root.join(".git").is_dir() {
        return Err(anyhow!("there is no ort configuration to reset here"));
    }

    println!(
        "{} {}",
        "!".yellow().bold(),
        "WARNING: resetting removes the ort configuration AND ALL SNAPSHOTS.".yellow()
    );
    if !prompt_confirm("Reset ort? [y/N] ")? {
        println!("Aborted.");
        return Ok(());
    }

    storage::remove(root)?;
    hooks::uninstall_all(&storage::hooks_dir(root))?;
    println!(
        "{} {}",
        "✔".green().bold(),
        "Removed ort configuration, snapshots and hooks".green()
    );

    do_init(root)
}

pub fn do_snapshot(root: &Path, engine: &dyn DumpEngine, id: &SnapshotId) -> Result<()> {
    if id.name.is_empty() {
        return Err(anyhow!("snapshot name must not be empty"));
    }
    let config = storage::load_config(root)?;
    let profile = ConnectionProfile::build_from(&config.database)?;

    let dest = id.path_under(root);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    // The external dump targets a stage file; only a complete dump is
    // renamed into the addressable path.
    let stage = snapshots::stage_path(&dest);
    let bar = create_progress_bar(&format!("Dumping schema '{}'", profile.schema));
    let dumped = engine.dump(&profile, &stage);
    bar.finish_and_clear();

    if let Err(err) = dumped {
        let _ = fs::remove_file(&stage);
        return Err(OrtError::SnapshotFailed {
            id: id.to_string(),
            reason: err.to_string(),
        }
        .into());
    }
    let non_empty = fs::metadata(&stage).map(|m| m.len() > 0).unwrap_or(false);
    if !non_empty {
        let _ = fs::remove_file(&stage);
        return Err(OrtError::SnapshotFailed {
            id: id.to_string(),
            reason: "dump produced no output".to_string(),
        }
        .into());
    }
    snapshots::commit(&stage, &dest)?;

    println!(
        "{} {}",
        "✔".green().bold(),
        format!("Snapshot {id} created").green()
    );
    Ok(())
}

pub fn do_restore(root: &Path, engine: &dyn DumpEngine, id: &SnapshotId) -> Result<()> {
    if id.name.is_empty() {
        return Err(anyhow!("snapshot name must not be empty"));
    }
    let config = storage::load_config(root)?;
    let profile = ConnectionProfile::build_from(&config.database)?;

    let source = id.path_under(root);
    // Missing snapshots are reported before any external process runs.
    snapshots::read_for_restore(id, &source)?;

    let bar = create_progress_bar(&format!("Restoring schema '{}'", profile.schema));
    let restored = engine.restore(&profile, &source);
    bar.finish_and_clear();

    restored.map_err(|err| OrtError::RestoreFailed {
        id: id.to_string(),
        reason: err.to_string(),
    })?;

    println!(
        "{} {}",
        "✔".green().bold(),
        format!("Restored snapshot {id}").green()
    );
    Ok(())
}

pub fn do_list(root: &Path) -> Result<()> {
    let mut rows = Vec::new();
    for namespace in [Namespace::Ref, Namespace::Named] {
        let dir = storage::ort_dir(root).join(namespace.dir_name());
        if !dir.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let meta = entry.metadata()?;
            let modified: DateTime<Local> = meta.modified()?.into();
            rows.push((
                entry.file_name().to_string_lossy().into_owned(),
                namespace,
                meta.len(),
                modified,
            ));
        }
    }

    if rows.is_empty() {
        println!("{} {}", "i".yellow().bold(), "No snapshots found".yellow());
        return Ok(());
    }
    rows.sort_by(|a, b| b.3.cmp(&a.3));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Namespace").add_attribute(Attribute::Bold),
            Cell::new("Size").add_attribute(Attribute::Bold),
            Cell::new("Modified").add_attribute(Attribute::Bold),
        ]);
    for (name, namespace, size, modified) in &rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(namespace.label()),
            Cell::new(format!("{size} B")),
            Cell::new(modified.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn create_progress_bar(prefix: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );
    bar.set_message(prefix.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    bar
}

fn prompt_database_config() -> Result<DatabaseConfig> {
    Ok(DatabaseConfig {
        database_host: prompt("Database Host", Some("127.0.0.1"))?,
        database_port: prompt("Database Port", Some("3306"))?,
        database_user: prompt("Database Username", Some("root"))?,
        database_password: prompt_password("Database Password")?,
        database_schema: prompt("Database Schema", None)?,
    })
}

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    loop {
        match default {
            Some(value) => print!("{} {} [{}]: ", "?".cyan().bold(), label.cyan(), value),
            None => print!("{} {}: ", "?".cyan().bold(), label.cyan()),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(anyhow!("stdin closed while reading {label}"));
        }
        let input = input.trim();
        if !input.is_empty() {
            return Ok(input.to_string());
        }
        if let Some(value) = default {
            return Ok(value.to_string());
        }
    }
}

fn prompt_password(label: &str) -> Result<String> {
    loop {
        print!("{} {}: ", "?".cyan().bold(), label.cyan());
        io::stdout().flush()?;
        // rpassword reads the controlling terminal; piped stdin gets a
        // plain line instead so the prompt also works non-interactively.
        let password = if io::stdin().is_terminal() {
            rpassword::read_password()? // input hidden
        } else {
            let mut line = String::new();
            if io::stdin().read_line(&mut line)? == 0 {
                return Err(anyhow!("stdin closed while reading {label}"));
            }
            line.trim_end_matches(['\r', '\n']).to_string()
        };
        if !password.is_empty() {
            return Ok(password);
        }
    }
}

fn prompt_confirm(message: &str) -> Result<bool> {
    print!("{} {}", "?".cyan().bold(), message.cyan());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
