pub mod config;
mod cli;
mod drivers;
mod error;
mod hooks;
mod ops;
mod storage;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use drivers::mysql::MySqlDriver;
use storage::snapshots::SnapshotId;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let root = std::env::current_dir()?;
            ops::do_init(&root)?;
        }
        Commands::Reset => {
            let root = std::env::current_dir()?;
            ops::do_reset(&root)?;
        }
        Commands::Snapshot { name, git_ref } => {
            let root = storage::find_root()?;
            ops::do_snapshot(&root, &MySqlDriver, &snapshot_id(name, git_ref))?;
        }
        Commands::Restore { name, git_ref } => {
            let root = storage::find_root()?;
            ops::do_restore(&root, &MySqlDriver, &snapshot_id(name, git_ref))?;
        }
        Commands::List => {
            let root = storage::find_root()?;
            ops::do_list(&root)?;
        }
    }

    Ok(())
}

fn snapshot_id(name: String, git_ref: bool) -> SnapshotId {
    if git_ref {
        SnapshotId::for_ref(name)
    } else {
        SnapshotId::named(name)
    }
}
