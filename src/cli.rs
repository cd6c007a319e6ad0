use clap::{Parser, Subcommand};

/// ort: MySQL schema snapshots that follow your git branches
#[derive(Parser, Debug)]
#[command(
    name = "ort",
    version,
    about = "Snapshot and restore a MySQL schema in step with git branch operations.",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize ort in the root of a git project and install the git hooks
    Init,

    /// Remove the ort configuration AND ALL SNAPSHOTS, then initialize again
    Reset,

    /// Dump the configured schema into a snapshot
    Snapshot {
        /// Name for the snapshot
        name: String,

        /// Address the snapshot by git ref instead of by user label
        #[arg(long = "ref")]
        git_ref: bool,
    },

    /// Load a snapshot back into the database
    Restore {
        /// Name of the snapshot
        name: String,

        /// Address the snapshot by git ref instead of by user label
        #[arg(long = "ref")]
        git_ref: bool,
    },

    /// List snapshots across both namespaces
    List,
}
