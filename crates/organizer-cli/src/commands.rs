use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "organizer")]
#[command(about = "Keeps a categorized symlink view of a flat media directory", long_about = None)]
pub struct Cli {
    /// Perform filesystem changes even if REAL_RUN is not set
    #[arg(long, global = true)]
    pub real_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a pass now, then every configured interval (default)
    Run,
    /// Run a single reconciliation pass and exit
    Once,
    /// Remove all symlinks and empty directories from the target root
    Clean,
    /// Show ledger size and how many source entries are new
    Status {
        /// Also print every processed name
        #[arg(long)]
        list: bool,
    },
    /// Print configuration values
    PrintConfig,
    /// Forget every processed item so the next pass reclassifies everything
    ResetLedger,
}
