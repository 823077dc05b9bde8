use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tada", about = concat!("tada v", env!("CARGO_PKG_VERSION"), " - todo.txt, the vim way"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Task file to use instead of the configured one
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read or change settings
    Config(ConfigCmd),
    /// Move old completed tasks into monthly archive files
    Archive(ArchiveArgs),
    /// Print tasks grouped by label
    List(ListArgs),
    /// Show the recovery log
    Recovery(RecoveryArgs),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set a key: file, leader_key, archive.threshold_days, archive.auto_archive
    Set(ConfigSetArgs),
    /// Print one key, or every setting
    Get(ConfigGetArgs),
    /// Print the settings file path
    Path,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Args)]
pub struct ConfigGetArgs {
    pub key: Option<String>,
}

// ---------------------------------------------------------------------------
// Archive / list / recovery
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ArchiveArgs {
    /// Days a completed task stays in the task file (default: from settings)
    #[arg(long)]
    pub days: Option<i64>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Include completed tasks that are old enough to archive
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}
