//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Extras - a package manager for CMS extras
#[derive(Parser)]
#[command(name = "extras")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress status output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project directory holding composer.json (defaults to cwd)
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Bypass the metadata cache for this invocation
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available extras from every configured source
    List(ListArgs),

    /// Search extras by name or description
    Search(SearchArgs),

    /// Show detailed information about an extra
    Info(InfoArgs),

    /// Install extras into the project
    Install(InstallArgs),

    /// Remove extras from the project
    Remove(RemoveArgs),

    /// Update installed extras
    Update(UpdateArgs),

    /// List configured sources in priority order
    Sources(SourcesArgs),

    /// Manage the metadata cache
    Cache(CacheArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only show extras recorded in composer.json
    #[arg(long)]
    pub installed: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "table", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Filter by a search term (legacy spelling of `extras search`)
    #[arg(long, hide = true, value_name = "QUERY")]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search term
    pub query: String,

    /// Output format
    #[arg(long, value_enum, default_value = "table", value_name = "FORMAT")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Package name (vendor/name)
    pub name: String,

    /// Output format
    #[arg(long, value_enum, default_value = "table", value_name = "FORMAT")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Package names (vendor/name)
    #[arg(required_unless_present = "file")]
    pub names: Vec<String>,

    /// Version constraint; only valid with a single package
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Read additional package names from a file, one per line
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Reinstall packages already in the manifest
    #[arg(long)]
    pub force: bool,

    /// Keep going after a failed package
    #[arg(long)]
    pub continue_on_error: bool,

    /// Number of packages to process at once
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub parallel: usize,

    /// Show what would be installed without doing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Package names (vendor/name)
    #[arg(required_unless_present_any = ["all", "file"])]
    pub names: Vec<String>,

    /// Remove every installed extra
    #[arg(long, conflicts_with = "names")]
    pub all: bool,

    /// Read additional package names from a file, one per line
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Skip the confirmation prompt for --all
    #[arg(long)]
    pub force: bool,

    /// Keep going after a failed package
    #[arg(long)]
    pub continue_on_error: bool,

    /// Number of packages to process at once
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub parallel: usize,

    /// Show what would be removed without doing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Package names; defaults to every installed extra
    pub names: Vec<String>,

    /// Version constraint; only valid with a single package
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Read additional package names from a file, one per line
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Keep going after a failed package
    #[arg(long)]
    pub continue_on_error: bool,

    /// Number of packages to process at once
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub parallel: usize,

    /// Show what would be updated without doing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct SourcesArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "table", value_name = "FORMAT")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Remove every cached entry
    Clear,

    /// Show cache backend and entry counts
    Status,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
