//! Extras CLI - a package manager for CMS extras.

mod cli;
mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use extras::util::fs::normalize_path;
use extras::util::{config, ColorChoice, Config, Shell};

use crate::cli::{Cli, Commands};

/// Options shared by every subcommand, resolved once at startup.
pub struct GlobalOptions {
    pub shell: Arc<Shell>,
    pub config: Config,
    pub project_root: PathBuf,
    pub no_cache: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let shell = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, color));

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let search_root = cli.project.clone().unwrap_or_else(|| cwd.clone());
    let config = config::load_merged(&search_root);

    // --project wins over the config file; both fall back to the cwd.
    let project_root = cli
        .project
        .or_else(|| config.project_path())
        .unwrap_or(cwd);
    let project_root = normalize_path(&project_root);

    let opts = GlobalOptions {
        shell,
        config,
        project_root,
        no_cache: cli.no_cache,
    };

    match cli.command {
        Commands::List(args) => commands::list::execute(args, &opts),
        Commands::Search(args) => commands::search::execute(args, &opts),
        Commands::Info(args) => commands::info::execute(args, &opts),
        Commands::Install(args) => commands::install::execute(args, &opts),
        Commands::Remove(args) => commands::remove::execute(args, &opts),
        Commands::Update(args) => commands::update::execute(args, &opts),
        Commands::Sources(args) => commands::sources::execute(args, &opts),
        Commands::Cache(args) => commands::cache::execute(args, &opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// `EXTRAS_LOG` takes precedence; otherwise `-v` lifts the crate level
/// to debug. Diagnostics always go to stderr so stdout stays parseable.
fn init_tracing(verbose: bool) {
    let filter = match std::env::var("EXTRAS_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ if verbose => EnvFilter::new("extras=debug"),
        _ => EnvFilter::new("extras=warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
