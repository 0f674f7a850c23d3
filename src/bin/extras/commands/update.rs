//! `extras update` - rewrite constraints and re-run the resolver.
//!
//! With no names, every entry in the manifest is updated. The catalog
//! is never consulted; the constraint is rewritten as-is.

use anyhow::{bail, Result};

use extras::ops::{run_batch, BatchOptions};
use extras::util::Status;

use crate::cli::UpdateArgs;
use crate::commands::{build_service, collect_names, finish_batch};
use crate::GlobalOptions;

pub fn execute(args: UpdateArgs, opts: &GlobalOptions) -> Result<()> {
    let shell = &opts.shell;
    let service = build_service(opts)?;

    let mut names = collect_names(&args.names, args.file.as_deref())?;
    if names.is_empty() {
        names = service.installed().into_keys().collect();
        if names.is_empty() {
            shell.note("no extras installed");
            return Ok(());
        }
    }

    if args.version.is_some() && names.len() > 1 {
        bail!(
            "--version applies to a single package, but {} were named",
            names.len()
        );
    }
    let version = args.version.as_deref().unwrap_or("latest");

    if args.dry_run {
        for name in &names {
            shell.note(format!("would update {name} ({version})"));
        }
        return Ok(());
    }

    if names.len() == 1 {
        let name = &names[0];
        shell.status(Status::Resolving, name);
        if service.update(name, version)? {
            shell.status(Status::Updated, name);
        } else {
            bail!("update of `{name}` did not complete");
        }
        return Ok(());
    }

    let options = BatchOptions {
        continue_on_error: args.continue_on_error,
        parallelism: args.parallel.max(1),
    };
    let progress = shell.progress(names.len() as u64, "updating");
    let report = run_batch(&names, &options, |name| {
        let result = service.update(name, version);
        progress.inc(1);
        result
    });
    progress.finish();

    for (name, resolved) in &report.succeeded {
        if *resolved {
            shell.status(Status::Updated, name);
        } else {
            shell.warn(format!("{name} was recorded but the resolver did not run"));
        }
    }
    finish_batch(shell, "update", names.len(), &report)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: UpdateArgs,
    }

    #[test]
    fn names_are_optional() {
        let cli = TestCli::parse_from(["test"]);
        assert!(cli.args.names.is_empty());
        assert!(cli.args.version.is_none());
    }

    #[test]
    fn parses_names_and_version() {
        let cli = TestCli::parse_from(["test", "acme/widget", "--version", "~1.4"]);
        assert_eq!(cli.args.names, vec!["acme/widget"]);
        assert_eq!(cli.args.version.as_deref(), Some("~1.4"));
    }
}
