//! `extras install` - resolve from the catalog, record in composer.json,
//! let composer do the heavy lifting.

use anyhow::{bail, Result};

use extras::ops::{run_batch, BatchOptions};
use extras::util::Status;

use crate::cli::InstallArgs;
use crate::commands::{build_service, collect_names, finish_batch, print_instructions};
use crate::GlobalOptions;

pub fn execute(args: InstallArgs, opts: &GlobalOptions) -> Result<()> {
    let shell = &opts.shell;

    let names = collect_names(&args.names, args.file.as_deref())?;
    if names.is_empty() {
        bail!("no packages to install");
    }
    if args.version.is_some() && names.len() > 1 {
        bail!(
            "--version applies to a single package, but {} were named",
            names.len()
        );
    }
    let version = args.version.as_deref().unwrap_or("latest");

    let service = build_service(opts)?;

    let mut to_install = Vec::new();
    for name in names {
        if !args.force && service.is_installed(&name) {
            shell.status(
                Status::Skipped,
                format!("{name} is already installed (--force reinstalls)"),
            );
            continue;
        }
        to_install.push(name);
    }
    if to_install.is_empty() {
        shell.note("nothing to install");
        return Ok(());
    }

    if args.dry_run {
        for name in &to_install {
            shell.note(format!("would install {name} ({version})"));
        }
        return Ok(());
    }

    if to_install.len() == 1 {
        let name = &to_install[0];
        shell.status(Status::Resolving, name);
        let package = service.install(name, version)?;
        shell.status(
            Status::Installed,
            format!("{} {}", package.display_name(), package.version),
        );
        print_instructions(shell, &package);
        return Ok(());
    }

    let options = BatchOptions {
        continue_on_error: args.continue_on_error,
        parallelism: args.parallel.max(1),
    };
    let progress = shell.progress(to_install.len() as u64, "installing");
    let report = run_batch(&to_install, &options, |name| {
        let result = service.install(name, version);
        progress.inc(1);
        result
    });
    progress.finish();

    for (name, package) in &report.succeeded {
        shell.status(Status::Installed, format!("{name} {}", package.version));
        print_instructions(shell, package);
    }
    finish_batch(shell, "install", to_install.len(), &report)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: InstallArgs,
    }

    #[test]
    fn parses_names_and_batch_flags() {
        let cli = TestCli::parse_from([
            "test",
            "acme/widget",
            "acme/gadget",
            "--continue-on-error",
            "--parallel",
            "4",
        ]);
        assert_eq!(cli.args.names, vec!["acme/widget", "acme/gadget"]);
        assert!(cli.args.continue_on_error);
        assert_eq!(cli.args.parallel, 4);
        assert!(!cli.args.force);
        assert!(!cli.args.dry_run);
    }

    #[test]
    fn version_takes_a_constraint() {
        let cli = TestCli::parse_from(["test", "acme/widget", "--version", "^2.0"]);
        assert_eq!(cli.args.version.as_deref(), Some("^2.0"));
    }

    #[test]
    fn names_required_unless_file_given() {
        assert!(TestCli::try_parse_from(["test"]).is_err());

        let cli = TestCli::parse_from(["test", "--file", "extras.txt"]);
        assert!(cli.args.names.is_empty());
        assert_eq!(cli.args.file.as_deref(), Some(Path::new("extras.txt")));
    }
}
