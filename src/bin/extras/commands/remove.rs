//! `extras remove` - drop entries from composer.json.
//!
//! Removal never consults the catalog; a package that vanished from
//! every source can still be uninstalled.

use anyhow::{bail, Result};

use extras::ops::{run_batch, BatchOptions};
use extras::util::Status;

use crate::cli::RemoveArgs;
use crate::commands::{build_service, collect_names, confirm, finish_batch};
use crate::GlobalOptions;

pub fn execute(args: RemoveArgs, opts: &GlobalOptions) -> Result<()> {
    let shell = &opts.shell;
    let service = build_service(opts)?;

    let names = if args.all {
        let installed: Vec<String> = service.installed().into_keys().collect();
        if installed.is_empty() {
            shell.note("no extras installed");
            return Ok(());
        }
        let confirmed = args.force
            || confirm(&format!(
                "remove all {} installed extras?",
                installed.len()
            ))?;
        if !confirmed {
            shell.note("aborted");
            return Ok(());
        }
        installed
    } else {
        collect_names(&args.names, args.file.as_deref())?
    };

    if names.is_empty() {
        bail!("no packages to remove");
    }

    if args.dry_run {
        for name in &names {
            shell.note(format!("would remove {name}"));
        }
        return Ok(());
    }

    if names.len() == 1 {
        let name = &names[0];
        if !service.is_installed(name) {
            shell.status(Status::Warning, format!("{name} is not installed"));
            return Ok(());
        }
        shell.status(Status::Resolving, name);
        if service.remove(name)? {
            shell.status(Status::Removed, name);
        } else {
            bail!("removal of `{name}` did not complete");
        }
        return Ok(());
    }

    let options = BatchOptions {
        continue_on_error: args.continue_on_error,
        parallelism: args.parallel.max(1),
    };
    let progress = shell.progress(names.len() as u64, "removing");
    let report = run_batch(&names, &options, |name| {
        let result = service.remove(name);
        progress.inc(1);
        result
    });
    progress.finish();

    for (name, removed) in &report.succeeded {
        if *removed {
            shell.status(Status::Removed, name);
        } else {
            shell.note(format!("{name} was not installed"));
        }
    }
    finish_batch(shell, "remove", names.len(), &report)
}
