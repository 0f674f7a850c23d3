//! `extras list` - the catalog and the installed view.

use anyhow::Result;

use extras::util::Status;

use crate::cli::{ListArgs, OutputFormat, SearchArgs};
use crate::commands::{build_service, print_table, search};
use crate::GlobalOptions;

pub fn execute(args: ListArgs, opts: &GlobalOptions) -> Result<()> {
    // `list --search <q>` predates the `search` subcommand; keep it working.
    if let Some(query) = args.search {
        return search::execute(
            SearchArgs {
                query,
                format: args.format,
            },
            opts,
        );
    }

    let service = build_service(opts)?;

    if args.installed {
        return list_installed(&service, args.format, opts);
    }

    let packages = {
        let _span = opts.shell.span(Status::Fetching, "extras catalog");
        service.available()
    };
    let packages: Vec<_> = packages.into_values().collect();

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&packages)?);
        }
        OutputFormat::Table => {
            if packages.is_empty() {
                opts.shell.note("no extras available");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = packages
                .iter()
                .map(|p| {
                    vec![
                        p.name.clone(),
                        p.version.clone(),
                        p.origin.clone(),
                        p.short_description(),
                    ]
                })
                .collect();
            print_table(&["NAME", "VERSION", "SOURCE", "DESCRIPTION"], &rows);
        }
    }
    Ok(())
}

/// The manifest's require map, joined against the catalog where the
/// name still resolves.
fn list_installed(
    service: &extras::ExtrasService,
    format: OutputFormat,
    opts: &GlobalOptions,
) -> Result<()> {
    let installed = service.installed();

    if installed.is_empty() && format == OutputFormat::Table {
        opts.shell.note("no extras installed");
        return Ok(());
    }

    let catalog = {
        let _span = opts.shell.span(Status::Fetching, "extras catalog");
        service.available()
    };

    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = installed
                .iter()
                .map(|(name, constraint)| {
                    let mut row = serde_json::json!({
                        "name": name,
                        "constraint": constraint,
                    });
                    if let Some(package) = catalog.get(name) {
                        row["version"] = package.version.clone().into();
                        row["repository"] = package.origin.clone().into();
                    }
                    row
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = installed
                .iter()
                .map(|(name, constraint)| {
                    let (version, source) = catalog
                        .get(name)
                        .map(|p| (p.version.clone(), p.origin.clone()))
                        .unwrap_or_default();
                    vec![name.clone(), constraint.clone(), version, source]
                })
                .collect();
            print_table(&["NAME", "CONSTRAINT", "VERSION", "SOURCE"], &rows);
        }
    }
    Ok(())
}
