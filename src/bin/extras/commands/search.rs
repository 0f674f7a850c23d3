//! `extras search` - query every source, first match per name wins.

use anyhow::Result;

use extras::util::Status;

use crate::cli::{OutputFormat, SearchArgs};
use crate::commands::{build_service, print_table};
use crate::GlobalOptions;

pub fn execute(args: SearchArgs, opts: &GlobalOptions) -> Result<()> {
    let service = build_service(opts)?;

    let results = {
        let _span = opts
            .shell
            .span(Status::Fetching, format!("results for `{}`", args.query));
        service.search(&args.query)
    };

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        OutputFormat::Table => {
            if results.is_empty() {
                opts.shell
                    .note(format!("no extras matching `{}`", args.query));
                return Ok(());
            }
            let rows: Vec<Vec<String>> = results
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
