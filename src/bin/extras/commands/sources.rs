//! `extras sources` - the configured source list, in priority order.

use anyhow::Result;

use extras::sources::cache_from_config;

use crate::cli::{OutputFormat, SourcesArgs};
use crate::commands::print_table;
use crate::GlobalOptions;

pub fn execute(args: SourcesArgs, opts: &GlobalOptions) -> Result<()> {
    let cache = cache_from_config(&opts.config, opts.no_cache);
    let set = extras::sources::from_config(&opts.config, cache)?;
    let infos = set.infos();

    match args.format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = infos
                .iter()
                .enumerate()
                .map(|(i, info)| {
                    serde_json::json!({
                        "priority": i + 1,
                        "name": info.name,
                        "url": info.url,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            if infos.is_empty() {
                opts.shell.note("no sources configured");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = infos
                .iter()
                .enumerate()
                .map(|(i, info)| vec![(i + 1).to_string(), info.name.clone(), info.url.clone()])
                .collect();
            print_table(&["#", "NAME", "URL"], &rows);
        }
    }
    Ok(())
}
