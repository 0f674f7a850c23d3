//! `extras cache` - inspect or wipe the metadata cache.

use anyhow::Result;

use extras::sources::cache_from_config;
use extras::util::Status;

use crate::cli::{CacheArgs, CacheCommands};
use crate::GlobalOptions;

pub fn execute(args: CacheArgs, opts: &GlobalOptions) -> Result<()> {
    let cache = cache_from_config(&opts.config, opts.no_cache);

    match args.command {
        CacheCommands::Clear => {
            cache.clear();
            opts.shell.status(Status::Cleared, "metadata cache");
        }
        CacheCommands::Status => {
            let status = cache.status();
            println!("backend: {}", status.backend);
            println!("entries: {}", status.entries);
            println!("live:    {}", status.live);
        }
    }
    Ok(())
}
