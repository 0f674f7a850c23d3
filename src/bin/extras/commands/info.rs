//! `extras info` - one package, every field worth reading.

use anyhow::{bail, Result};

use extras::Package;

use crate::cli::{InfoArgs, OutputFormat};
use crate::commands::build_service;
use crate::GlobalOptions;

pub fn execute(args: InfoArgs, opts: &GlobalOptions) -> Result<()> {
    let service = build_service(opts)?;

    let Some(package) = service.find(&args.name) else {
        bail!("package `{}` not found in any source", args.name);
    };

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&package)?);
        }
        OutputFormat::Table => {
            let constraint = service.installed().get(&args.name).cloned();
            print_details(&package, constraint.as_deref());
        }
    }
    Ok(())
}

fn print_details(package: &Package, constraint: Option<&str>) {
    println!("{}", package.display_name());

    let field = |label: &str, value: &str| {
        if !value.is_empty() {
            println!("  {:<12} {}", format!("{label}:"), value);
        }
    };

    field("version", &package.version);
    field("type", &package.kind);
    field("description", &package.description);
    field("author", &package.author);
    field("license", &package.license);
    field("homepage", &package.homepage);
    if !package.keywords.is_empty() {
        field("keywords", &package.keywords.join(", "));
    }
    field("source", &package.origin);

    if !package.require.is_empty() {
        println!("  require:");
        for (name, version) in &package.require {
            println!("    {name} {version}");
        }
    }

    match constraint {
        Some(constraint) => field("installed", &format!("yes ({constraint})")),
        None => field("installed", "no"),
    }
}
