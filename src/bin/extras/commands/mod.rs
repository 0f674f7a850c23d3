//! Subcommand implementations.

pub mod cache;
pub mod completions;
pub mod info;
pub mod install;
pub mod list;
pub mod remove;
pub mod search;
pub mod sources;
pub mod update;

use std::path::Path;

use anyhow::{bail, Context, Result};

use extras::ops::BatchReport;
use extras::sources::cache_from_config;
use extras::util::{fs, Shell};
use extras::{Composer, ExtrasService, Package};

use crate::GlobalOptions;

/// Wire the catalog sources and the manifest driver together.
pub fn build_service(opts: &GlobalOptions) -> Result<ExtrasService> {
    let cache = cache_from_config(&opts.config, opts.no_cache);
    let sources = extras::sources::from_config(&opts.config, cache)?;
    let composer = Composer::new(&opts.project_root)
        .with_bin(opts.config.composer_bin())
        .with_timeout(opts.config.composer_timeout());
    Ok(ExtrasService::new(sources, composer))
}

/// Positional names plus the contents of `--file`, one name per line.
/// Blank lines and `#` comments in the file are ignored.
pub fn collect_names(names: &[String], file: Option<&Path>) -> Result<Vec<String>> {
    let mut collected = names.to_vec();
    if let Some(path) = file {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read package list {}", path.display()))?;
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            collected.push(line.to_string());
        }
    }
    Ok(collected)
}

/// Print per-name failures and the batch summary, then turn a failed
/// batch into a non-zero exit.
pub fn finish_batch<T>(
    shell: &Shell,
    action: &str,
    requested: usize,
    report: &BatchReport<T>,
) -> Result<()> {
    for (name, reason) in &report.failed {
        shell.error(format!("{name}: {reason}"));
    }

    let mut summary = format!(
        "{action}: {} succeeded, {} failed",
        report.succeeded.len(),
        report.failed.len()
    );
    let unattempted = report.unattempted(requested);
    if unattempted > 0 {
        summary.push_str(&format!(", {unattempted} not attempted"));
    }
    shell.note(summary);

    if !report.is_success() {
        bail!("{} package(s) failed to {action}", report.failed.len());
    }
    Ok(())
}

/// Ask a yes/no question on stderr and read the answer from stdin.
pub fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;

    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush().ok();

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes" | "YES"))
}

/// Columns sized to their widest cell, two spaces apart.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let render = |cells: &[&str]| -> String {
        let line = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    };

    println!("{}", render(headers));
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        println!("{}", render(&cells));
    }
}

/// Post-install notes some extras ship in their metadata.
pub fn print_instructions(shell: &Shell, package: &Package) {
    let Some(instructions) = package.extra.get("instructions").and_then(|v| v.as_str()) else {
        return;
    };
    for line in instructions.lines() {
        let line = line.trim_end();
        if !line.is_empty() {
            shell.note(line);
        }
    }
}
