//! solid-inspector kinds command - describe the defect kinds.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use solid_inspector::{DefectKind, FixStrategy};

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct KindInfo {
    kind: DefectKind,
    name: &'static str,
    description: &'static str,
    fix: &'static str,
}

fn fix_label(strategy: FixStrategy) -> &'static str {
    match strategy {
        FixStrategy::BulkErase => "erase",
        FixStrategy::Reverse => "reverse",
        FixStrategy::Unhide => "unhide",
        FixStrategy::Explode => "explode (opt-in)",
        FixStrategy::Manual => "manual",
    }
}

pub fn run(cli: &Cli) -> Result<bool> {
    let kinds: Vec<KindInfo> = DefectKind::ALL
        .into_iter()
        .map(|kind| KindInfo {
            kind,
            name: kind.display_name(),
            description: kind.description(),
            fix: fix_label(kind.fix_strategy()),
        })
        .collect();

    match cli.format {
        OutputFormat::Json => {
            output::print(&kinds, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Defect Kinds".bold().underline());
                for info in &kinds {
                    println!(
                        "\n  {} {} [{}]",
                        output::kind_marker(info.kind),
                        info.name.bold(),
                        info.fix
                    );
                    println!("    {}", info.description);
                }
            }
        }
    }

    Ok(true)
}
