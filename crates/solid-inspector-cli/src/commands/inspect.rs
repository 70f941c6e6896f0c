//! solid-inspector inspect command - list what keeps a model from being a solid.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use solid_inspector::progress::TracingStatus;
use solid_inspector::{Defect, DefectKind, InspectionReport, Inspector, load_obj};

use crate::{Cli, InspectArgs, OutputFormat, output};

/// Defects listed one by one in text mode before the rest are summarized.
const TEXT_LIMIT: usize = 50;

#[derive(Serialize)]
struct InspectionSummary<'a> {
    path: String,
    solid: bool,
    classified: bool,
    counts: BTreeMap<DefectKind, usize>,
    fixable: usize,
    failures: Vec<String>,
    defects: &'a [Defect],
}

pub fn run(input: &Path, args: &InspectArgs, cli: &Cli) -> Result<bool> {
    let params = super::inspect_params(args)?;
    let entities =
        load_obj(input).with_context(|| format!("Failed to load model from {:?}", input))?;

    let report = Inspector::new(&entities)
        .params(params)
        .status(&TracingStatus)
        .run()
        .with_context(|| format!("Failed to inspect {:?}", input))?;

    print_report(input, &report, cli);
    Ok(report.is_solid())
}

/// Print an inspection report in the selected format.
fn print_report(input: &Path, report: &InspectionReport, cli: &Cli) {
    let result = InspectionSummary {
        path: input.display().to_string(),
        solid: report.is_solid(),
        classified: report.classified,
        counts: report.counts_by_kind(),
        fixable: report.fixable_count(),
        failures: report.failures.iter().map(|e| e.to_string()).collect(),
        defects: &report.defects,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if cli.quiet {
                return;
            }
            println!("{}", "Solid Inspection".bold().underline());
            println!("  {}: {}", "File".cyan(), input.display());
            if result.solid {
                println!("  {}: {}", "Status".cyan(), "Solid".green().bold());
                return;
            }
            println!("  {}: {}", "Status".cyan(), "Not a solid".red().bold());
            println!(
                "  {}: {} of {}",
                "Fixable".cyan(),
                result.fixable,
                report.defects.len()
            );
            println!();
            output::defect_list(&report.defects, TEXT_LIMIT);
            for failure in &result.failures {
                println!("  {} {}", "Not analysed:".yellow(), failure);
            }
        }
    }
}
