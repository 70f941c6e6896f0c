//! solid-inspector fix command - apply fixes and save a copy.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use solid_inspector::{
    DefectKind, Document, FixParams, Model, Transform3, find_errors, fix_errors, load_obj,
    save_obj,
};
use tracing::info;

use crate::{Cli, InspectArgs, OutputFormat, output};

#[derive(Serialize)]
struct FixResult {
    input: String,
    output: String,
    found: usize,
    erased: usize,
    orphan_edges: usize,
    reversed: usize,
    unhidden: usize,
    exploded: usize,
    unfixed: Vec<String>,
    remaining: usize,
    solid: bool,
}

pub fn run(
    input: &Path,
    output_path: &Path,
    explode_instances: bool,
    args: &InspectArgs,
    cli: &Cli,
) -> Result<bool> {
    let params = super::inspect_params(args)?;
    let entities =
        load_obj(input).with_context(|| format!("Failed to load model from {:?}", input))?;
    let identity = Transform3::identity();

    let defects = find_errors(&entities, &identity, &params)
        .with_context(|| format!("Failed to inspect {:?}", input))?;

    info!(defects = defects.len(), explode_instances, "Applying fixes");
    let mut model = Model::new(entities);
    let fix_params = FixParams {
        explode_nested_instances: explode_instances,
    };
    let report = fix_errors(&defects, &mut model, &fix_params).context("Fix operation failed")?;

    let remaining = find_errors(model.entities(), &identity, &params)
        .context("Failed to re-inspect the fixed model")?;

    save_obj(&model.entities().mesh, output_path)
        .with_context(|| format!("Failed to save fixed model to {:?}", output_path))?;

    let manual: Vec<DefectKind> = report.manual_attention();
    let result = FixResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        found: defects.len(),
        erased: report.erased,
        orphan_edges: report.orphan_edges,
        reversed: report.reversed,
        unhidden: report.unhidden,
        exploded: report.exploded,
        unfixed: manual.iter().map(|k| k.display_name().to_string()).collect(),
        remaining: remaining.len(),
        solid: remaining.is_empty(),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(
                    &format!("Fixed model saved to {}", output_path.display()),
                    cli.format,
                    cli.quiet,
                );
                println!("  {}: {}", "Defects found".cyan(), result.found);
                if result.erased > 0 {
                    println!(
                        "  {}: {} entities ({} orphaned edges)",
                        "Erased".green(),
                        result.erased,
                        result.orphan_edges
                    );
                }
                if result.reversed > 0 {
                    println!("  {}: {} faces", "Reversed".green(), result.reversed);
                }
                if result.unhidden > 0 {
                    println!("  {}: {} faces", "Unhidden".green(), result.unhidden);
                }
                if result.exploded > 0 {
                    println!("  {}: {} instances", "Exploded".green(), result.exploded);
                }
                for kind in &manual {
                    println!(
                        "  {} {}: {}",
                        output::kind_marker(*kind),
                        kind.display_name(),
                        kind.description()
                    );
                }
                if result.solid {
                    println!("  {}: {}", "Status".cyan(), "Solid".green().bold());
                } else {
                    println!(
                        "  {}: {} defects remain",
                        "Status".cyan(),
                        result.remaining.to_string().red().bold()
                    );
                }
            }
        }
    }

    Ok(result.solid)
}
