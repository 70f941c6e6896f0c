//! Shared output helpers for text and JSON modes.

use colored::Colorize;
use serde::Serialize;
use solid_inspector::{Defect, DefectKind};

use crate::OutputFormat;

/// Print a serializable result as pretty JSON.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet && matches!(format, OutputFormat::Text) {
        return;
    }
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{}: failed to serialize output: {}", "Error".red().bold(), e),
    }
}

/// Print a success line in text mode.
pub fn success(message: &str, format: OutputFormat, quiet: bool) {
    if quiet || matches!(format, OutputFormat::Json) {
        return;
    }
    println!("{} {}", "✓".green().bold(), message);
}

/// Coloured marker for a defect kind: fixable kinds in yellow, the rest red.
pub fn kind_marker(kind: DefectKind) -> colored::ColoredString {
    if kind.is_fixable() {
        "⚠".yellow()
    } else {
        "✗".red()
    }
}

/// Print per-kind counts followed by each defect.
pub fn defect_list(defects: &[Defect], limit: usize) {
    for kind in DefectKind::ALL {
        let count = defects.iter().filter(|d| d.kind() == kind).count();
        if count > 0 {
            println!(
                "  {} {}: {}",
                kind_marker(kind),
                kind.display_name(),
                count
            );
        }
    }
    if defects.is_empty() {
        return;
    }
    println!("\n{}", "Defects:".bold());
    for defect in defects.iter().take(limit) {
        println!("  {} {}", kind_marker(defect.kind()), defect);
    }
    if defects.len() > limit {
        println!("  ... and {} more", defects.len() - limit);
    }
}
