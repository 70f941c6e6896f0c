//! Subcommand implementations. Each `run` returns whether the model is clean.

pub mod fix;
pub mod info;
pub mod inspect;
pub mod kinds;

use std::path::Path;

use anyhow::{Context, Result};
use solid_inspector::InspectParams;

use crate::InspectArgs;

/// Resolve inspection parameters: config file first, then flags.
pub fn inspect_params(args: &InspectArgs) -> Result<InspectParams> {
    let mut params = match &args.config {
        Some(path) => load_config(path)?,
        None => InspectParams::default(),
    };
    if args.short_edges {
        params.detect_short_edges = true;
    }
    if let Some(threshold) = args.threshold {
        params = params.with_short_edges(threshold);
    }
    if args.nested {
        params.search_nested_instances = true;
    }
    Ok(params)
}

fn load_config(path: &Path) -> Result<InspectParams> {
    InspectParams::from_toml_file(path)
        .with_context(|| format!("Failed to load inspection settings from {:?}", path))
}
