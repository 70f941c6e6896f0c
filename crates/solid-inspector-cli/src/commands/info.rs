//! solid-inspector info command - display model topology statistics.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use solid_inspector::{InspectParams, MeshGraph, Transform3, inspect, load_obj, partition};

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct ModelInfo {
    path: String,
    vertices: usize,
    edges: usize,
    faces: usize,
    groups: usize,
    stray_edges: usize,
    border_edges: usize,
    hole_edges: usize,
    non_manifold_edges: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
    group_sizes: Vec<usize>,
}

#[derive(Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
    dimensions: [f64; 3],
}

pub fn run(input: &Path, cli: &Cli) -> Result<bool> {
    let entities =
        load_obj(input).with_context(|| format!("Failed to load model from {:?}", input))?;
    let mesh = &entities.mesh;

    let report = inspect(&entities, &Transform3::identity(), &InspectParams::default())
        .with_context(|| format!("Failed to inspect {:?}", input))?;
    let stats = report.stats;

    let graph = MeshGraph::build(mesh);
    let group_sizes: Vec<usize> = partition(&graph).map(|g| g.faces.len()).collect();

    let bounds = mesh.bounds().map(|(min, max)| {
        let dims = max - min;
        BoundsInfo {
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
            dimensions: [dims.x, dims.y, dims.z],
        }
    });

    let info = ModelInfo {
        path: input.display().to_string(),
        vertices: stats.vertices,
        edges: stats.edges,
        faces: stats.faces,
        groups: stats.groups,
        stray_edges: stats.stray_edges,
        border_edges: stats.border_edges,
        hole_edges: stats.hole_edges,
        non_manifold_edges: stats.non_manifold_edges,
        bounds,
        group_sizes,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Model Information".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}", "Vertices".cyan(), info.vertices);
                println!("  {}: {}", "Edges".cyan(), info.edges);
                println!("  {}: {}", "Faces".cyan(), info.faces);
                println!("  {}: {}", "Geometry groups".cyan(), info.groups);

                if let Some(ref b) = info.bounds {
                    println!(
                        "  {}: {:.2} x {:.2} x {:.2} mm",
                        "Dimensions".cyan(),
                        b.dimensions[0],
                        b.dimensions[1],
                        b.dimensions[2]
                    );
                }

                println!("\n{}", "Edge usage:".bold());
                println!("  {}: {}", "No faces".cyan(), info.stray_edges);
                println!("  {}: {}", "One face (border)".cyan(), info.border_edges);
                println!("  {}: {}", "One face (hole)".cyan(), info.hole_edges);
                println!("  {}: {}", "Three or more".cyan(), info.non_manifold_edges);

                if info.group_sizes.len() > 1 {
                    println!("\n{}", "Faces per group:".bold());
                    for (i, size) in info.group_sizes.iter().enumerate() {
                        println!("  #{}: {}", i, size);
                    }
                }
            }
        }
    }

    Ok(true)
}
