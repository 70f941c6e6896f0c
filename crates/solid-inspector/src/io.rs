//! Polygon OBJ loading and saving.
//!
//! Faces are kept as polygons, not triangulated, so each OBJ face becomes
//! one face with an outer loop. Edges are shared between faces that use the
//! same vertex pair.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::adjacency::MeshGraph;
use crate::error::{InspectError, InspectResult};
use crate::tracing_ext::OperationTimer;
use crate::types::{Entities, Mesh, VertexId};

/// Load a polygon OBJ file. All objects and groups are merged into one mesh.
///
/// Vertices are numbered in the order faces first use them, and vertices no
/// face uses are dropped. Handles therefore do not survive a save and load;
/// positions and winding do.
pub fn load_obj(path: impl AsRef<Path>) -> InspectResult<Entities> {
    let path = path.as_ref();
    let _timer = OperationTimer::new("load_obj");
    info!("Loading mesh from {:?} (OBJ format)", path);

    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: false,
            single_index: false,
            ..Default::default()
        },
    )
    .map_err(|e| match e {
        tobj::LoadError::OpenFileFailed => InspectError::IoRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
        },
        other => InspectError::parse_error(path, other.to_string()),
    })?;

    let mut mesh = Mesh::new();
    let mut skipped = 0usize;
    for model in &models {
        let obj = &model.mesh;
        debug!(
            "OBJ model '{}': {} positions, {} faces",
            model.name,
            obj.positions.len() / 3,
            obj.face_arities.len().max(obj.indices.len() / 3)
        );

        let offset = mesh.vertex_count() as u32;
        for chunk in obj.positions.chunks_exact(3) {
            mesh.add_vertex(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        }

        let arities: Vec<usize> = if obj.face_arities.is_empty() {
            vec![3; obj.indices.len() / 3]
        } else {
            obj.face_arities.iter().map(|&n| n as usize).collect()
        };
        let mut start = 0usize;
        for arity in arities {
            let Some(indices) = obj.indices.get(start..start + arity) else {
                return Err(InspectError::parse_error(
                    path,
                    format!("face at index {} runs past the index buffer", start),
                ));
            };
            start += arity;
            let polygon: Vec<VertexId> = indices.iter().map(|&i| VertexId(i + offset)).collect();
            if let Err(e) = mesh.add_face(&polygon) {
                warn!("Skipping malformed OBJ face in '{}': {}", model.name, e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} malformed face(s) in {:?}", skipped, path);
    }
    info!(
        "Loaded {} vertices, {} edges, {} faces",
        mesh.vertex_count(),
        mesh.edge_count(),
        mesh.face_count()
    );
    Ok(Entities::from_mesh(mesh))
}

/// Save a mesh as polygon OBJ.
///
/// Hole loops and stray edges have no OBJ counterpart and are dropped with
/// a warning. Every vertex is written in handle order, used or not.
pub fn save_obj(mesh: &Mesh, path: impl AsRef<Path>) -> InspectResult<()> {
    let path = path.as_ref();
    info!("Saving mesh to {:?} (OBJ format)", path);
    let io_err = |e: std::io::Error| InspectError::IoWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut w = BufWriter::new(file);
    writeln!(w, "# OBJ file exported by solid-inspector").map_err(io_err)?;
    writeln!(w, "# Vertices: {}", mesh.vertex_count()).map_err(io_err)?;
    writeln!(w, "# Faces: {}", mesh.face_count()).map_err(io_err)?;
    writeln!(w).map_err(io_err)?;

    for (_, v) in mesh.vertices() {
        let p = v.position;
        writeln!(w, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z).map_err(io_err)?;
    }

    let mut dropped_holes = 0usize;
    for (_, face) in mesh.faces() {
        dropped_holes += face.holes.len();
        let indices: Vec<String> = mesh
            .loop_vertices(&face.outer)
            .iter()
            .map(|v| (v.0 + 1).to_string())
            .collect();
        writeln!(w, "f {}", indices.join(" ")).map_err(io_err)?;
    }
    w.flush().map_err(io_err)?;

    if dropped_holes > 0 {
        warn!("{} hole loop(s) cannot be written to OBJ and were dropped", dropped_holes);
    }
    let stray = MeshGraph::build(mesh).stray_edges().len();
    if stray > 0 {
        warn!("{} stray edge(s) cannot be written to OBJ and were dropped", stray);
    }
    Ok(())
}
