//! Input validation for entity collections.
//!
//! Inspection assumes every reference in the mesh resolves. Meshes built
//! through [`Mesh::add_face`] always do; meshes assembled with
//! [`Mesh::from_parts`] or coming from a host should go through
//! [`validate_mesh_data_strict`] first, which [`crate::inspect`] does.

use tracing::{debug, warn};

use crate::error::{InspectError, InspectResult};
use crate::types::{EdgeId, FaceId, Loop, Mesh, VertexId};

/// One problem found in mesh data.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// A vertex coordinate is NaN or infinite.
    NonFiniteCoordinate {
        vertex: VertexId,
        coordinate: &'static str,
        value: f64,
    },
    /// An edge references a missing vertex.
    DanglingVertex { edge: EdgeId, vertex: VertexId },
    /// An edge starts and ends at the same vertex.
    CollapsedEdge { edge: EdgeId },
    /// A loop references an erased or missing edge.
    DanglingEdge { face: FaceId, edge: EdgeId },
    /// A loop has fewer than three edges.
    ShortLoop { face: FaceId, len: usize },
    /// Consecutive edge uses of a loop do not meet.
    OpenLoop { face: FaceId, edge: EdgeId },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::NonFiniteCoordinate {
                vertex,
                coordinate,
                value,
            } => write!(f, "vertex {} has {} = {}", vertex, coordinate, value),
            ValidationIssue::DanglingVertex { edge, vertex } => {
                write!(f, "edge {} references missing vertex {}", edge, vertex)
            }
            ValidationIssue::CollapsedEdge { edge } => {
                write!(f, "edge {} starts and ends at the same vertex", edge)
            }
            ValidationIssue::DanglingEdge { face, edge } => {
                write!(f, "face {} references missing edge {}", face, edge)
            }
            ValidationIssue::ShortLoop { face, len } => {
                write!(f, "face {} has a loop of only {} edges", face, len)
            }
            ValidationIssue::OpenLoop { face, edge } => {
                write!(f, "loop of face {} is not closed at edge {}", face, edge)
            }
        }
    }
}

/// Options for [`validate_mesh_data`].
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Stop at the first issue with an error (default: true).
    pub reject_on_invalid: bool,
    /// Maximum number of issues to collect (default: 100).
    pub max_issues: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            reject_on_invalid: true,
            max_issues: 100,
        }
    }
}

impl ValidationOptions {
    /// Collect issues without rejecting.
    pub fn collect_all() -> Self {
        Self {
            reject_on_invalid: false,
            max_issues: 1000,
        }
    }
}

/// Issues found by [`validate_mesh_data`].
#[derive(Debug, Clone, Default)]
pub struct DataValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl DataValidationResult {
    /// Whether no issue was found.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

impl std::fmt::Display for DataValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            return write!(f, "Data validation passed: no issues found");
        }
        writeln!(f, "Data validation found {} issue(s):", self.issues.len())?;
        for issue in &self.issues {
            writeln!(f, "  - {}", issue)?;
        }
        Ok(())
    }
}

fn to_error(issue: &ValidationIssue) -> InspectError {
    match *issue {
        ValidationIssue::NonFiniteCoordinate {
            vertex,
            coordinate,
            value,
        } => InspectError::InvalidCoordinate {
            vertex_index: vertex.index(),
            coordinate,
            value,
        },
        _ => InspectError::invalid_entities(issue.to_string()),
    }
}

struct Collector<'o> {
    options: &'o ValidationOptions,
    issues: Vec<ValidationIssue>,
}

impl Collector<'_> {
    fn push(&mut self, issue: ValidationIssue) -> InspectResult<()> {
        if self.options.reject_on_invalid {
            return Err(to_error(&issue));
        }
        if self.issues.len() < self.options.max_issues {
            self.issues.push(issue);
        }
        Ok(())
    }
}

/// Check coordinates, edge endpoints and loop structure.
///
/// # Example
/// ```
/// use solid_inspector::Mesh;
/// use solid_inspector::validate::{validate_mesh_data, ValidationOptions};
///
/// let mesh = Mesh::new();
/// let result = validate_mesh_data(&mesh, &ValidationOptions::default()).unwrap();
/// assert!(result.is_valid());
/// ```
pub fn validate_mesh_data(
    mesh: &Mesh,
    options: &ValidationOptions,
) -> InspectResult<DataValidationResult> {
    let mut c = Collector {
        options,
        issues: Vec::new(),
    };

    for (id, vertex) in mesh.vertices() {
        let p = vertex.position;
        for (coordinate, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
            if !value.is_finite() {
                c.push(ValidationIssue::NonFiniteCoordinate {
                    vertex: id,
                    coordinate,
                    value,
                })?;
            }
        }
    }

    for (id, edge) in mesh.edges() {
        for v in [edge.start, edge.end] {
            if mesh.vertex(v).is_none() {
                c.push(ValidationIssue::DanglingVertex { edge: id, vertex: v })?;
            }
        }
        if edge.start == edge.end {
            c.push(ValidationIssue::CollapsedEdge { edge: id })?;
        }
    }

    for (id, face) in mesh.faces() {
        for lp in face.loops() {
            check_loop(mesh, id, lp, &mut c)?;
        }
    }

    if c.issues.is_empty() {
        debug!("Mesh data validation passed");
    } else {
        warn!("Mesh data validation found {} issue(s)", c.issues.len());
    }
    Ok(DataValidationResult { issues: c.issues })
}

fn check_loop(mesh: &Mesh, face: FaceId, lp: &Loop, c: &mut Collector<'_>) -> InspectResult<()> {
    if lp.edges.len() < 3 {
        c.push(ValidationIssue::ShortLoop {
            face,
            len: lp.edges.len(),
        })?;
    }
    let mut ends = Vec::with_capacity(lp.edges.len());
    for u in &lp.edges {
        match mesh.edge(u.edge) {
            Some(e) => ends.push(if u.reversed {
                (e.end, e.start)
            } else {
                (e.start, e.end)
            }),
            None => {
                c.push(ValidationIssue::DanglingEdge { face, edge: u.edge })?;
                return Ok(());
            }
        }
    }
    for i in 0..ends.len() {
        let next = ends[(i + 1) % ends.len()];
        if ends[i].1 != next.0 {
            c.push(ValidationIssue::OpenLoop {
                face,
                edge: lp.edges[i].edge,
            })?;
        }
    }
    Ok(())
}

/// Validate and fail on the first issue.
pub fn validate_mesh_data_strict(mesh: &Mesh) -> InspectResult<()> {
    validate_mesh_data(mesh, &ValidationOptions::default())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::{Edge, EdgeUse, Face, Vertex};

    fn triangle_parts() -> (Vec<Vertex>, Vec<Edge>) {
        let vertices = vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 0.0, 0.0),
            Vertex::from_coords(0.0, 1.0, 0.0),
        ];
        let edges = vec![
            Edge { start: VertexId(0), end: VertexId(1) },
            Edge { start: VertexId(1), end: VertexId(2) },
            Edge { start: VertexId(2), end: VertexId(0) },
        ];
        (vertices, edges)
    }

    fn forward(ids: &[u32]) -> Loop {
        Loop {
            edges: ids
                .iter()
                .map(|&i| EdgeUse { edge: EdgeId(i), reversed: false })
                .collect(),
        }
    }

    #[test]
    fn test_valid_triangle() {
        let (vertices, edges) = triangle_parts();
        let mesh = Mesh::from_parts(vertices, edges, vec![Face::new(forward(&[0, 1, 2]), vec![])]);
        assert!(validate_mesh_data_strict(&mesh).is_ok());
    }

    #[test]
    fn test_nan_coordinate_rejected() {
        let (mut vertices, edges) = triangle_parts();
        vertices[1].position.y = f64::NAN;
        let mesh = Mesh::from_parts(vertices, edges, vec![]);
        let err = validate_mesh_data_strict(&mesh).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCoordinate);
    }

    #[test]
    fn test_dangling_references() {
        let (vertices, mut edges) = triangle_parts();
        edges.push(Edge { start: VertexId(0), end: VertexId(9) });
        let faces = vec![Face::new(forward(&[0, 1, 7]), vec![])];
        let mesh = Mesh::from_parts(vertices, edges, faces);

        let result = validate_mesh_data(&mesh, &ValidationOptions::collect_all()).unwrap();
        assert!(result.issues.contains(&ValidationIssue::DanglingVertex {
            edge: EdgeId(3),
            vertex: VertexId(9)
        }));
        assert!(result.issues.contains(&ValidationIssue::DanglingEdge {
            face: FaceId(0),
            edge: EdgeId(7)
        }));

        let err = validate_mesh_data_strict(&mesh).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidEntities);
    }

    #[test]
    fn test_short_and_open_loops() {
        let (vertices, edges) = triangle_parts();
        let faces = vec![
            Face::new(forward(&[0, 1]), vec![]),
            Face::new(forward(&[0, 2, 1]), vec![]),
        ];
        let mesh = Mesh::from_parts(vertices, edges, faces);
        let result = validate_mesh_data(&mesh, &ValidationOptions::collect_all()).unwrap();
        assert!(result.issues.iter().any(|i| matches!(i, ValidationIssue::ShortLoop { .. })));
        assert!(result.issues.iter().any(|i| matches!(
            i,
            ValidationIssue::OpenLoop { face: FaceId(1), .. }
        )));
    }
}
