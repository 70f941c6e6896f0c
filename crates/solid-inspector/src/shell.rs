//! Shell resolution.
//!
//! Grows the connected, consistently oriented surface of one geometry group
//! from a seed face. Where an edge carries more than two faces, the walk
//! turns onto the face that hugs the current face most tightly on its back
//! side, which keeps the walk on the outer skin and away from internal
//! partitions.
//!
//! The resolver never mutates the mesh. Orientation changes are tracked in
//! [`Shell::flipped`].

use hashbrown::HashSet;
use nalgebra::Vector3;
use tracing::{debug, trace};

use crate::adjacency::MeshGraph;
use crate::components::GeometryGroup;
use crate::error::{InspectError, InspectResult};
use crate::geometry;
use crate::types::{EdgeId, FaceId, VertexId};

/// Faces of one resolved shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shell {
    /// Faces on the shell.
    pub faces: HashSet<FaceId>,
    /// Faces whose winding had to be flipped to agree with the seed.
    pub flipped: HashSet<FaceId>,
}

impl Shell {
    /// Number of faces on the shell.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Whether the shell is empty.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Resolve the shell of `group`.
///
/// With `outward` set the seed face is oriented to point up (away from the
/// solid, since it sits at the topmost vertex); otherwise it points down.
/// Faces in `excluded` are treated as if they did not exist.
pub fn resolve_shell(
    graph: &MeshGraph<'_>,
    group: &GeometryGroup,
    outward: bool,
    excluded: &HashSet<FaceId>,
) -> InspectResult<Shell> {
    let mut resolver = ShellResolver {
        graph,
        excluded,
        flipped: HashSet::new(),
    };
    let Some(seed) = resolver.find_seed(group, outward)? else {
        return Ok(Shell::default());
    };
    let faces = resolver.grow(seed)?;
    debug!(
        outward,
        seed = %seed,
        faces = faces.len(),
        flipped = resolver.flipped.len(),
        "Resolved shell"
    );
    Ok(Shell {
        faces,
        flipped: resolver.flipped,
    })
}

struct ShellResolver<'r, 'a> {
    graph: &'r MeshGraph<'a>,
    excluded: &'r HashSet<FaceId>,
    flipped: HashSet<FaceId>,
}

impl ShellResolver<'_, '_> {
    fn present_faces(&self, edge: EdgeId) -> Vec<FaceId> {
        self.graph
            .edge_faces(edge)
            .iter()
            .copied()
            .filter(|f| !self.excluded.contains(f))
            .collect()
    }

    fn has_present_faces(&self, edge: EdgeId) -> bool {
        self.graph
            .edge_faces(edge)
            .iter()
            .any(|f| !self.excluded.contains(f))
    }

    fn flip(&mut self, face: FaceId) {
        if !self.flipped.remove(&face) {
            self.flipped.insert(face);
        }
    }

    /// Face normal with recorded flips applied.
    fn face_normal(&self, face: FaceId) -> InspectResult<Vector3<f64>> {
        let n = self.graph.face_normal(face).ok_or_else(|| {
            InspectError::degenerate_face(face, "face normal is undefined (zero area)")
        })?;
        Ok(if self.flipped.contains(&face) { -n } else { n })
    }

    /// Whether `face` walks `edge` from end to start, with flips applied.
    fn reversed_in(&self, edge: EdgeId, face: FaceId) -> InspectResult<bool> {
        let reversed = self.graph.edge_reversed_in(edge, face).ok_or_else(|| {
            InspectError::invalid_entities(format!("face {} does not use edge {}", face, edge))
        })?;
        Ok(reversed != self.flipped.contains(&face))
    }

    /// Edge direction as walked by `face`.
    fn edge_direction(&self, edge: EdgeId, face: FaceId) -> InspectResult<Vector3<f64>> {
        let v = self
            .graph
            .edge_vector(edge)
            .ok_or_else(|| InspectError::degenerate_edge(edge, "edge has no geometry"))?;
        Ok(if self.reversed_in(edge, face)? { -v } else { v })
    }

    fn find_seed(&mut self, group: &GeometryGroup, outward: bool) -> InspectResult<Option<FaceId>> {
        let mut vertices: Vec<VertexId> = Vec::new();
        let mut listed: HashSet<VertexId> = HashSet::new();
        for &e in &group.edges {
            if !self.has_present_faces(e) {
                continue;
            }
            if let Some((a, b)) = self.graph.endpoints(e) {
                for v in [a, b] {
                    if listed.insert(v) {
                        vertices.push(v);
                    }
                }
            }
        }

        let mut top: Option<(VertexId, f64)> = None;
        for v in vertices {
            let z = self.graph.position(v).map_or(f64::NEG_INFINITY, |p| p.z);
            if top.is_none_or(|(_, best)| z > best) {
                top = Some((v, z));
            }
        }
        let Some((vertex, _)) = top else {
            return Ok(None);
        };

        // Flattest edge: largest angle to the Z axis.
        let mut flattest: Option<(EdgeId, f64)> = None;
        for &e in self.graph.vertex_edges(vertex) {
            if !self.has_present_faces(e) {
                continue;
            }
            let direction = self.graph.edge_vector(e).unwrap_or_else(Vector3::zeros);
            let tilt = geometry::z_alignment(&direction).ok_or_else(|| {
                InspectError::degenerate_edge(e, "zero-length edge at seed vertex")
            })?;
            if flattest.is_none_or(|(_, best)| tilt > best) {
                flattest = Some((e, tilt));
            }
        }
        let Some((edge, _)) = flattest else {
            return Ok(None);
        };

        let mut steepest: Option<(FaceId, f64)> = None;
        for f in self.present_faces(edge) {
            let nz = self.face_normal(f)?.z;
            if steepest.is_none_or(|(_, best)| nz.abs() > best.abs()) {
                steepest = Some((f, nz));
            }
        }
        let Some((seed, nz)) = steepest else {
            return Ok(None);
        };

        if nz == 0.0 {
            debug!(seed = %seed, "Seed face is vertical, keeping stored winding");
        } else if (outward && nz < 0.0) || (!outward && nz > 0.0) {
            self.flip(seed);
        }
        trace!(vertex = %vertex, edge = %edge, seed = %seed, "Selected seed");
        Ok(Some(seed))
    }

    fn grow(&mut self, seed: FaceId) -> InspectResult<HashSet<FaceId>> {
        let mut shell = HashSet::new();
        let mut seen = HashSet::new();
        let mut processed: HashSet<EdgeId> = HashSet::new();
        let mut stack = vec![seed];
        seen.insert(seed);

        while let Some(face) = stack.pop() {
            shell.insert(face);
            for edge_use in self.graph.face_edges(face) {
                let edge = edge_use.edge;
                if processed.contains(&edge) {
                    continue;
                }
                let candidates = self.present_faces(edge);
                if candidates.len() < 2 {
                    continue;
                }
                processed.insert(edge);
                let Some(next) = self.next_shell_face(edge, face, &candidates, &seen)? else {
                    continue;
                };
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        Ok(shell)
    }

    /// Pick the face that continues the shell across `edge` from `face`, and
    /// orient it if it has not been reached before.
    fn next_shell_face(
        &mut self,
        edge: EdgeId,
        face: FaceId,
        candidates: &[FaceId],
        seen: &HashSet<FaceId>,
    ) -> InspectResult<Option<FaceId>> {
        let current_reversed = self.reversed_in(edge, face)?;

        let winner = if candidates.len() == 2 {
            candidates.iter().copied().find(|&f| f != face)
        } else {
            let direction = self.edge_direction(edge, face)?;
            let normal = self.face_normal(face)?;
            let reference = normal.cross(&direction);

            let mut best: Option<(FaceId, f64)> = None;
            for &candidate in candidates.iter().filter(|&&f| f != face) {
                let mut candidate_normal = self.face_normal(candidate)?;
                // Orient as if it continued the current face's winding.
                if self.reversed_in(edge, candidate)? == current_reversed {
                    candidate_normal = -candidate_normal;
                }
                let target = direction.cross(&candidate_normal);
                let angle = geometry::wrapped_angle(&reference, &target, &normal)
                    .ok_or_else(|| {
                        InspectError::DegenerateGeometry {
                            details: format!(
                                "cannot order faces {} and {} around the edge",
                                face, candidate
                            ),
                            edge: Some(edge),
                            face: Some(candidate),
                        }
                    })?;
                trace!(edge = %edge, candidate = %candidate, angle, "Tie-break candidate");
                if best.is_none_or(|(_, a)| angle < a) {
                    best = Some((candidate, angle));
                }
            }
            best.map(|(f, _)| f)
        };

        if let Some(next) = winner
            && !seen.contains(&next)
            && self.reversed_in(edge, next)? == current_reversed
        {
            self.flip(next);
        }
        Ok(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::partition;
    use crate::types::Mesh;

    /// Axis-aligned box with outward winding.
    fn cube(mesh: &mut Mesh, size: f64) -> [VertexId; 8] {
        let v = [
            mesh.add_vertex(0.0, 0.0, 0.0),
            mesh.add_vertex(size, 0.0, 0.0),
            mesh.add_vertex(size, size, 0.0),
            mesh.add_vertex(0.0, size, 0.0),
            mesh.add_vertex(0.0, 0.0, size),
            mesh.add_vertex(size, 0.0, size),
            mesh.add_vertex(size, size, size),
            mesh.add_vertex(0.0, size, size),
        ];
        for quad in [
            [v[0], v[3], v[2], v[1]],
            [v[4], v[5], v[6], v[7]],
            [v[0], v[1], v[5], v[4]],
            [v[1], v[2], v[6], v[5]],
            [v[2], v[3], v[7], v[6]],
            [v[3], v[0], v[4], v[7]],
        ] {
            mesh.add_face(&quad).unwrap();
        }
        v
    }

    fn resolve_all(mesh: &Mesh, outward: bool) -> Shell {
        let graph = MeshGraph::build(mesh);
        let group = partition(&graph).next().unwrap();
        resolve_shell(&graph, &group, outward, &HashSet::new()).unwrap()
    }

    #[test]
    fn test_cube_outward_needs_no_flips() {
        let mut mesh = Mesh::new();
        cube(&mut mesh, 10.0);
        let shell = resolve_all(&mesh, true);
        assert_eq!(shell.len(), 6);
        assert!(shell.flipped.is_empty());
    }

    #[test]
    fn test_cube_inward_flips_everything() {
        let mut mesh = Mesh::new();
        cube(&mut mesh, 10.0);
        let shell = resolve_all(&mesh, false);
        assert_eq!(shell.len(), 6);
        assert_eq!(shell.flipped.len(), 6);
    }

    #[test]
    fn test_reversed_face_is_flipped() {
        let mut mesh = Mesh::new();
        cube(&mut mesh, 10.0);
        mesh.reverse_face(FaceId(3));
        let shell = resolve_all(&mesh, true);
        assert_eq!(shell.len(), 6);
        assert_eq!(shell.flipped.iter().copied().collect::<Vec<_>>(), vec![FaceId(3)]);
    }

    /// Add a quad wound so its normal points along `outward`.
    fn oriented_quad(mesh: &mut Mesh, mut quad: [VertexId; 4], outward: Vector3<f64>) -> FaceId {
        let points: Vec<_> = quad.iter().map(|&v| mesh.vertex(v).unwrap().position).collect();
        if geometry::newell_normal(&points).dot(&outward) < 0.0 {
            quad.reverse();
        }
        mesh.add_face(&quad).unwrap()
    }

    /// Two unit cells side by side along X sharing the wall at x = 1.
    fn twin_cells(mesh: &mut Mesh) -> FaceId {
        let mut v = Vec::new();
        for i in 0..3 {
            for j in 0..2 {
                for k in 0..2 {
                    v.push(mesh.add_vertex(i as f64, j as f64, k as f64));
                }
            }
        }
        let at = |i: usize, j: usize, k: usize| v[i * 4 + j * 2 + k];
        oriented_quad(mesh, [at(0, 0, 0), at(0, 1, 0), at(0, 1, 1), at(0, 0, 1)], -Vector3::x());
        oriented_quad(mesh, [at(2, 0, 0), at(2, 1, 0), at(2, 1, 1), at(2, 0, 1)], Vector3::x());
        for i in 0..2 {
            oriented_quad(mesh, [at(i, 0, 0), at(i + 1, 0, 0), at(i + 1, 1, 0), at(i, 1, 0)], -Vector3::z());
            oriented_quad(mesh, [at(i, 0, 1), at(i + 1, 0, 1), at(i + 1, 1, 1), at(i, 1, 1)], Vector3::z());
            oriented_quad(mesh, [at(i, 0, 0), at(i + 1, 0, 0), at(i + 1, 0, 1), at(i, 0, 1)], -Vector3::y());
            oriented_quad(mesh, [at(i, 1, 0), at(i + 1, 1, 0), at(i + 1, 1, 1), at(i, 1, 1)], Vector3::y());
        }
        oriented_quad(mesh, [at(1, 0, 0), at(1, 1, 0), at(1, 1, 1), at(1, 0, 1)], Vector3::x())
    }

    #[test]
    fn test_internal_wall_is_skipped() {
        let mut mesh = Mesh::new();
        let wall = twin_cells(&mut mesh);
        let shell = resolve_all(&mesh, true);
        assert_eq!(shell.len(), 10);
        assert!(!shell.faces.contains(&wall));
        assert!(shell.flipped.is_empty());
    }

    #[test]
    fn test_excluded_faces_are_absent() {
        let mut mesh = Mesh::new();
        cube(&mut mesh, 10.0);
        let graph = MeshGraph::build(&mesh);
        let group = partition(&graph).next().unwrap();
        let excluded: HashSet<FaceId> = group.faces.iter().copied().collect();
        let shell = resolve_shell(&graph, &group, true, &excluded).unwrap();
        assert!(shell.is_empty());
    }

    /// Quad strip around a circle with a half twist, so no consistent
    /// winding exists.
    fn mobius_strip(mesh: &mut Mesh, segments: usize) {
        let (radius, half_width) = (10.0, 2.0);
        let point = |t: f64, s: f64| {
            let r = radius + s * (t / 2.0).cos();
            (r * t.cos(), r * t.sin(), s * (t / 2.0).sin())
        };
        let mut lo = Vec::new();
        let mut hi = Vec::new();
        for i in 0..segments {
            let t = std::f64::consts::TAU * i as f64 / segments as f64;
            let (x, y, z) = point(t, -half_width);
            lo.push(mesh.add_vertex(x, y, z));
            let (x, y, z) = point(t, half_width);
            hi.push(mesh.add_vertex(x, y, z));
        }
        // The twist swaps the two sides where the strip closes.
        lo.push(hi[0]);
        hi.push(lo[0]);
        for i in 0..segments {
            mesh.add_face(&[lo[i], lo[i + 1], hi[i + 1], hi[i]]).unwrap();
        }
    }

    /// Whether `a` and `b` walk `edge` in opposite directions once the
    /// shell's flips are applied.
    fn agrees(graph: &MeshGraph<'_>, shell: &Shell, edge: EdgeId, a: FaceId, b: FaceId) -> bool {
        let walks_back =
            |f: FaceId| graph.edge_reversed_in(edge, f).unwrap() != shell.flipped.contains(&f);
        walks_back(a) != walks_back(b)
    }

    #[test]
    fn test_seen_faces_keep_their_orientation() {
        let mut mesh = Mesh::new();
        mobius_strip(&mut mesh, 8);
        let graph = MeshGraph::build(&mesh);
        let group = partition(&graph).next().unwrap();
        let excluded = HashSet::new();
        let shell = resolve_shell(&graph, &group, true, &excluded).unwrap();
        assert_eq!(shell.len(), 8);

        let mut seeding = ShellResolver {
            graph: &graph,
            excluded: &excluded,
            flipped: HashSet::new(),
        };
        let seed = seeding.find_seed(&group, true).unwrap().unwrap();
        assert_eq!(
            shell.flipped.contains(&seed),
            seeding.flipped.contains(&seed)
        );

        // The twist leaves exactly one seam. Both faces next to the seed
        // were oriented from it and keep that orientation when the walk
        // comes back around, so the seam lies away from the seed.
        let mut seams = 0;
        for edge in graph.edges() {
            let faces = graph.edge_faces(edge);
            if faces.len() != 2 {
                continue;
            }
            if !agrees(&graph, &shell, edge, faces[0], faces[1]) {
                seams += 1;
                assert!(!faces.contains(&seed));
            }
        }
        assert_eq!(seams, 1);
    }

    #[test]
    fn test_degenerate_seed_edge_fails() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(0.0, 0.0, 5.0);
        let b = mesh.add_vertex(0.0, 0.0, 5.0);
        let c = mesh.add_vertex(1.0, 0.0, 0.0);
        mesh.add_face(&[a, b, c]).unwrap();
        let graph = MeshGraph::build(&mesh);
        let group = partition(&graph).next().unwrap();
        let err = resolve_shell(&graph, &group, true, &HashSet::new()).unwrap_err();
        assert!(err.is_degenerate());
    }
}
