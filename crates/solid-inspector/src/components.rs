//! Geometry partitioning.
//!
//! A geometry group is a maximal set of edges and faces reachable from one
//! another through shared edges or vertices. The partitioner yields groups
//! lazily, one flood fill per group.

use hashbrown::HashMap;
use tracing::debug;

use crate::adjacency::MeshGraph;
use crate::types::{EdgeId, FaceId, VertexId};

/// One connected component of a mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryGroup {
    /// Edges of the group, sorted by handle.
    pub edges: Vec<EdgeId>,
    /// Faces of the group, sorted by handle.
    pub faces: Vec<FaceId>,
}

impl GeometryGroup {
    /// Whether the group has neither edges nor faces.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.faces.is_empty()
    }
}

impl std::fmt::Display for GeometryGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "group of {} edges, {} faces",
            self.edges.len(),
            self.faces.len()
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Primitive {
    Edge(EdgeId),
    Face(FaceId),
}

/// Lazy iterator over the geometry groups of a mesh.
///
/// Seeds are taken from unvisited edges in handle order, then from unvisited
/// faces.
#[derive(Debug)]
pub struct GeometryGroups<'g> {
    graph: &'g MeshGraph<'g>,
    edges: Vec<EdgeId>,
    faces: Vec<FaceId>,
    edge_seen: Vec<bool>,
    face_seen: Vec<bool>,
    next_edge: usize,
    next_face: usize,
}

/// Partition the mesh behind `graph` into geometry groups.
///
/// # Example
/// ```
/// use solid_inspector::{Mesh, MeshGraph};
/// use solid_inspector::components::partition;
///
/// let mut mesh = Mesh::new();
/// let a = mesh.add_vertex(0.0, 0.0, 0.0);
/// let b = mesh.add_vertex(1.0, 0.0, 0.0);
/// let c = mesh.add_vertex(0.0, 1.0, 0.0);
/// mesh.add_face(&[a, b, c]).unwrap();
///
/// let graph = MeshGraph::build(&mesh);
/// assert_eq!(partition(&graph).count(), 1);
/// ```
pub fn partition<'g>(graph: &'g MeshGraph<'g>) -> GeometryGroups<'g> {
    let mesh = graph.mesh();
    GeometryGroups {
        graph,
        edges: graph.edges().collect(),
        faces: graph.faces().collect(),
        edge_seen: vec![false; mesh.edge_capacity()],
        face_seen: vec![false; mesh.face_capacity()],
        next_edge: 0,
        next_face: 0,
    }
}

impl GeometryGroups<'_> {
    fn next_seed(&mut self) -> Option<Primitive> {
        while let Some(&e) = self.edges.get(self.next_edge) {
            self.next_edge += 1;
            if !self.edge_seen[e.index()] {
                return Some(Primitive::Edge(e));
            }
        }
        while let Some(&f) = self.faces.get(self.next_face) {
            self.next_face += 1;
            if !self.face_seen[f.index()] {
                return Some(Primitive::Face(f));
            }
        }
        None
    }

    fn mark(&mut self, p: Primitive) -> bool {
        let seen = match p {
            Primitive::Edge(e) => &mut self.edge_seen[e.index()],
            Primitive::Face(f) => &mut self.face_seen[f.index()],
        };
        !std::mem::replace(seen, true)
    }
}

impl Iterator for GeometryGroups<'_> {
    type Item = GeometryGroup;

    fn next(&mut self) -> Option<GeometryGroup> {
        let seed = self.next_seed()?;
        let graph = self.graph;
        let mut group = GeometryGroup::default();
        let mut stack = vec![seed];
        self.mark(seed);

        while let Some(p) = stack.pop() {
            match p {
                Primitive::Edge(e) => {
                    group.edges.push(e);
                    for &f in graph.edge_faces(e) {
                        if self.mark(Primitive::Face(f)) {
                            stack.push(Primitive::Face(f));
                        }
                    }
                    if let Some((a, b)) = graph.endpoints(e) {
                        for v in [a, b] {
                            for &n in graph.vertex_edges(v) {
                                if self.mark(Primitive::Edge(n)) {
                                    stack.push(Primitive::Edge(n));
                                }
                            }
                        }
                    }
                }
                Primitive::Face(f) => {
                    group.faces.push(f);
                    for edge_use in graph.face_edges(f) {
                        let n = Primitive::Edge(edge_use.edge);
                        if self.mark(n) {
                            stack.push(n);
                        }
                    }
                }
            }
        }

        group.edges.sort_unstable();
        group.faces.sort_unstable();
        debug!("Found {}", group);
        Some(group)
    }
}

/// Split `edges` into chains connected through shared endpoint vertices.
///
/// Only the listed edges take part; chains come out in order of their
/// smallest member and list their edges in handle order.
pub fn group_connected_edges(graph: &MeshGraph<'_>, edges: &[EdgeId]) -> Vec<Vec<EdgeId>> {
    let mut sorted = edges.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut by_vertex: HashMap<VertexId, Vec<usize>> = HashMap::new();
    for (i, &e) in sorted.iter().enumerate() {
        if let Some((a, b)) = graph.endpoints(e) {
            by_vertex.entry(a).or_default().push(i);
            by_vertex.entry(b).or_default().push(i);
        }
    }

    let mut seen = vec![false; sorted.len()];
    let mut chains = Vec::new();
    for start in 0..sorted.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut chain = Vec::new();
        let mut stack = vec![start];
        while let Some(i) = stack.pop() {
            chain.push(sorted[i]);
            let Some((a, b)) = graph.endpoints(sorted[i]) else {
                continue;
            };
            for v in [a, b] {
                for &j in by_vertex.get(&v).map(Vec::as_slice).unwrap_or(&[]) {
                    if !seen[j] {
                        seen[j] = true;
                        stack.push(j);
                    }
                }
            }
        }
        chain.sort_unstable();
        chains.push(chain);
    }
    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mesh;

    fn triangle_at(mesh: &mut Mesh, x: f64) {
        let a = mesh.add_vertex(x, 0.0, 0.0);
        let b = mesh.add_vertex(x + 1.0, 0.0, 0.0);
        let c = mesh.add_vertex(x, 1.0, 0.0);
        mesh.add_face(&[a, b, c]).unwrap();
    }

    #[test]
    fn test_empty_mesh_has_no_groups() {
        let mesh = Mesh::new();
        let graph = MeshGraph::build(&mesh);
        assert_eq!(partition(&graph).count(), 0);
    }

    #[test]
    fn test_disjoint_triangles() {
        let mut mesh = Mesh::new();
        triangle_at(&mut mesh, 0.0);
        triangle_at(&mut mesh, 10.0);
        let graph = MeshGraph::build(&mesh);

        let groups: Vec<_> = partition(&graph).collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].faces, vec![FaceId(0)]);
        assert_eq!(groups[1].faces, vec![FaceId(1)]);
        assert_eq!(groups[0].edges.len(), 3);
    }

    #[test]
    fn test_stray_edge_joins_through_vertex() {
        let mut mesh = Mesh::new();
        triangle_at(&mut mesh, 0.0);
        let far = mesh.add_vertex(5.0, 5.0, 5.0);
        mesh.add_edge(VertexId(0), far).unwrap();
        let lone_a = mesh.add_vertex(20.0, 0.0, 0.0);
        let lone_b = mesh.add_vertex(21.0, 0.0, 0.0);
        mesh.add_edge(lone_a, lone_b).unwrap();

        let graph = MeshGraph::build(&mesh);
        let groups: Vec<_> = partition(&graph).collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].edges.len(), 4);
        assert_eq!(groups[1].edges.len(), 1);
        assert!(groups[1].faces.is_empty());
    }

    #[test]
    fn test_group_connected_edges() {
        let mut mesh = Mesh::new();
        triangle_at(&mut mesh, 0.0);
        triangle_at(&mut mesh, 10.0);
        let graph = MeshGraph::build(&mesh);

        let all: Vec<EdgeId> = graph.edges().collect();
        let chains = group_connected_edges(&graph, &all);
        assert_eq!(chains.len(), 2);
        assert!(chains.iter().all(|c| c.len() == 3));

        let partial = group_connected_edges(&graph, &[EdgeId(0), EdgeId(4)]);
        assert_eq!(partial, vec![vec![EdgeId(0)], vec![EdgeId(4)]]);
    }
}
