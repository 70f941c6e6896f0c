//! Read-only topology queries over a [`Mesh`].

use nalgebra::{Point3, Vector3};

use crate::geometry;
use crate::types::{EdgeId, EdgeUse, FaceId, Mesh, VertexId};

/// Precomputed adjacency for one mesh.
///
/// Built once per inspection. Face lists per edge are sorted by handle and
/// contain each face once, even when a face uses the edge in several loops.
#[derive(Debug)]
pub struct MeshGraph<'a> {
    mesh: &'a Mesh,
    edge_faces: Vec<Vec<FaceId>>,
    vertex_edges: Vec<Vec<EdgeId>>,
    normals: Vec<Option<Vector3<f64>>>,
}

impl<'a> MeshGraph<'a> {
    /// Build adjacency maps for `mesh`.
    pub fn build(mesh: &'a Mesh) -> Self {
        let mut edge_faces: Vec<Vec<FaceId>> = vec![Vec::new(); mesh.edge_capacity()];
        let mut vertex_edges: Vec<Vec<EdgeId>> = vec![Vec::new(); mesh.vertex_count()];
        let mut normals = vec![None; mesh.face_capacity()];

        for (id, edge) in mesh.edges() {
            for v in [edge.start, edge.end] {
                if let Some(list) = vertex_edges.get_mut(v.index()) {
                    list.push(id);
                }
            }
        }

        for (id, face) in mesh.faces() {
            for edge_use in face.edge_uses() {
                if let Some(list) = edge_faces.get_mut(edge_use.edge.index()) {
                    // Faces arrive in handle order, so only the tail can repeat.
                    if list.last() != Some(&id) {
                        list.push(id);
                    }
                }
            }
            normals[id.index()] = geometry::polygon_normal(&mesh.loop_positions(&face.outer));
        }

        Self {
            mesh,
            edge_faces,
            vertex_edges,
            normals,
        }
    }

    /// The underlying mesh.
    #[inline]
    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    /// Faces using `edge`, sorted by handle.
    #[inline]
    pub fn edge_faces(&self, edge: EdgeId) -> &[FaceId] {
        self.edge_faces
            .get(edge.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Edges meeting at `vertex`, sorted by handle.
    #[inline]
    pub fn vertex_edges(&self, vertex: VertexId) -> &[EdgeId] {
        self.vertex_edges
            .get(vertex.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Oriented edge uses of every loop of `face`.
    pub fn face_edges(&self, face: FaceId) -> Vec<EdgeUse> {
        self.mesh
            .face(face)
            .map(|f| f.edge_uses().collect())
            .unwrap_or_default()
    }

    /// Unit normal of `face` as wound, or `None` for a degenerate face.
    #[inline]
    pub fn face_normal(&self, face: FaceId) -> Option<Vector3<f64>> {
        self.normals.get(face.index()).copied().flatten()
    }

    /// Whether `face` walks `edge` from end to start. `None` when the face
    /// does not use the edge.
    pub fn edge_reversed_in(&self, edge: EdgeId, face: FaceId) -> Option<bool> {
        self.mesh
            .face(face)?
            .edge_uses()
            .find(|u| u.edge == edge)
            .map(|u| u.reversed)
    }

    /// Whether `edge` lies on the outer loop of `face`.
    pub fn is_outer_loop_edge(&self, edge: EdgeId, face: FaceId) -> bool {
        self.mesh
            .face(face)
            .is_some_and(|f| f.outer.contains(edge))
    }

    /// Endpoints of a live edge.
    #[inline]
    pub fn endpoints(&self, edge: EdgeId) -> Option<(VertexId, VertexId)> {
        self.mesh.edge(edge).map(|e| (e.start, e.end))
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, vertex: VertexId) -> Option<Point3<f64>> {
        self.mesh.vertex(vertex).map(|v| v.position)
    }

    /// Vector from the start to the end of `edge`.
    pub fn edge_vector(&self, edge: EdgeId) -> Option<Vector3<f64>> {
        let (a, b) = self.endpoints(edge)?;
        Some(self.position(b)? - self.position(a)?)
    }

    /// Live edges in handle order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + 'a {
        self.mesh.edges().map(|(id, _)| id)
    }

    /// Live faces in handle order.
    pub fn faces(&self) -> impl Iterator<Item = FaceId> + 'a {
        self.mesh.faces().map(|(id, _)| id)
    }

    /// Edges used by no face.
    pub fn stray_edges(&self) -> Vec<EdgeId> {
        self.edges()
            .filter(|&e| self.edge_faces(e).is_empty())
            .collect()
    }

    /// Edges used by exactly one face.
    pub fn border_edges(&self) -> Vec<EdgeId> {
        self.edges()
            .filter(|&e| self.edge_faces(e).len() == 1)
            .collect()
    }

    /// Edges used by more than two faces.
    pub fn non_manifold_edges(&self) -> Vec<EdgeId> {
        self.edges()
            .filter(|&e| self.edge_faces(e).len() > 2)
            .collect()
    }
}
