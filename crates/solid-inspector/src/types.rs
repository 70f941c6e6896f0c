//! Core entity types: polygon meshes with explicit edges and loops, plus the
//! flat entity collection a host hands to the inspector.

use hashbrown::HashMap;
use nalgebra::{Point2, Point3, Transform3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{InspectError, InspectResult};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Slot index of this handle.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Handle to a vertex of a [`Mesh`].
    VertexId
);
entity_id!(
    /// Handle to an edge of a [`Mesh`]. Stays valid after other edges are erased.
    EdgeId
);
entity_id!(
    /// Handle to a face of a [`Mesh`]. Stays valid after other faces are erased.
    FaceId
);
entity_id!(
    /// Handle to a nested instance of an [`Entities`] collection.
    InstanceId
);
entity_id!(
    /// Handle to an image entity of an [`Entities`] collection.
    ImageId
);

/// A mesh vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// 3D position, in millimeters by convention.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
        }
    }
}

/// An edge between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub start: VertexId,
    pub end: VertexId,
}

impl Edge {
    /// Whether the edge touches `vertex`.
    #[inline]
    pub fn has_vertex(&self, vertex: VertexId) -> bool {
        self.start == vertex || self.end == vertex
    }

    /// The endpoint opposite `vertex`.
    #[inline]
    pub fn other_vertex(&self, vertex: VertexId) -> VertexId {
        if self.start == vertex {
            self.end
        } else {
            self.start
        }
    }
}

/// One oriented use of an edge inside a face loop.
///
/// `reversed` is set when the loop walks the edge from `end` to `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeUse {
    pub edge: EdgeId,
    pub reversed: bool,
}

/// A closed, ordered cycle of oriented edges bounding a face.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loop {
    pub edges: Vec<EdgeUse>,
}

impl Loop {
    /// Whether the loop uses `edge`.
    pub fn contains(&self, edge: EdgeId) -> bool {
        self.edges.iter().any(|u| u.edge == edge)
    }

    /// Reverse traversal direction in place.
    fn reverse(&mut self) {
        self.edges.reverse();
        for edge_use in &mut self.edges {
            edge_use.reversed = !edge_use.reversed;
        }
    }
}

/// Texture placement captured from one side of a face: pairs of model-space
/// points and their UV coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvMapping {
    pub points: Vec<(Point3<f64>, Point2<f64>)>,
}

/// A material painted on one side of a face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub uv: Option<UvMapping>,
}

impl Material {
    /// A plain material without texture placement.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uv: None,
        }
    }
}

/// Side of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSide {
    Front,
    Back,
}

/// A planar polygon face with one outer loop and optional hole loops.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub outer: Loop,
    pub holes: Vec<Loop>,
    /// Hidden faces are skipped by exporters.
    pub hidden: bool,
    pub front_material: Option<Material>,
    pub back_material: Option<Material>,
}

impl Face {
    /// Create a visible, unpainted face.
    pub fn new(outer: Loop, holes: Vec<Loop>) -> Self {
        Self {
            outer,
            holes,
            hidden: false,
            front_material: None,
            back_material: None,
        }
    }

    /// Outer loop followed by the hole loops.
    pub fn loops(&self) -> impl Iterator<Item = &Loop> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Every oriented edge use of every loop.
    pub fn edge_uses(&self) -> impl Iterator<Item = EdgeUse> + '_ {
        self.loops().flat_map(|l| l.edges.iter().copied())
    }

    /// Whether any loop of the face uses `edge`.
    pub fn uses_edge(&self, edge: EdgeId) -> bool {
        self.loops().any(|l| l.contains(edge))
    }

    /// Material on the given side.
    pub fn material(&self, side: FaceSide) -> Option<&Material> {
        match side {
            FaceSide::Front => self.front_material.as_ref(),
            FaceSide::Back => self.back_material.as_ref(),
        }
    }
}

/// A polygon mesh with explicit edges.
///
/// Edges and faces live in slots so their handles survive erasure of other
/// entities. Erasing follows CAD host rules: erasing a face keeps its edges,
/// erasing an edge takes down every face whose outer loop uses it and heals
/// any hole loop that uses it.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    edges: Vec<Option<Edge>>,
    faces: Vec<Option<Face>>,
    edge_lookup: HashMap<(VertexId, VertexId), EdgeId>,
}

fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b { (a, b) } else { (b, a) }
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a mesh from raw parts without checking references.
    ///
    /// Use [`crate::validate::validate_mesh_data`] before inspecting a mesh
    /// built this way.
    pub fn from_parts(vertices: Vec<Vertex>, edges: Vec<Edge>, faces: Vec<Face>) -> Self {
        let mut edge_lookup = HashMap::with_capacity(edges.len());
        for (i, edge) in edges.iter().enumerate() {
            edge_lookup
                .entry(edge_key(edge.start, edge.end))
                .or_insert(EdgeId(i as u32));
        }
        Self {
            vertices,
            edges: edges.into_iter().map(Some).collect(),
            faces: faces.into_iter().map(Some).collect(),
            edge_lookup,
        }
    }

    /// Add a vertex.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexId {
        self.vertices.push(Vertex::from_coords(x, y, z));
        VertexId((self.vertices.len() - 1) as u32)
    }

    /// Return the edge between `a` and `b`, creating it if needed.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> InspectResult<EdgeId> {
        self.check_vertex(a)?;
        self.check_vertex(b)?;
        if a == b {
            return Err(InspectError::invalid_entities(format!(
                "edge would start and end at vertex {}",
                a
            )));
        }
        if let Some(&id) = self.edge_lookup.get(&edge_key(a, b)) {
            return Ok(id);
        }
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge { start: a, end: b }));
        self.edge_lookup.insert(edge_key(a, b), id);
        Ok(id)
    }

    /// Add a face bounded by the polygon `outer`.
    pub fn add_face(&mut self, outer: &[VertexId]) -> InspectResult<FaceId> {
        self.add_face_with_holes(outer, &[])
    }

    /// Add a face bounded by `outer` with hole polygons `holes`.
    pub fn add_face_with_holes(
        &mut self,
        outer: &[VertexId],
        holes: &[&[VertexId]],
    ) -> InspectResult<FaceId> {
        let outer = self.build_loop(outer)?;
        let holes = holes
            .iter()
            .map(|h| self.build_loop(h))
            .collect::<InspectResult<Vec<_>>>()?;
        self.faces.push(Some(Face::new(outer, holes)));
        Ok(FaceId((self.faces.len() - 1) as u32))
    }

    fn build_loop(&mut self, polygon: &[VertexId]) -> InspectResult<Loop> {
        if polygon.len() < 3 {
            return Err(InspectError::invalid_entities(format!(
                "loop needs at least 3 vertices, got {}",
                polygon.len()
            )));
        }
        let mut edges = Vec::with_capacity(polygon.len());
        for i in 0..polygon.len() {
            let a = polygon[i];
            let b = polygon[(i + 1) % polygon.len()];
            let edge = self.add_edge(a, b)?;
            let reversed = self.edges[edge.index()].is_some_and(|e| e.start != a);
            edges.push(EdgeUse { edge, reversed });
        }
        Ok(Loop { edges })
    }

    fn check_vertex(&self, v: VertexId) -> InspectResult<()> {
        if v.index() < self.vertices.len() {
            Ok(())
        } else {
            Err(InspectError::invalid_entities(format!(
                "vertex {} does not exist (mesh has {} vertices)",
                v,
                self.vertices.len()
            )))
        }
    }

    /// Vertex by handle.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())
    }

    /// Live edge by handle.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    /// Live face by handle.
    #[inline]
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.index()).and_then(Option::as_ref)
    }

    /// Mutable live face by handle.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId) -> Option<&mut Face> {
        self.faces.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// All vertices with their handles.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId(i as u32), v))
    }

    /// Live edges in handle order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (EdgeId(i as u32), e)))
    }

    /// Live faces in handle order.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.as_ref().map(|f| (FaceId(i as u32), f)))
    }

    /// Number of vertex slots.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Number of live faces.
    pub fn face_count(&self) -> usize {
        self.faces.iter().filter(|f| f.is_some()).count()
    }

    /// Number of edge slots, live or erased.
    #[inline]
    pub fn edge_capacity(&self) -> usize {
        self.edges.len()
    }

    /// Number of face slots, live or erased.
    #[inline]
    pub fn face_capacity(&self) -> usize {
        self.faces.len()
    }

    /// Edge between two vertices, if any.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_lookup
            .get(&edge_key(a, b))
            .copied()
            .filter(|&e| self.edge(e).is_some())
    }

    /// Vertex a loop leaves from on the given edge use.
    pub fn use_start(&self, edge_use: EdgeUse) -> Option<VertexId> {
        self.edge(edge_use.edge)
            .map(|e| if edge_use.reversed { e.end } else { e.start })
    }

    /// Vertices of a loop in traversal order.
    pub fn loop_vertices(&self, lp: &Loop) -> Vec<VertexId> {
        lp.edges
            .iter()
            .filter_map(|&u| self.use_start(u))
            .collect()
    }

    /// Positions of a loop in traversal order.
    pub fn loop_positions(&self, lp: &Loop) -> Vec<Point3<f64>> {
        self.loop_vertices(lp)
            .into_iter()
            .filter_map(|v| self.vertex(v).map(|v| v.position))
            .collect()
    }

    /// Length of an edge after applying `transformation`.
    pub fn edge_length(&self, edge: EdgeId, transformation: &Transform3<f64>) -> Option<f64> {
        let e = self.edge(edge)?;
        let a = transformation.transform_point(&self.vertex(e.start)?.position);
        let b = transformation.transform_point(&self.vertex(e.end)?.position);
        Some((b - a).norm())
    }

    /// Erase a face, keeping its edges. Returns false if it was already gone.
    pub fn erase_face(&mut self, face: FaceId) -> bool {
        match self.faces.get_mut(face.index()) {
            Some(slot @ Some(_)) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Erase an edge. Faces whose outer loop uses it are erased too; hole
    /// loops that use it are removed from their face.
    pub fn erase_edge(&mut self, edge: EdgeId) -> bool {
        let Some(removed) = self.edges.get_mut(edge.index()).and_then(Option::take) else {
            return false;
        };
        if self.edge_lookup.get(&edge_key(removed.start, removed.end)) == Some(&edge) {
            self.edge_lookup.remove(&edge_key(removed.start, removed.end));
        }
        for slot in &mut self.faces {
            let Some(face) = slot else { continue };
            if face.outer.contains(edge) {
                *slot = None;
            } else {
                face.holes.retain(|h| !h.contains(edge));
            }
        }
        true
    }

    /// Reverse the winding of a face in place.
    ///
    /// Like CAD hosts, this drops the UV placement on both sides; material
    /// names stay on their sides.
    pub fn reverse_face(&mut self, face: FaceId) -> bool {
        let Some(f) = self.face_mut(face) else {
            return false;
        };
        f.outer.reverse();
        for hole in &mut f.holes {
            hole.reverse();
        }
        for material in [&mut f.front_material, &mut f.back_material]
            .into_iter()
            .flatten()
        {
            material.uv = None;
        }
        true
    }

    /// Append a transformed copy of `other` to this mesh, welding nothing.
    pub fn merge_transformed(&mut self, other: &Mesh, transformation: &Transform3<f64>) {
        let vertex_offset = self.vertices.len() as u32;
        for v in &other.vertices {
            self.vertices.push(Vertex {
                position: transformation.transform_point(&v.position),
            });
        }
        let mut edge_map: HashMap<EdgeId, EdgeId> = HashMap::new();
        for (id, e) in other.edges() {
            let start = VertexId(e.start.0 + vertex_offset);
            let end = VertexId(e.end.0 + vertex_offset);
            let new_id = EdgeId(self.edges.len() as u32);
            self.edges.push(Some(Edge { start, end }));
            self.edge_lookup.entry(edge_key(start, end)).or_insert(new_id);
            edge_map.insert(id, new_id);
        }
        let remap = |lp: &Loop| Loop {
            edges: lp
                .edges
                .iter()
                .filter_map(|u| {
                    edge_map.get(&u.edge).map(|&edge| EdgeUse {
                        edge,
                        reversed: u.reversed,
                    })
                })
                .collect(),
        };
        let flips_handedness = transformation.matrix().fixed_view::<3, 3>(0, 0).into_owned().determinant() < 0.0;
        for (_, f) in other.faces() {
            let mut face = f.clone();
            face.outer = remap(&f.outer);
            face.holes = f.holes.iter().map(remap).collect();
            if flips_handedness {
                face.outer.reverse();
                for hole in &mut face.holes {
                    hole.reverse();
                }
            }
            self.faces.push(Some(face));
        }
    }

    /// Axis-aligned bounding box of all vertices.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            let p = v.position;
            (
                Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        }))
    }

    /// Translate every vertex.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }
}

/// A nested group or component instance.
#[derive(Debug, Clone)]
pub struct Instance {
    pub name: String,
    pub visible: bool,
    pub transformation: Transform3<f64>,
    pub definition: Entities,
}

impl Instance {
    /// A visible instance with an identity transform.
    pub fn new(name: impl Into<String>, definition: Entities) -> Self {
        Self {
            name: name.into(),
            visible: true,
            transformation: Transform3::identity(),
            definition,
        }
    }
}

/// An embedded raster image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub name: String,
}

/// The flat entity collection handed to the inspector: mesh geometry plus
/// nested instances and images living next to it.
#[derive(Debug, Clone, Default)]
pub struct Entities {
    pub mesh: Mesh,
    instances: Vec<Option<Instance>>,
    images: Vec<Option<Image>>,
}

impl Entities {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a mesh.
    pub fn from_mesh(mesh: Mesh) -> Self {
        Self {
            mesh,
            ..Self::default()
        }
    }

    /// Add a nested instance.
    pub fn add_instance(&mut self, instance: Instance) -> InstanceId {
        self.instances.push(Some(instance));
        InstanceId((self.instances.len() - 1) as u32)
    }

    /// Add an image.
    pub fn add_image(&mut self, image: Image) -> ImageId {
        self.images.push(Some(image));
        ImageId((self.images.len() - 1) as u32)
    }

    /// Live instance by handle.
    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id.index()).and_then(Option::as_ref)
    }

    /// Live image by handle.
    pub fn image(&self, id: ImageId) -> Option<&Image> {
        self.images.get(id.index()).and_then(Option::as_ref)
    }

    /// Live instances in handle order.
    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances
            .iter()
            .enumerate()
            .filter_map(|(i, x)| x.as_ref().map(|x| (InstanceId(i as u32), x)))
    }

    /// Live images in handle order.
    pub fn images(&self) -> impl Iterator<Item = (ImageId, &Image)> {
        self.images
            .iter()
            .enumerate()
            .filter_map(|(i, x)| x.as_ref().map(|x| (ImageId(i as u32), x)))
    }

    /// Follow a path of nested instances down to their definition.
    pub fn descend(&self, path: &[InstanceId]) -> Option<&Entities> {
        path.iter()
            .try_fold(self, |ents, &id| ents.instance(id).map(|i| &i.definition))
    }

    /// Mutable variant of [`Entities::descend`].
    pub fn descend_mut(&mut self, path: &[InstanceId]) -> Option<&mut Entities> {
        let mut ents = self;
        for &id in path {
            ents = &mut ents
                .instances
                .get_mut(id.index())
                .and_then(Option::as_mut)?
                .definition;
        }
        Some(ents)
    }

    /// Remove an instance. Returns false if it was already gone.
    pub fn erase_instance(&mut self, id: InstanceId) -> bool {
        self.instances
            .get_mut(id.index())
            .and_then(Option::take)
            .is_some()
    }

    /// Remove an image. Returns false if it was already gone.
    pub fn erase_image(&mut self, id: ImageId) -> bool {
        self.images.get_mut(id.index()).and_then(Option::take).is_some()
    }

    /// Replace an instance by its transformed contents.
    pub fn explode_instance(&mut self, id: InstanceId) -> bool {
        let Some(instance) = self.instances.get_mut(id.index()).and_then(Option::take) else {
            return false;
        };
        let Instance {
            transformation,
            definition,
            ..
        } = instance;
        self.mesh.merge_transformed(&definition.mesh, &transformation);
        for (_, nested) in definition.instances() {
            let mut nested = nested.clone();
            nested.transformation = transformation * nested.transformation;
            self.add_instance(nested);
        }
        for (_, image) in definition.images() {
            self.add_image(image.clone());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(mesh: &mut Mesh) -> [VertexId; 4] {
        [
            mesh.add_vertex(0.0, 0.0, 0.0),
            mesh.add_vertex(1.0, 0.0, 0.0),
            mesh.add_vertex(1.0, 1.0, 0.0),
            mesh.add_vertex(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_add_face_shares_edges() {
        let mut mesh = Mesh::new();
        let [a, b, c, d] = square(&mut mesh);
        let f0 = mesh.add_face(&[a, b, c]).unwrap();
        let f1 = mesh.add_face(&[a, c, d]).unwrap();

        assert_eq!(mesh.edge_count(), 5);
        let diagonal = mesh.find_edge(a, c).unwrap();
        assert!(mesh.face(f0).unwrap().uses_edge(diagonal));
        assert!(mesh.face(f1).unwrap().uses_edge(diagonal));

        // f0 walks c -> a, f1 walks a -> c
        let use0 = mesh.face(f0).unwrap().edge_uses().find(|u| u.edge == diagonal).unwrap();
        let use1 = mesh.face(f1).unwrap().edge_uses().find(|u| u.edge == diagonal).unwrap();
        assert_ne!(use0.reversed, use1.reversed);
    }

    #[test]
    fn test_loop_vertices_follow_winding() {
        let mut mesh = Mesh::new();
        let [a, b, c, _] = square(&mut mesh);
        let f = mesh.add_face(&[a, b, c]).unwrap();
        let face = mesh.face(f).unwrap();
        assert_eq!(mesh.loop_vertices(&face.outer), vec![a, b, c]);
    }

    #[test]
    fn test_rejects_short_loops_and_bad_vertices() {
        let mut mesh = Mesh::new();
        let [a, b, _, _] = square(&mut mesh);
        assert!(mesh.add_face(&[a, b]).is_err());
        assert!(mesh.add_face(&[a, b, VertexId(99)]).is_err());
        assert!(mesh.add_edge(a, a).is_err());
    }

    #[test]
    fn test_reverse_face_flips_loop() {
        let mut mesh = Mesh::new();
        let [a, b, c, _] = square(&mut mesh);
        let f = mesh.add_face(&[a, b, c]).unwrap();
        mesh.face_mut(f).unwrap().front_material = Some(Material {
            name: "Oak".into(),
            uv: Some(UvMapping { points: Vec::new() }),
        });

        assert!(mesh.reverse_face(f));
        let face = mesh.face(f).unwrap();
        assert_eq!(mesh.loop_vertices(&face.outer), vec![a, c, b]);
        let front = face.front_material.as_ref().unwrap();
        assert_eq!(front.name, "Oak");
        assert!(front.uv.is_none());
    }

    #[test]
    fn test_erase_edge_takes_faces_and_heals_holes() {
        let mut mesh = Mesh::new();
        let outer = [
            mesh.add_vertex(0.0, 0.0, 0.0),
            mesh.add_vertex(10.0, 0.0, 0.0),
            mesh.add_vertex(10.0, 10.0, 0.0),
            mesh.add_vertex(0.0, 10.0, 0.0),
        ];
        let hole = [
            mesh.add_vertex(4.0, 4.0, 0.0),
            mesh.add_vertex(4.0, 6.0, 0.0),
            mesh.add_vertex(6.0, 5.0, 0.0),
        ];
        let f = mesh.add_face_with_holes(&outer, &[&hole]).unwrap();

        let hole_edge = mesh.find_edge(hole[0], hole[1]).unwrap();
        assert!(mesh.erase_edge(hole_edge));
        assert!(mesh.face(f).unwrap().holes.is_empty());

        let outer_edge = mesh.find_edge(outer[0], outer[1]).unwrap();
        assert!(mesh.erase_edge(outer_edge));
        assert!(mesh.face(f).is_none());
        assert!(!mesh.erase_edge(outer_edge));
    }

    #[test]
    fn test_explode_instance_moves_geometry() {
        let mut inner = Mesh::new();
        let [a, b, c, _] = square(&mut inner);
        inner.add_face(&[a, b, c]).unwrap();

        let mut ents = Entities::new();
        let mut instance = Instance::new("Part", Entities::from_mesh(inner));
        instance.transformation =
            Transform3::from_matrix_unchecked(nalgebra::Matrix4::new_translation(&Vector3::new(
                0.0, 0.0, 5.0,
            )));
        let id = ents.add_instance(instance);

        assert!(ents.explode_instance(id));
        assert!(ents.instance(id).is_none());
        assert_eq!(ents.mesh.face_count(), 1);
        assert!(ents.mesh.vertices().all(|(_, v)| v.position.z == 5.0));
    }
}
