//! Defect reporting: the inspection entry point.
//!
//! Edges are bucketed by how many faces use them. A mesh without open
//! borders goes through face classification; otherwise the open borders are
//! grouped into chains. Hidden faces, nested instances, images and short
//! edges are reported in every case.

use std::collections::BTreeMap;

use nalgebra::Transform3;
use tracing::{debug, info};

use crate::adjacency::MeshGraph;
use crate::classify::classify_groups;
use crate::components::{GeometryGroup, group_connected_edges, partition};
use crate::defects::{Defect, DefectKind};
use crate::error::{InspectError, InspectResult};
use crate::params::InspectParams;
use crate::progress::{NoStatus, PhaseReporter, StatusSink};
use crate::tracing_ext::{OperationTimer, log_entity_stats};
use crate::types::{EdgeId, Entities, InstanceId, Mesh};
use crate::validate::validate_mesh_data_strict;

/// Edge and group counts gathered during an inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyStats {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    pub groups: usize,
    /// Edges used by no face.
    pub stray_edges: usize,
    /// Edges used by one face, on its outer loop.
    pub border_edges: usize,
    /// Edges used by one face, on a hole loop.
    pub hole_edges: usize,
    /// Edges used by more than two faces.
    pub non_manifold_edges: usize,
}

/// Result of one inspection.
#[derive(Debug, Default)]
pub struct InspectionReport {
    /// Defects in report order: edges, faces, instances, images, short edges.
    pub defects: Vec<Defect>,
    /// Geometry groups that could not be resolved.
    pub failures: Vec<InspectError>,
    pub stats: TopologyStats,
    /// Whether face classification ran and produced a closed shell.
    pub classified: bool,
}

impl InspectionReport {
    /// Whether nothing is wrong.
    pub fn is_solid(&self) -> bool {
        self.defects.is_empty() && self.failures.is_empty()
    }

    /// Number of defects of one kind.
    pub fn count(&self, kind: DefectKind) -> usize {
        self.defects.iter().filter(|d| d.kind() == kind).count()
    }

    /// Defect counts per kind, for kinds that occur.
    pub fn counts_by_kind(&self) -> BTreeMap<DefectKind, usize> {
        let mut counts = BTreeMap::new();
        for d in &self.defects {
            *counts.entry(d.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of defects some automatic fix exists for.
    pub fn fixable_count(&self) -> usize {
        self.defects.iter().filter(|d| d.kind().is_fixable()).count()
    }

    /// Defects of one kind.
    pub fn of_kind(&self, kind: DefectKind) -> impl Iterator<Item = &Defect> {
        self.defects.iter().filter(move |d| d.kind() == kind)
    }
}

impl std::fmt::Display for InspectionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = &self.stats;
        writeln!(f, "Solid Inspection:")?;
        writeln!(
            f,
            "  Entities: {} vertices, {} edges, {} faces in {} group(s)",
            s.vertices, s.edges, s.faces, s.groups
        )?;
        if self.is_solid() {
            return writeln!(f, "  Valid solid: yes");
        }
        writeln!(f, "  Valid solid: no")?;
        for (kind, count) in self.counts_by_kind() {
            let fix = if kind.is_fixable() { "" } else { " (manual)" };
            writeln!(f, "  {}: {}{}", kind.display_name(), count, fix)?;
        }
        for failure in &self.failures {
            writeln!(f, "  Not analysed: {}", failure)?;
        }
        Ok(())
    }
}

/// Inspect `entities` and return the defect list.
///
/// `transformation` maps the entities into model space; it only affects
/// short-edge lengths.
pub fn find_errors(
    entities: &Entities,
    transformation: &Transform3<f64>,
    params: &InspectParams,
) -> InspectResult<Vec<Defect>> {
    inspect(entities, transformation, params).map(|r| r.defects)
}

/// Inspect `entities`.
///
/// # Example
/// ```
/// use nalgebra::Transform3;
/// use solid_inspector::{Entities, InspectParams, Mesh, inspect};
///
/// let mut mesh = Mesh::new();
/// let a = mesh.add_vertex(0.0, 0.0, 0.0);
/// let b = mesh.add_vertex(10.0, 0.0, 0.0);
/// let c = mesh.add_vertex(0.0, 10.0, 0.0);
/// mesh.add_face(&[a, b, c]).unwrap();
///
/// let entities = Entities::from_mesh(mesh);
/// let report = inspect(&entities, &Transform3::identity(), &InspectParams::default()).unwrap();
/// assert_eq!(report.defects.len(), 1); // one open border
/// ```
pub fn inspect(
    entities: &Entities,
    transformation: &Transform3<f64>,
    params: &InspectParams,
) -> InspectResult<InspectionReport> {
    inspect_with_status(entities, transformation, params, &NoStatus)
}

/// Inspect `entities`, reporting phases to `status`.
pub fn inspect_with_status(
    entities: &Entities,
    transformation: &Transform3<f64>,
    params: &InspectParams,
    status: &dyn StatusSink,
) -> InspectResult<InspectionReport> {
    let mesh = &entities.mesh;
    let _timer = OperationTimer::with_context("inspect", mesh.edge_count(), mesh.face_count());
    validate_mesh_data_strict(mesh)?;
    log_entity_stats(entities, "inspect");

    let graph = MeshGraph::build(mesh);
    let groups: Vec<GeometryGroup> = partition(&graph).collect();
    let mut phases = PhaseReporter::new(status, 3);
    let mut report = InspectionReport {
        stats: TopologyStats {
            vertices: mesh.vertex_count(),
            edges: mesh.edge_count(),
            faces: mesh.face_count(),
            groups: groups.len(),
            ..Default::default()
        },
        ..Default::default()
    };

    phases.phase("Inspecting edges...");
    let mut border = Vec::new();
    let mut holes = Vec::new();
    let mut non_manifold = Vec::new();
    for edge in graph.edges() {
        match graph.edge_faces(edge) {
            [] => report.defects.push(Defect::StrayEdge { edge }),
            [face] if graph.is_outer_loop_edge(edge, *face) => border.push(edge),
            [_] => holes.push(edge),
            [_, _] => {}
            _ => non_manifold.push(edge),
        }
    }
    report.stats.stray_edges = report.defects.len();
    report.stats.border_edges = border.len();
    report.stats.hole_edges = holes.len();
    report.stats.non_manifold_edges = non_manifold.len();
    phase_log(params, &report.stats);

    if border.is_empty() && holes.is_empty() && mesh.face_count() > 0 {
        phases.phase("Resolving shells...");
        let classification = classify_groups(&graph, &groups);
        report.classified = classification.is_valid();
        if classification.is_valid() {
            let defects = &mut report.defects;
            defects.extend(
                classification
                    .internal_faces()
                    .into_iter()
                    .map(|face| Defect::InternalFace { face }),
            );
            defects.extend(
                classification
                    .external_faces()
                    .into_iter()
                    .map(|face| Defect::ExternalFace { face }),
            );
            defects.extend(
                classification
                    .reversed_faces()
                    .into_iter()
                    .map(|face| Defect::ReversedFace { face }),
            );
        } else {
            push_internal_face_edges(&mut report, &non_manifold);
        }
        report.failures = classification.failures;
    } else {
        phases.phase("Sorting surface borders...");
        for edges in group_connected_edges(&graph, &border) {
            report.defects.push(Defect::SurfaceBorder { edges });
        }
        for edges in group_connected_edges(&graph, &holes) {
            report.defects.push(Defect::FaceHole { edges });
        }
        push_internal_face_edges(&mut report, &non_manifold);
    }

    phases.phase("Inspecting entities...");
    if params.detect_hidden_faces {
        for (face, f) in mesh.faces() {
            if f.hidden {
                report.defects.push(Defect::HiddenFace { face });
            }
        }
    }
    let mut path = Vec::new();
    collect_instances(entities, params.search_nested_instances, &mut path, &mut report.defects);
    collect_images(entities, params.search_nested_instances, &mut path, &mut report.defects);
    if params.detect_short_edges {
        report
            .defects
            .extend(short_edges(mesh, transformation, params.short_edge_threshold));
    }
    phases.finish();

    info!(
        defects = report.defects.len(),
        failures = report.failures.len(),
        classified = report.classified,
        "Inspection finished"
    );
    Ok(report)
}

fn phase_log(params: &InspectParams, stats: &TopologyStats) {
    let message = format!(
        "{} stray, {} border, {} hole, {} non-manifold edges",
        stats.stray_edges, stats.border_edges, stats.hole_edges, stats.non_manifold_edges
    );
    if params.debug {
        info!("{}", message);
    } else {
        debug!("{}", message);
    }
}

fn push_internal_face_edges(report: &mut InspectionReport, edges: &[EdgeId]) {
    report
        .defects
        .extend(edges.iter().map(|&edge| Defect::InternalFaceEdge { edge }));
}

fn collect_instances(
    entities: &Entities,
    recurse: bool,
    path: &mut Vec<InstanceId>,
    out: &mut Vec<Defect>,
) {
    for (id, instance) in entities.instances() {
        path.push(id);
        out.push(Defect::NestedInstance { path: path.clone() });
        if recurse && instance.visible {
            collect_instances(&instance.definition, recurse, path, out);
        }
        path.pop();
    }
}

fn collect_images(
    entities: &Entities,
    recurse: bool,
    path: &mut Vec<InstanceId>,
    out: &mut Vec<Defect>,
) {
    for (image, _) in entities.images() {
        out.push(Defect::ImageEntity {
            parent: path.clone(),
            image,
        });
    }
    if !recurse {
        return;
    }
    for (id, instance) in entities.instances() {
        if instance.visible {
            path.push(id);
            collect_images(&instance.definition, recurse, path, out);
            path.pop();
        }
    }
}

fn short_edges<'m>(
    mesh: &'m Mesh,
    transformation: &'m Transform3<f64>,
    threshold: f64,
) -> impl Iterator<Item = Defect> + 'm {
    mesh.edges().filter_map(move |(edge, _)| {
        let length = mesh.edge_length(edge, transformation)?;
        (length < threshold).then_some(Defect::ShortEdge { edge, length })
    })
}

/// Fluent front end for [`inspect_with_status`].
///
/// ```
/// use solid_inspector::{Entities, Inspector};
///
/// let entities = Entities::new();
/// let report = Inspector::new(&entities).short_edges(1.0).run().unwrap();
/// assert!(report.is_solid());
/// ```
pub struct Inspector<'a> {
    entities: &'a Entities,
    transformation: Transform3<f64>,
    params: InspectParams,
    status: &'a dyn StatusSink,
}

impl<'a> Inspector<'a> {
    /// Inspect `entities` with default parameters and no transform.
    pub fn new(entities: &'a Entities) -> Self {
        Self {
            entities,
            transformation: Transform3::identity(),
            params: InspectParams::default(),
            status: &NoStatus,
        }
    }

    /// Replace all parameters.
    pub fn params(mut self, params: InspectParams) -> Self {
        self.params = params;
        self
    }

    /// Map the entities into model space.
    pub fn transformation(mut self, transformation: Transform3<f64>) -> Self {
        self.transformation = transformation;
        self
    }

    /// Report edges shorter than `threshold`.
    pub fn short_edges(mut self, threshold: f64) -> Self {
        self.params = self.params.with_short_edges(threshold);
        self
    }

    /// Search nested definitions for instances and images.
    pub fn nested_instances(mut self, search: bool) -> Self {
        self.params.search_nested_instances = search;
        self
    }

    /// Send phase status to `status`.
    pub fn status(mut self, status: &'a dyn StatusSink) -> Self {
        self.status = status;
        self
    }

    /// Run the inspection.
    pub fn run(self) -> InspectResult<InspectionReport> {
        inspect_with_status(self.entities, &self.transformation, &self.params, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::StatusLog;
    use crate::types::{Image, Instance, VertexId};

    fn cube(mesh: &mut Mesh, size: f64) -> Vec<VertexId> {
        let v: Vec<VertexId> = (0..8)
            .map(|i| {
                let x = if matches!(i, 1 | 2 | 5 | 6) { size } else { 0.0 };
                let y = if matches!(i, 2 | 3 | 6 | 7) { size } else { 0.0 };
                let z = if i >= 4 { size } else { 0.0 };
                mesh.add_vertex(x, y, z)
            })
            .collect();
        for q in [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
        ] {
            mesh.add_face(&q.map(|i| v[i])).unwrap();
        }
        v
    }

    fn run(entities: &Entities, params: &InspectParams) -> InspectionReport {
        inspect(entities, &Transform3::identity(), params).unwrap()
    }

    #[test]
    fn test_cube_is_solid() {
        let mut mesh = Mesh::new();
        cube(&mut mesh, 10.0);
        let report = run(&Entities::from_mesh(mesh), &InspectParams::default());
        assert!(report.is_solid(), "{}", report);
        assert!(report.classified);
        assert_eq!(report.stats.groups, 1);
    }

    #[test]
    fn test_open_box_reports_one_border() {
        let mut mesh = Mesh::new();
        cube(&mut mesh, 10.0);
        mesh.erase_face(crate::types::FaceId(1));
        let report = run(&Entities::from_mesh(mesh), &InspectParams::default());
        assert_eq!(report.count(DefectKind::SurfaceBorder), 1);
        assert!(matches!(&report.defects[0], Defect::SurfaceBorder { edges } if edges.len() == 4));
        assert!(!report.classified);
    }

    #[test]
    fn test_stray_edge_first() {
        let mut mesh = Mesh::new();
        let v = cube(&mut mesh, 10.0);
        let far = mesh.add_vertex(30.0, 30.0, 30.0);
        let stray = mesh.add_edge(v[6], far).unwrap();
        let report = run(&Entities::from_mesh(mesh), &InspectParams::default());
        assert_eq!(report.defects, vec![Defect::StrayEdge { edge: stray }]);
    }

    #[test]
    fn test_hidden_face_toggle() {
        let mut mesh = Mesh::new();
        cube(&mut mesh, 10.0);
        mesh.face_mut(crate::types::FaceId(2)).unwrap().hidden = true;
        let entities = Entities::from_mesh(mesh);

        let report = run(&entities, &InspectParams::default());
        assert_eq!(report.count(DefectKind::HiddenFace), 1);

        let params = InspectParams {
            detect_hidden_faces: false,
            ..Default::default()
        };
        assert!(run(&entities, &params).is_solid());
    }

    #[test]
    fn test_nested_instances_and_images() {
        let mut inner = Entities::new();
        inner.add_image(Image {
            name: "decal".into(),
        });
        inner.add_instance(Instance::new("bolt", Entities::new()));

        let mut entities = Entities::new();
        entities.add_instance(Instance::new("assembly", inner));
        entities.add_image(Image {
            name: "reference".into(),
        });

        let shallow = run(&entities, &InspectParams::default());
        assert_eq!(shallow.count(DefectKind::NestedInstance), 1);
        assert_eq!(shallow.count(DefectKind::ImageEntity), 1);

        let deep = run(&entities, &InspectParams::thorough());
        assert_eq!(deep.count(DefectKind::NestedInstance), 2);
        assert_eq!(deep.count(DefectKind::ImageEntity), 2);
        assert!(deep.defects.contains(&Defect::NestedInstance {
            path: vec![InstanceId(0), InstanceId(0)]
        }));
    }

    #[test]
    fn test_short_edges_use_transformation() {
        let mut mesh = Mesh::new();
        cube(&mut mesh, 2.0);
        let entities = Entities::from_mesh(mesh);
        let params = InspectParams::for_printing();

        let report = run(&entities, &params);
        assert_eq!(report.count(DefectKind::ShortEdge), 12);

        let scale = Transform3::from_matrix_unchecked(nalgebra::Matrix4::new_scaling(10.0));
        let report = inspect(&entities, &scale, &params).unwrap();
        assert_eq!(report.count(DefectKind::ShortEdge), 0);
    }

    #[test]
    fn test_status_phases() {
        let mut mesh = Mesh::new();
        cube(&mut mesh, 10.0);
        let entities = Entities::from_mesh(mesh);
        let log = StatusLog::default();
        Inspector::new(&entities).status(&log).run().unwrap();
        assert_eq!(
            log.messages(),
            vec![
                "Inspecting edges...",
                "Resolving shells...",
                "Inspecting entities...",
                ""
            ]
        );
    }

    #[test]
    fn test_invalid_input_fails_fast() {
        let mut mesh = Mesh::new();
        cube(&mut mesh, 10.0);
        let mut entities = Entities::from_mesh(mesh);
        entities.mesh.translate(nalgebra::Vector3::new(f64::NAN, 0.0, 0.0));
        assert!(inspect(&entities, &Transform3::identity(), &InspectParams::default()).is_err());
    }
}
