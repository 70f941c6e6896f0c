//! Property-based tests for solid inspection.
//!
//! These tests build random arrangements of boxes, damage them in known
//! ways, and check the inspector finds exactly that damage.
//!
//! Run with: cargo test -p solid-inspector -- proptest

use std::collections::HashSet;

use proptest::prelude::*;
use solid_inspector::{
    Defect, DefectKind, Document, Entities, FaceId, FixParams, InspectParams, Mesh, MeshGraph,
    Model, Transform3, Vector3, classify, find_errors, fix_errors, inspect, partition,
};

// =============================================================================
// Strategies
// =============================================================================

/// Box dimensions in millimeters.
fn arb_size() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(1.0..50.0f64)
}

/// One to four boxes, each with its own size.
fn arb_boxes() -> impl Strategy<Value = Vec<[f64; 3]>> {
    prop::collection::vec(arb_size(), 1..=4)
}

fn arb_offset() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-1000.0..1000.0f64)
}

/// Lay boxes out along X with a gap so they never touch.
fn build_boxes(sizes: &[[f64; 3]], offset: [f64; 3]) -> Mesh {
    let mut mesh = Mesh::new();
    let mut x = 0.0;
    for &[w, d, h] in sizes {
        let v: Vec<_> = [
            (x, 0.0, 0.0),
            (x + w, 0.0, 0.0),
            (x + w, d, 0.0),
            (x, d, 0.0),
            (x, 0.0, h),
            (x + w, 0.0, h),
            (x + w, d, h),
            (x, d, h),
        ]
        .iter()
        .map(|&(px, py, pz)| mesh.add_vertex(px, py, pz))
        .collect();
        for quad in [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
        ] {
            mesh.add_face(&quad.map(|i| v[i])).unwrap();
        }
        x += w + 10.0;
    }
    mesh.translate(Vector3::new(offset[0], offset[1], offset[2]));
    mesh
}

/// Boxes plus a mask choosing which faces to reverse.
fn arb_damaged_boxes() -> impl Strategy<Value = (Vec<[f64; 3]>, [f64; 3], Vec<bool>)> {
    (arb_boxes(), arb_offset()).prop_flat_map(|(sizes, offset)| {
        let faces = sizes.len() * 6;
        (
            Just(sizes),
            Just(offset),
            prop::collection::vec(prop::bool::weighted(0.3), faces),
        )
    })
}

fn reverse_masked(mesh: &mut Mesh, mask: &[bool]) -> Vec<FaceId> {
    let reversed: Vec<FaceId> = mask
        .iter()
        .enumerate()
        .filter(|(_, flip)| **flip)
        .map(|(i, _)| FaceId(i as u32))
        .collect();
    for &face in &reversed {
        mesh.reverse_face(face);
    }
    reversed
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every face and edge lands in exactly one geometry group.
    #[test]
    fn proptest_partition_is_complete((sizes, offset) in (arb_boxes(), arb_offset())) {
        let mesh = build_boxes(&sizes, offset);
        let graph = MeshGraph::build(&mesh);
        let groups: Vec<_> = partition(&graph).collect();

        prop_assert_eq!(groups.len(), sizes.len());
        let mut faces = HashSet::new();
        let mut edges = HashSet::new();
        for group in &groups {
            for f in &group.faces {
                prop_assert!(faces.insert(*f), "face {} in two groups", f);
            }
            for e in &group.edges {
                prop_assert!(edges.insert(*e), "edge {} in two groups", e);
            }
        }
        prop_assert_eq!(faces.len(), mesh.face_count());
        prop_assert_eq!(edges.len(), mesh.edge_count());
    }

    /// Exactly the reversed faces are reported, whichever they are.
    #[test]
    fn proptest_reversed_faces_are_found((sizes, offset, mask) in arb_damaged_boxes()) {
        let mut mesh = build_boxes(&sizes, offset);
        let reversed = reverse_masked(&mut mesh, &mask);

        let defects = find_errors(
            &Entities::from_mesh(mesh),
            &Transform3::identity(),
            &InspectParams::default(),
        ).unwrap();

        let expected: Vec<Defect> = reversed
            .into_iter()
            .map(|face| Defect::ReversedFace { face })
            .collect();
        prop_assert_eq!(defects, expected);
    }

    /// A valid classification covers every face once, and reversed faces
    /// are always skin faces.
    #[test]
    fn proptest_classification_is_exhaustive((sizes, offset, mask) in arb_damaged_boxes()) {
        let mut mesh = build_boxes(&sizes, offset);
        reverse_masked(&mut mesh, &mask);
        let graph = MeshGraph::build(&mesh);
        let result = classify(&graph);

        prop_assert!(result.is_valid());
        prop_assert!(result.reversed.is_subset(&result.shell));
        prop_assert!(result.shell.is_disjoint(&result.internal));
        prop_assert!(result.shell.is_disjoint(&result.external));
        prop_assert_eq!(
            result.shell.len() + result.internal.len() + result.external.len(),
            mesh.face_count()
        );
    }

    /// Fixing whatever was found leaves a clean solid, and inspecting the
    /// result again is stable.
    #[test]
    fn proptest_fix_then_inspect_is_clean((sizes, offset, mask) in arb_damaged_boxes()) {
        let mut mesh = build_boxes(&sizes, offset);
        reverse_masked(&mut mesh, &mask);
        let mut model = Model::new(Entities::from_mesh(mesh));
        let identity = Transform3::identity();
        let params = InspectParams::default();

        let defects = find_errors(model.entities(), &identity, &params).unwrap();
        let report = fix_errors(&defects, &mut model, &FixParams::default()).unwrap();
        prop_assert!(report.is_fully_fixed());

        let entities = model.entities();
        let first = find_errors(entities, &identity, &params).unwrap();
        let second = find_errors(entities, &identity, &params).unwrap();
        prop_assert!(first.is_empty(), "still broken: {:?}", first);
        prop_assert_eq!(first, second);
    }

    /// Stray edges never stop the faces from being classified.
    #[test]
    fn proptest_stray_edges_are_counted(
        sizes in arb_boxes(),
        strays in prop::collection::vec(prop::array::uniform3(-500.0..-100.0f64), 0..5),
    ) {
        let mut mesh = build_boxes(&sizes, [0.0; 3]);
        for p in &strays {
            let a = mesh.add_vertex(p[0], p[1], p[2]);
            let b = mesh.add_vertex(p[0] + 5.0, p[1], p[2]);
            mesh.add_edge(a, b).unwrap();
        }

        let report = inspect(
            &Entities::from_mesh(mesh),
            &Transform3::identity(),
            &InspectParams::default(),
        ).unwrap();

        prop_assert!(report.classified);
        prop_assert_eq!(report.count(DefectKind::StrayEdge), strays.len());
        prop_assert_eq!(report.defects.len(), strays.len());
    }
}
