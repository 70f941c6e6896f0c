//! Face classification into shell, internal, external and reversed faces.
//!
//! Two shell passes run per geometry group. The outward pass walks the outer
//! skin; every face it never reaches is internal. The inward pass, with the
//! internal faces removed, walks the skin from the other side. Faces reached
//! by both passes form the shell; the rest are dangling external faces.

use hashbrown::HashSet;
use tracing::{debug, info, warn};

use crate::adjacency::MeshGraph;
use crate::components::{GeometryGroup, partition};
use crate::error::InspectError;
use crate::shell::resolve_shell;
use crate::types::FaceId;

/// Result of classifying every face of a mesh.
#[derive(Debug, Default)]
pub struct Classification {
    /// Faces on a closed, consistently oriented shell.
    pub shell: HashSet<FaceId>,
    /// Faces enclosed by the shell.
    pub internal: HashSet<FaceId>,
    /// Faces hanging off the shell.
    pub external: HashSet<FaceId>,
    /// Shell faces whose winding disagrees with their neighbours.
    pub reversed: HashSet<FaceId>,
    /// Groups that could not be resolved. Their faces are in no set.
    pub failures: Vec<InspectError>,
    valid: bool,
}

impl Classification {
    /// Whether the shell is non-empty and closed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Sorted internal faces.
    pub fn internal_faces(&self) -> Vec<FaceId> {
        sorted(&self.internal)
    }

    /// Sorted external faces.
    pub fn external_faces(&self) -> Vec<FaceId> {
        sorted(&self.external)
    }

    /// Sorted reversed faces.
    pub fn reversed_faces(&self) -> Vec<FaceId> {
        sorted(&self.reversed)
    }
}

fn sorted(set: &HashSet<FaceId>) -> Vec<FaceId> {
    let mut faces: Vec<FaceId> = set.iter().copied().collect();
    faces.sort_unstable();
    faces
}

/// Classify all faces of the mesh behind `graph`.
pub fn classify(graph: &MeshGraph<'_>) -> Classification {
    let groups: Vec<GeometryGroup> = partition(graph).collect();
    classify_groups(graph, &groups)
}

/// Classify faces group by group.
///
/// A group whose resolution fails is abandoned; the other groups are
/// classified as usual.
pub fn classify_groups(graph: &MeshGraph<'_>, groups: &[GeometryGroup]) -> Classification {
    let mut result = Classification::default();
    let mut abandoned = vec![false; groups.len()];
    let none = HashSet::new();

    let mut shell_front: HashSet<FaceId> = HashSet::new();
    let mut flipped_front: HashSet<FaceId> = HashSet::new();
    let mut front = Vec::with_capacity(groups.len());
    for (i, group) in groups.iter().enumerate() {
        match resolve_shell(graph, group, true, &none) {
            Ok(shell) => front.push(Some(shell)),
            Err(e) => {
                warn!(group = i, error = %e, "Abandoning geometry group in outward pass");
                abandoned[i] = true;
                result.failures.push(e);
                front.push(None);
            }
        }
    }

    let mut internal: HashSet<FaceId> = HashSet::new();
    for (group, shell) in groups.iter().zip(&front) {
        if let Some(shell) = shell {
            internal.extend(group.faces.iter().filter(|f| !shell.faces.contains(*f)));
        }
    }

    let mut shell_back: HashSet<FaceId> = HashSet::new();
    for (i, group) in groups.iter().enumerate() {
        if abandoned[i] {
            continue;
        }
        match resolve_shell(graph, group, false, &internal) {
            Ok(shell) => shell_back.extend(shell.faces),
            Err(e) => {
                warn!(group = i, error = %e, "Abandoning geometry group in inward pass");
                abandoned[i] = true;
                result.failures.push(e);
            }
        }
    }

    for (i, (group, shell)) in groups.iter().zip(front).enumerate() {
        if abandoned[i] {
            for f in &group.faces {
                internal.remove(f);
            }
            continue;
        }
        if let Some(shell) = shell {
            shell_front.extend(shell.faces);
            flipped_front.extend(shell.flipped);
        }
    }

    let live: HashSet<FaceId> = groups
        .iter()
        .zip(&abandoned)
        .filter(|(_, gone)| !**gone)
        .flat_map(|(g, _)| g.faces.iter().copied())
        .collect();

    result.shell = shell_front.intersection(&shell_back).copied().collect();
    result.external = live
        .iter()
        .filter(|f| !internal.contains(*f) && !result.shell.contains(*f))
        .copied()
        .collect();
    result.reversed = result
        .shell
        .intersection(&flipped_front)
        .copied()
        .collect();
    result.internal = internal;
    result.valid = !result.shell.is_empty() && is_closed_shell(graph, &result.shell);

    debug!(
        shell = result.shell.len(),
        internal = result.internal.len(),
        external = result.external.len(),
        reversed = result.reversed.len(),
        "Classified faces"
    );
    if !result.failures.is_empty() {
        info!(
            "{} of {} geometry groups could not be resolved",
            result.failures.len(),
            groups.len()
        );
    }
    result
}

/// Whether every edge of every face in `shell` is shared by at least two
/// faces of `shell`.
pub fn is_closed_shell(graph: &MeshGraph<'_>, shell: &HashSet<FaceId>) -> bool {
    shell.iter().all(|&face| {
        graph.face_edges(face).iter().all(|u| {
            graph
                .edge_faces(u.edge)
                .iter()
                .filter(|f| shell.contains(*f))
                .count()
                > 1
        })
    })
}
