//! Applying fixes through a host [`Document`].
//!
//! Erasable defects are coalesced into a single erase call; the rest are
//! fixed one at a time. Everything happens inside one host operation which
//! is committed even if the host fails part way.

use hashbrown::HashSet;
use tracing::{debug, warn};

use crate::adjacency::MeshGraph;
use crate::defects::{Defect, DefectKind, EntityRef};
use crate::document::Document;
use crate::error::{FixError, InspectResult};
use crate::params::FixParams;
use crate::tracing_ext::{OperationTimer, log_fix_report};
use crate::types::{FaceId, FaceSide};

/// Name of the host operation wrapping a batch of fixes.
pub const FIX_OPERATION_NAME: &str = "Fix Solid";

/// What a successful fix did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixOutcome {
    Erased,
    Reversed,
    Unhidden,
    Exploded,
}

/// Summary of one [`fix_errors`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixReport {
    /// Entities passed to the bulk erase, orphaned edges included.
    pub erased: usize,
    /// Edges erased because every face using them was erased.
    pub orphan_edges: usize,
    pub reversed: usize,
    pub unhidden: usize,
    pub exploded: usize,
    /// Defects that were not fixed.
    pub failures: Vec<FixError>,
}

impl FixReport {
    /// Whether every defect was fixed.
    pub fn is_fully_fixed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Kinds that still need a person, in report order.
    pub fn manual_attention(&self) -> Vec<DefectKind> {
        let mut kinds: Vec<DefectKind> = self.failures.iter().map(FixError::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }

    fn record(&mut self, result: Result<FixOutcome, FixError>) {
        match result {
            Ok(FixOutcome::Erased) => self.erased += 1,
            Ok(FixOutcome::Reversed) => self.reversed += 1,
            Ok(FixOutcome::Unhidden) => self.unhidden += 1,
            Ok(FixOutcome::Exploded) => self.exploded += 1,
            Err(e) => {
                debug!(error = %e, "Defect left unfixed");
                self.failures.push(e);
            }
        }
    }
}

/// Run `f` inside a host operation, committing whatever the outcome.
pub fn with_operation<D, T, F>(document: &mut D, name: &str, f: F) -> InspectResult<T>
where
    D: Document + ?Sized,
    F: FnOnce(&mut D) -> InspectResult<T>,
{
    document.start_operation(name);
    let result = f(document);
    document.commit_operation();
    if let Err(e) = &result {
        warn!(operation = name, error = %e, "Operation failed, partial changes committed");
    }
    result
}

/// Fix `defects` in `document`.
///
/// Defects whose entities are already gone are skipped by the bulk erase
/// and reported as [`FixError::EntityGone`] otherwise. A host error aborts
/// the batch and is returned after the operation is committed.
pub fn fix_errors<D: Document + ?Sized>(
    defects: &[Defect],
    document: &mut D,
    params: &FixParams,
) -> InspectResult<FixReport> {
    let _timer = OperationTimer::new("fix");
    let mut report = FixReport::default();

    with_operation(document, FIX_OPERATION_NAME, |doc| {
        let erase = erase_set(defects, &*doc, &mut report);
        if !erase.is_empty() {
            doc.erase_entities(&erase)?;
            report.erased = erase.len();
        }
        for defect in defects.iter().filter(|d| !d.kind().is_bulk_erasable()) {
            let result = fix_defect(defect, doc, params)?;
            report.record(result);
        }
        Ok(())
    })?;

    log_fix_report(&report);
    Ok(report)
}

/// Entities of every erasable defect that still exist, plus edges left
/// without faces once those go.
fn erase_set<D: Document + ?Sized>(
    defects: &[Defect],
    doc: &D,
    report: &mut FixReport,
) -> Vec<EntityRef> {
    let mut seen: HashSet<EntityRef> = HashSet::new();
    let mut erase = Vec::new();
    for defect in defects.iter().filter(|d| d.kind().is_bulk_erasable()) {
        for entity in defect.entities() {
            if doc.is_valid_entity(&entity) && seen.insert(entity.clone()) {
                erase.push(entity);
            }
        }
    }

    let mut faces: Vec<FaceId> = erase
        .iter()
        .filter_map(|e| match e {
            EntityRef::Face { id } => Some(*id),
            _ => None,
        })
        .collect();
    if faces.is_empty() {
        return erase;
    }
    faces.sort_unstable();
    let erased_faces: HashSet<FaceId> = faces.iter().copied().collect();
    let graph = MeshGraph::build(&doc.entities().mesh);
    for face in faces {
        for edge_use in graph.face_edges(face) {
            let users = graph.edge_faces(edge_use.edge);
            let orphan = users.iter().all(|f| erased_faces.contains(f));
            let entity = EntityRef::Edge { id: edge_use.edge };
            if orphan && seen.insert(entity.clone()) {
                erase.push(entity);
                report.orphan_edges += 1;
            }
        }
    }
    erase
}

/// Fix one non-erasable defect.
///
/// The outer result carries host failures; the inner one says whether this
/// defect could be fixed at all.
pub fn fix_defect<D: Document + ?Sized>(
    defect: &Defect,
    doc: &mut D,
    params: &FixParams,
) -> InspectResult<Result<FixOutcome, FixError>> {
    let kind = defect.kind();
    if !defect.entities().iter().all(|e| doc.is_valid_entity(e)) {
        return Ok(Err(FixError::EntityGone { kind }));
    }
    match defect {
        Defect::ReversedFace { face } => {
            let (front, back) = doc.face_materials(*face).unwrap_or_default();
            doc.reverse_face(*face)?;
            // Keep paint on the same physical side.
            doc.apply_material(*face, FaceSide::Front, back)?;
            doc.apply_material(*face, FaceSide::Back, front)?;
            Ok(Ok(FixOutcome::Reversed))
        }
        Defect::HiddenFace { face } => {
            doc.unhide_face(*face)?;
            Ok(Ok(FixOutcome::Unhidden))
        }
        Defect::NestedInstance { path } if params.explode_nested_instances => {
            doc.explode_instance(path)?;
            Ok(Ok(FixOutcome::Exploded))
        }
        _ if kind.is_bulk_erasable() => {
            doc.erase_entities(&defect.entities())?;
            Ok(Ok(FixOutcome::Erased))
        }
        _ => Ok(Err(FixError::NotImplemented { kind })),
    }
}
