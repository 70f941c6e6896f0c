//! Host document interface used for fixes.
//!
//! The inspector reads entities directly and only ever writes through a
//! [`Document`]. All writes happen between [`Document::start_operation`] and
//! [`Document::commit_operation`] so a host can undo a batch of fixes in one
//! step. [`Model`] is the in-memory implementation.

use tracing::debug;

use crate::defects::EntityRef;
use crate::error::{InspectError, InspectResult};
use crate::types::{Entities, FaceId, FaceSide, InstanceId, Material};

/// A host document the fixer can mutate.
pub trait Document {
    /// Current state of the inspected collection.
    fn entities(&self) -> &Entities;

    /// Open an undoable operation.
    fn start_operation(&mut self, name: &str);

    /// Close the open operation.
    fn commit_operation(&mut self);

    /// Erase entities in one call. Erasing follows [`crate::Mesh`] rules.
    fn erase_entities(&mut self, entities: &[EntityRef]) -> InspectResult<()>;

    /// Reverse the winding of a face.
    fn reverse_face(&mut self, face: FaceId) -> InspectResult<()>;

    /// Set or clear the material on one side of a face.
    fn apply_material(
        &mut self,
        face: FaceId,
        side: FaceSide,
        material: Option<Material>,
    ) -> InspectResult<()>;

    /// Make a hidden face visible.
    fn unhide_face(&mut self, face: FaceId) -> InspectResult<()>;

    /// Replace a nested instance by its contents.
    fn explode_instance(&mut self, path: &[InstanceId]) -> InspectResult<()>;

    /// Front and back materials of a face.
    fn face_materials(&self, face: FaceId) -> Option<(Option<Material>, Option<Material>)> {
        self.entities()
            .mesh
            .face(face)
            .map(|f| (f.front_material.clone(), f.back_material.clone()))
    }

    /// Whether the entity still exists.
    fn is_valid_entity(&self, entity: &EntityRef) -> bool {
        let entities = self.entities();
        match entity {
            EntityRef::Edge { id } => entities.mesh.edge(*id).is_some(),
            EntityRef::Face { id } => entities.mesh.face(*id).is_some(),
            EntityRef::Instance { path } => {
                !path.is_empty() && entities.descend(path).is_some()
            }
            EntityRef::Image { parent, id } => entities
                .descend(parent)
                .is_some_and(|e| e.image(*id).is_some()),
        }
    }
}

/// In-memory document over one entity collection.
#[derive(Debug, Default)]
pub struct Model {
    entities: Entities,
    undo_stack: Vec<String>,
    active: Option<String>,
}

impl Model {
    /// Wrap an entity collection.
    pub fn new(entities: Entities) -> Self {
        Self {
            entities,
            ..Default::default()
        }
    }

    /// Names of committed operations, oldest first.
    pub fn undo_stack(&self) -> &[String] {
        &self.undo_stack
    }

    /// Whether an operation is open.
    pub fn is_operation_open(&self) -> bool {
        self.active.is_some()
    }

    /// Give back the entity collection.
    pub fn into_entities(self) -> Entities {
        self.entities
    }

    fn require_operation(&self, action: &str) -> InspectResult<()> {
        if self.active.is_none() {
            return Err(InspectError::host_failure(
                action,
                "entities can only change inside an operation",
            ));
        }
        Ok(())
    }
}

impl Document for Model {
    fn entities(&self) -> &Entities {
        &self.entities
    }

    fn start_operation(&mut self, name: &str) {
        if let Some(previous) = self.active.replace(name.to_string()) {
            debug!(previous = %previous, "Implicitly committing open operation");
            self.undo_stack.push(previous);
        }
    }

    fn commit_operation(&mut self) {
        if let Some(name) = self.active.take() {
            self.undo_stack.push(name);
        }
    }

    fn erase_entities(&mut self, entities: &[EntityRef]) -> InspectResult<()> {
        self.require_operation("erase")?;
        for entity in entities {
            match entity {
                EntityRef::Edge { id } => {
                    self.entities.mesh.erase_edge(*id);
                }
                EntityRef::Face { id } => {
                    self.entities.mesh.erase_face(*id);
                }
                EntityRef::Instance { path } => {
                    if let Some((last, parent)) = path.split_last()
                        && let Some(owner) = self.entities.descend_mut(parent)
                    {
                        owner.erase_instance(*last);
                    }
                }
                EntityRef::Image { parent, id } => {
                    if let Some(owner) = self.entities.descend_mut(parent) {
                        owner.erase_image(*id);
                    }
                }
            }
        }
        Ok(())
    }

    fn reverse_face(&mut self, face: FaceId) -> InspectResult<()> {
        self.require_operation("reverse face")?;
        if self.entities.mesh.reverse_face(face) {
            Ok(())
        } else {
            Err(InspectError::host_failure(
                "reverse face",
                format!("face {} does not exist", face),
            ))
        }
    }

    fn apply_material(
        &mut self,
        face: FaceId,
        side: FaceSide,
        material: Option<Material>,
    ) -> InspectResult<()> {
        self.require_operation("apply material")?;
        let f = self.entities.mesh.face_mut(face).ok_or_else(|| {
            InspectError::host_failure("apply material", format!("face {} does not exist", face))
        })?;
        match side {
            FaceSide::Front => f.front_material = material,
            FaceSide::Back => f.back_material = material,
        }
        Ok(())
    }

    fn unhide_face(&mut self, face: FaceId) -> InspectResult<()> {
        self.require_operation("unhide face")?;
        let f = self.entities.mesh.face_mut(face).ok_or_else(|| {
            InspectError::host_failure("unhide face", format!("face {} does not exist", face))
        })?;
        f.hidden = false;
        Ok(())
    }

    fn explode_instance(&mut self, path: &[InstanceId]) -> InspectResult<()> {
        self.require_operation("explode instance")?;
        let exploded = path.split_last().is_some_and(|(last, parent)| {
            self.entities
                .descend_mut(parent)
                .is_some_and(|owner| owner.explode_instance(*last))
        });
        if exploded {
            Ok(())
        } else {
            Err(InspectError::host_failure(
                "explode instance",
                "instance does not exist",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Instance, Mesh};

    fn triangle_model() -> (Model, FaceId) {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(0.0, 0.0, 0.0);
        let b = mesh.add_vertex(1.0, 0.0, 0.0);
        let c = mesh.add_vertex(0.0, 1.0, 0.0);
        let f = mesh.add_face(&[a, b, c]).unwrap();
        (Model::new(Entities::from_mesh(mesh)), f)
    }

    #[test]
    fn test_mutation_requires_operation() {
        let (mut model, face) = triangle_model();
        assert!(model.reverse_face(face).is_err());

        model.start_operation("Fix");
        model.reverse_face(face).unwrap();
        model.commit_operation();
        assert_eq!(model.undo_stack(), &["Fix".to_string()]);
        assert!(!model.is_operation_open());
    }

    #[test]
    fn test_materials_round_trip() {
        let (mut model, face) = triangle_model();
        model.start_operation("Paint");
        model
            .apply_material(face, FaceSide::Back, Some(Material::named("Steel")))
            .unwrap();
        model.commit_operation();
        let (front, back) = model.face_materials(face).unwrap();
        assert!(front.is_none());
        assert_eq!(back.unwrap().name, "Steel");
    }

    #[test]
    fn test_is_valid_entity_tracks_erasure() {
        let (mut model, face) = triangle_model();
        let entity = EntityRef::Face { id: face };
        assert!(model.is_valid_entity(&entity));
        model.start_operation("Erase");
        model.erase_entities(std::slice::from_ref(&entity)).unwrap();
        model.commit_operation();
        assert!(!model.is_valid_entity(&entity));
    }

    #[test]
    fn test_explode_nested_path() {
        let mut inner = Entities::new();
        inner.add_instance(Instance::new("leaf", Entities::new()));
        let mut root = Entities::new();
        let outer = root.add_instance(Instance::new("outer", inner));
        let mut model = Model::new(root);

        model.start_operation("Explode");
        model.explode_instance(&[outer, InstanceId(0)]).unwrap();
        assert!(model.explode_instance(&[]).is_err());
        model.commit_operation();
        assert!(model.entities().descend(&[outer]).unwrap().instances().next().is_none());
    }
}
