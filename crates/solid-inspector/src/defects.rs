//! Typed defect diagnostics.
//!
//! Every defect carries the entities it is about. Whether and how a kind can
//! be fixed is static metadata on [`DefectKind`].

use serde::{Deserialize, Serialize};

use crate::types::{EdgeId, FaceId, ImageId, InstanceId};

/// Kind of a [`Defect`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    StrayEdge,
    SurfaceBorder,
    FaceHole,
    InternalFaceEdge,
    InternalFace,
    ExternalFace,
    ReversedFace,
    HiddenFace,
    NestedInstance,
    ImageEntity,
    ShortEdge,
}

/// How a defect kind gets fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixStrategy {
    /// Erased together with every other erasable defect in one host call.
    BulkErase,
    /// Face winding is reversed, materials swapped back.
    Reverse,
    /// Face is made visible.
    Unhide,
    /// Instance is replaced by its contents when explicitly enabled.
    Explode,
    /// Needs a person.
    Manual,
}

impl DefectKind {
    /// Every kind, in report order.
    pub const ALL: [DefectKind; 11] = [
        DefectKind::StrayEdge,
        DefectKind::SurfaceBorder,
        DefectKind::FaceHole,
        DefectKind::InternalFaceEdge,
        DefectKind::InternalFace,
        DefectKind::ExternalFace,
        DefectKind::ReversedFace,
        DefectKind::HiddenFace,
        DefectKind::NestedInstance,
        DefectKind::ImageEntity,
        DefectKind::ShortEdge,
    ];

    /// Identifier used in machine-readable output.
    pub fn type_name(self) -> &'static str {
        match self {
            DefectKind::StrayEdge => "stray_edge",
            DefectKind::SurfaceBorder => "surface_border",
            DefectKind::FaceHole => "face_hole",
            DefectKind::InternalFaceEdge => "internal_face_edge",
            DefectKind::InternalFace => "internal_face",
            DefectKind::ExternalFace => "external_face",
            DefectKind::ReversedFace => "reversed_face",
            DefectKind::HiddenFace => "hidden_face",
            DefectKind::NestedInstance => "nested_instance",
            DefectKind::ImageEntity => "image_entity",
            DefectKind::ShortEdge => "short_edge",
        }
    }

    /// Plural heading for reports.
    pub fn display_name(self) -> &'static str {
        match self {
            DefectKind::StrayEdge => "Stray Edges",
            DefectKind::SurfaceBorder => "Surface Borders",
            DefectKind::FaceHole => "Face Holes",
            DefectKind::InternalFaceEdge => "Internal Face Edges",
            DefectKind::InternalFace => "Internal Faces",
            DefectKind::ExternalFace => "External Faces",
            DefectKind::ReversedFace => "Reversed Faces",
            DefectKind::HiddenFace => "Hidden Faces",
            DefectKind::NestedInstance => "Nested Instances",
            DefectKind::ImageEntity => "Image Entities",
            DefectKind::ShortEdge => "Short Edges",
        }
    }

    /// What the defect means and why it breaks a solid.
    pub fn description(self) -> &'static str {
        match self {
            DefectKind::StrayEdge => {
                "Edges not bounding any face. They do not belong to a solid and can be erased."
            }
            DefectKind::SurfaceBorder => {
                "Chains of edges bounding only one face. The surface has an opening here; \
                 draw the missing faces to close it."
            }
            DefectKind::FaceHole => {
                "Holes cut into a face that do not continue into the solid. Erasing the hole \
                 edges closes the face."
            }
            DefectKind::InternalFaceEdge => {
                "Edges shared by more than two faces, usually where an internal face or a \
                 dangling flap meets the outer skin."
            }
            DefectKind::InternalFace => {
                "Faces enclosed inside the solid. They split the volume and can be erased."
            }
            DefectKind::ExternalFace => {
                "Faces hanging off the solid without enclosing volume. They can be erased."
            }
            DefectKind::ReversedFace => {
                "Faces wound against their neighbours, so their front points into the solid. \
                 They can be reversed."
            }
            DefectKind::HiddenFace => {
                "Hidden faces are easy to miss and are dropped by some exporters. They can be \
                 unhidden."
            }
            DefectKind::NestedInstance => {
                "Groups or components inside the solid are not part of its own geometry. \
                 Explode them or move them out."
            }
            DefectKind::ImageEntity => {
                "Images are flat entities that do not belong to a solid. Move them out."
            }
            DefectKind::ShortEdge => {
                "Edges shorter than the configured threshold. They often cause trouble for \
                 exporters and slicers and should be merged away by hand."
            }
        }
    }

    /// How this kind is fixed.
    pub fn fix_strategy(self) -> FixStrategy {
        match self {
            DefectKind::StrayEdge
            | DefectKind::FaceHole
            | DefectKind::InternalFace
            | DefectKind::ExternalFace => FixStrategy::BulkErase,
            DefectKind::ReversedFace => FixStrategy::Reverse,
            DefectKind::HiddenFace => FixStrategy::Unhide,
            DefectKind::NestedInstance => FixStrategy::Explode,
            DefectKind::SurfaceBorder
            | DefectKind::InternalFaceEdge
            | DefectKind::ImageEntity
            | DefectKind::ShortEdge => FixStrategy::Manual,
        }
    }

    /// Whether some automatic fix exists for this kind.
    pub fn is_fixable(self) -> bool {
        self.fix_strategy() != FixStrategy::Manual
    }

    /// Whether this kind is fixed by erasing its entities.
    pub fn is_bulk_erasable(self) -> bool {
        self.fix_strategy() == FixStrategy::BulkErase
    }
}

impl std::fmt::Display for DefectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Reference to one entity a defect is about.
///
/// Instances and images are addressed by their path through nested
/// definitions, starting at the inspected collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityRef {
    Edge { id: EdgeId },
    Face { id: FaceId },
    Instance { path: Vec<InstanceId> },
    Image { parent: Vec<InstanceId>, id: ImageId },
}

/// One diagnosed problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Defect {
    StrayEdge { edge: EdgeId },
    SurfaceBorder { edges: Vec<EdgeId> },
    FaceHole { edges: Vec<EdgeId> },
    InternalFaceEdge { edge: EdgeId },
    InternalFace { face: FaceId },
    ExternalFace { face: FaceId },
    ReversedFace { face: FaceId },
    HiddenFace { face: FaceId },
    NestedInstance { path: Vec<InstanceId> },
    ImageEntity { parent: Vec<InstanceId>, image: ImageId },
    /// `length` is measured after the inspection transform.
    ShortEdge { edge: EdgeId, length: f64 },
}

impl Defect {
    /// Kind of this defect.
    pub fn kind(&self) -> DefectKind {
        match self {
            Defect::StrayEdge { .. } => DefectKind::StrayEdge,
            Defect::SurfaceBorder { .. } => DefectKind::SurfaceBorder,
            Defect::FaceHole { .. } => DefectKind::FaceHole,
            Defect::InternalFaceEdge { .. } => DefectKind::InternalFaceEdge,
            Defect::InternalFace { .. } => DefectKind::InternalFace,
            Defect::ExternalFace { .. } => DefectKind::ExternalFace,
            Defect::ReversedFace { .. } => DefectKind::ReversedFace,
            Defect::HiddenFace { .. } => DefectKind::HiddenFace,
            Defect::NestedInstance { .. } => DefectKind::NestedInstance,
            Defect::ImageEntity { .. } => DefectKind::ImageEntity,
            Defect::ShortEdge { .. } => DefectKind::ShortEdge,
        }
    }

    /// Entities this defect refers to.
    pub fn entities(&self) -> Vec<EntityRef> {
        match self {
            Defect::StrayEdge { edge }
            | Defect::InternalFaceEdge { edge }
            | Defect::ShortEdge { edge, .. } => vec![EntityRef::Edge { id: *edge }],
            Defect::SurfaceBorder { edges } | Defect::FaceHole { edges } => {
                edges.iter().map(|&id| EntityRef::Edge { id }).collect()
            }
            Defect::InternalFace { face }
            | Defect::ExternalFace { face }
            | Defect::ReversedFace { face }
            | Defect::HiddenFace { face } => vec![EntityRef::Face { id: *face }],
            Defect::NestedInstance { path } => vec![EntityRef::Instance { path: path.clone() }],
            Defect::ImageEntity { parent, image } => vec![EntityRef::Image {
                parent: parent.clone(),
                id: *image,
            }],
        }
    }
}

fn fmt_path(path: &[InstanceId]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

impl std::fmt::Display for Defect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Defect::StrayEdge { edge } => write!(f, "stray edge {}", edge),
            Defect::SurfaceBorder { edges } => {
                write!(f, "surface border of {} edges", edges.len())
            }
            Defect::FaceHole { edges } => write!(f, "face hole of {} edges", edges.len()),
            Defect::InternalFaceEdge { edge } => write!(f, "internal face edge {}", edge),
            Defect::InternalFace { face } => write!(f, "internal face {}", face),
            Defect::ExternalFace { face } => write!(f, "external face {}", face),
            Defect::ReversedFace { face } => write!(f, "reversed face {}", face),
            Defect::HiddenFace { face } => write!(f, "hidden face {}", face),
            Defect::NestedInstance { path } => write!(f, "nested instance {}", fmt_path(path)),
            Defect::ImageEntity { parent, image } if parent.is_empty() => {
                write!(f, "image {}", image)
            }
            Defect::ImageEntity { parent, image } => {
                write!(f, "image {} in instance {}", image, fmt_path(parent))
            }
            Defect::ShortEdge { edge, length } => {
                write!(f, "short edge {} ({:.3} mm)", edge, length)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_erasable_kinds() {
        let erasable: Vec<_> = DefectKind::ALL
            .iter()
            .copied()
            .filter(|k| k.is_bulk_erasable())
            .collect();
        assert_eq!(
            erasable,
            vec![
                DefectKind::StrayEdge,
                DefectKind::FaceHole,
                DefectKind::InternalFace,
                DefectKind::ExternalFace,
            ]
        );
        assert!(!DefectKind::SurfaceBorder.is_fixable());
        assert!(DefectKind::ReversedFace.is_fixable());
    }

    #[test]
    fn test_kind_and_entities() {
        let d = Defect::SurfaceBorder {
            edges: vec![EdgeId(1), EdgeId(2), EdgeId(3)],
        };
        assert_eq!(d.kind(), DefectKind::SurfaceBorder);
        assert_eq!(d.entities().len(), 3);

        let d = Defect::ImageEntity {
            parent: vec![InstanceId(0)],
            image: ImageId(2),
        };
        assert_eq!(d.to_string(), "image 2 in instance 0");
    }

    #[test]
    fn test_serialized_shape() {
        for kind in DefectKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.type_name()));
        }

        let d = Defect::ShortEdge {
            edge: EdgeId(7),
            length: 0.5,
        };
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["kind"], "short_edge");
        assert_eq!(value["edge"], 7);
    }
}
