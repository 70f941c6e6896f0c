//! Solid inspection for CAD polygon meshes.
//!
//! This crate checks whether a polygon mesh forms a valid solid (a closed,
//! consistently oriented 2-manifold) and reports every problem as a typed
//! [`Defect`]. Where a fix is well defined it can be applied through a host
//! [`Document`].
//!
//! # What gets reported
//!
//! - **Edges**: stray edges, open surface borders, holes in faces, edges
//!   shared by more than two faces
//! - **Faces**: internal faces, external flaps, reversed faces, hidden faces
//! - **Entities**: nested instances and images that do not belong in a solid
//! - **Short edges**: below a threshold, measured in model space
//!
//! # How it works
//!
//! The mesh is split into edge-connected geometry groups. For every group
//! the outer skin is walked twice from its topmost face, once seeded outward
//! and once inward. Where an edge carries more than two faces, the walk
//! follows the face that wraps most tightly around the current one. Faces
//! missed by the outward walk are internal; faces reached by only one walk
//! are external; skin faces that had to be flipped to agree with the seed
//! are reversed.
//!
//! # Units and Coordinate System
//!
//! Coordinates are millimeters by convention; the default short-edge
//! threshold is 3 mm. Z is up. Face winding is counter-clockwise when seen
//! from outside the solid.
//!
//! # Quick Start
//!
//! ```
//! use nalgebra::Transform3;
//! use solid_inspector::{DefectKind, Document, Entities, FixParams, InspectParams, Mesh, Model};
//! use solid_inspector::{find_errors, fix_errors};
//!
//! let mut mesh = Mesh::new();
//! let v: Vec<_> = [
//!     (0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (10.0, 10.0, 0.0), (0.0, 10.0, 0.0),
//!     (0.0, 0.0, 10.0), (10.0, 0.0, 10.0), (10.0, 10.0, 10.0), (0.0, 10.0, 10.0),
//! ]
//! .iter()
//! .map(|&(x, y, z)| mesh.add_vertex(x, y, z))
//! .collect();
//! for q in [[0, 3, 2, 1], [4, 5, 6, 7], [0, 1, 5, 4], [1, 2, 6, 5], [2, 3, 7, 6], [3, 0, 4, 7]] {
//!     mesh.add_face(&q.map(|i| v[i])).unwrap();
//! }
//! // Flip one side of the box.
//! let side = mesh.faces().nth(3).map(|(id, _)| id).unwrap();
//! mesh.reverse_face(side);
//!
//! let mut model = Model::new(Entities::from_mesh(mesh));
//! let identity = Transform3::identity();
//! let defects = find_errors(model.entities(), &identity, &InspectParams::default()).unwrap();
//! assert_eq!(defects.len(), 1);
//! assert_eq!(defects[0].kind(), DefectKind::ReversedFace);
//!
//! let report = fix_errors(&defects, &mut model, &FixParams::default()).unwrap();
//! assert!(report.is_fully_fixed());
//! assert!(find_errors(model.entities(), &identity, &InspectParams::default()).unwrap().is_empty());
//! ```
//!
//! # Features
//!
//! - `config`: load [`InspectParams`] from TOML files

pub mod adjacency;
pub mod classify;
pub mod components;
pub mod defects;
pub mod document;
mod error;
pub mod fix;
pub mod geometry;
pub mod inspect;
pub mod io;
pub mod params;
pub mod progress;
pub mod shell;
pub mod tracing_ext;
mod types;
pub mod validate;

pub use adjacency::MeshGraph;
pub use classify::{Classification, classify};
pub use components::{GeometryGroup, partition};
pub use defects::{Defect, DefectKind, EntityRef, FixStrategy};
pub use document::{Document, Model};
pub use error::{
    EntityLocation, ErrorCode, FixError, InspectError, InspectResult, RecoverySuggestion,
};
pub use fix::{FixOutcome, FixReport, fix_errors};
pub use inspect::{
    InspectionReport, Inspector, TopologyStats, find_errors, inspect, inspect_with_status,
};
pub use io::{load_obj, save_obj};
pub use params::{FixParams, InspectParams};
pub use progress::StatusSink;
pub use shell::{Shell, resolve_shell};
pub use types::{
    Edge, EdgeId, EdgeUse, Entities, Face, FaceId, FaceSide, Image, ImageId, Instance,
    InstanceId, Loop, Material, Mesh, UvMapping, Vertex, VertexId,
};

// Re-export nalgebra types hosts need to build meshes and transforms.
pub use nalgebra::{Point3, Transform3, Vector3};
