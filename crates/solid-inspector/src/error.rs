//! Error types for solid inspection with rich diagnostics.
//!
//! This module provides:
//! - Machine-readable error codes for programmatic handling
//! - Context about which edge, face or file was involved
//! - Recovery suggestions for common issues
//! - Terminal display via miette
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `SOLID-XXXX`:
//! - `SOLID-1xxx`: I/O errors (file reading, writing, parsing)
//! - `SOLID-2xxx`: Input validation errors (dangling references, coordinates)
//! - `SOLID-3xxx`: Geometry errors (degenerate input during shell resolution)
//! - `SOLID-4xxx`: Fix errors (host document failures)
//!
//! # Example
//!
//! ```
//! use solid_inspector::{ErrorCode, InspectError};
//!
//! let err = InspectError::invalid_entities("face 3 references erased edge 7");
//! assert_eq!(err.code(), ErrorCode::InvalidEntities);
//! assert_eq!(err.code().as_str(), "SOLID-2001");
//! ```

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::defects::DefectKind;
use crate::types::{EdgeId, FaceId};

/// Result type alias for inspection operations.
pub type InspectResult<T> = Result<T, InspectError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // I/O errors (1xxx)
    /// SOLID-1001: Failed to read file
    IoRead = 1001,
    /// SOLID-1002: Failed to write file
    IoWrite = 1002,
    /// SOLID-1003: Failed to parse file
    ParseError = 1003,

    // Input validation errors (2xxx)
    /// SOLID-2001: The entity collection has dangling or malformed references
    InvalidEntities = 2001,
    /// SOLID-2002: Vertex has NaN or Infinity coordinate
    InvalidCoordinate = 2002,

    // Geometry errors (3xxx)
    /// SOLID-3001: Tie-break comparison undefined on degenerate geometry
    DegenerateGeometry = 3001,

    // Fix errors (4xxx)
    /// SOLID-4001: The host document rejected a mutation
    HostFailure = 4001,
    /// SOLID-4002: Configuration could not be loaded
    InvalidConfig = 4002,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `SOLID-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "SOLID-1001",
            ErrorCode::IoWrite => "SOLID-1002",
            ErrorCode::ParseError => "SOLID-1003",
            ErrorCode::InvalidEntities => "SOLID-2001",
            ErrorCode::InvalidCoordinate => "SOLID-2002",
            ErrorCode::DegenerateGeometry => "SOLID-3001",
            ErrorCode::HostFailure => "SOLID-4001",
            ErrorCode::InvalidConfig => "SOLID-4002",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for inspection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Check the source file or model.
    CheckSource { checks: Vec<String> },
    /// Clean up the listed geometry by hand and inspect again.
    ManualCleanup { description: String },
    /// Scale the model up so tiny geometry stays above float precision.
    ScaleModel { factor: u32 },
    /// No automatic recovery available.
    None,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::CheckSource { checks } => {
                write!(f, "Check the source for: {}", checks.join(", "))
            }
            RecoverySuggestion::ManualCleanup { description } => write!(f, "{}", description),
            RecoverySuggestion::ScaleModel { factor } => {
                write!(f, "Try scaling the model up by {} and inspecting again", factor)
            }
            RecoverySuggestion::None => write!(f, "No automatic recovery available"),
        }
    }
}

/// Location information for inspection errors.
#[derive(Debug, Clone)]
pub enum EntityLocation {
    /// Error at a specific edge.
    Edge(EdgeId),
    /// Error at a specific face.
    Face(FaceId),
    /// Error in a file.
    File { path: PathBuf },
}

impl std::fmt::Display for EntityLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityLocation::Edge(edge) => write!(f, "edge {}", edge),
            EntityLocation::Face(face) => write!(f, "face {}", face),
            EntityLocation::File { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Errors that can occur while inspecting or fixing a solid.
#[derive(Debug, Error, Diagnostic)]
pub enum InspectError {
    /// A model file could not be read.
    #[error("cannot read model file {path}")]
    #[diagnostic(
        code(solid::io::read),
        help("Check the path and that the file is readable")
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A model file could not be written.
    #[error("cannot write model file {path}")]
    #[diagnostic(
        code(solid::io::write),
        help("Check that the output directory exists and can be written")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An OBJ file could not be parsed.
    #[error("malformed OBJ data in {path}: {details}")]
    #[diagnostic(
        code(solid::parse::error),
        help("The file may be corrupted. Try re-exporting it as a polygon OBJ.")
    )]
    ParseError { path: PathBuf, details: String },

    /// The entity collection is malformed.
    #[error("invalid entity collection: {details}")]
    #[diagnostic(
        code(solid::input::entities),
        help("Every loop must reference live edges and every edge live vertices.")
    )]
    InvalidEntities { details: String },

    /// A vertex position is not finite.
    #[error("invalid coordinate at vertex {vertex_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(solid::input::coordinate),
        help("Check the source data for numerical issues.")
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// A shell-resolution comparison was undefined.
    #[error("degenerate geometry: {details}")]
    #[diagnostic(
        code(solid::geometry::degenerate),
        help(
            "Zero-length edges or collapsed faces make the orientation ambiguous. Remove them or scale the model up and inspect again."
        )
    )]
    DegenerateGeometry {
        details: String,
        edge: Option<EdgeId>,
        face: Option<FaceId>,
    },

    /// The host document failed while applying a fix.
    #[error("host document failed during '{operation}': {details}")]
    #[diagnostic(
        code(solid::fix::host),
        help("The operation was committed up to the failure. Undo it in the host if needed.")
    )]
    HostFailure { operation: String, details: String },

    /// Configuration could not be read.
    #[error("invalid configuration: {details}")]
    #[diagnostic(code(solid::config::invalid))]
    InvalidConfig { details: String },
}

impl InspectError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            InspectError::IoRead { .. } => ErrorCode::IoRead,
            InspectError::IoWrite { .. } => ErrorCode::IoWrite,
            InspectError::ParseError { .. } => ErrorCode::ParseError,
            InspectError::InvalidEntities { .. } => ErrorCode::InvalidEntities,
            InspectError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            InspectError::DegenerateGeometry { .. } => ErrorCode::DegenerateGeometry,
            InspectError::HostFailure { .. } => ErrorCode::HostFailure,
            InspectError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            InspectError::IoRead { .. } => RecoverySuggestion::CheckSource {
                checks: vec!["input path".into(), "read access".into()],
            },
            InspectError::IoWrite { .. } => RecoverySuggestion::CheckSource {
                checks: vec!["output directory".into(), "write access".into()],
            },
            InspectError::ParseError { .. } => RecoverySuggestion::CheckSource {
                checks: vec!["OBJ syntax".into(), "face indices".into()],
            },
            InspectError::InvalidEntities { .. } => RecoverySuggestion::CheckSource {
                checks: vec!["erased entities still referenced".into()],
            },
            InspectError::InvalidCoordinate { .. } => RecoverySuggestion::CheckSource {
                checks: vec!["NaN or infinite vertex positions".into()],
            },
            InspectError::DegenerateGeometry { .. } => RecoverySuggestion::ScaleModel { factor: 10 },
            InspectError::HostFailure { .. } => RecoverySuggestion::ManualCleanup {
                description: "Inspect the model again and fix the remaining defects by hand".into(),
            },
            InspectError::InvalidConfig { .. } => RecoverySuggestion::None,
        }
    }

    /// Returns location information if available.
    pub fn location(&self) -> Option<EntityLocation> {
        match self {
            InspectError::DegenerateGeometry {
                edge: Some(edge), ..
            } => Some(EntityLocation::Edge(*edge)),
            InspectError::DegenerateGeometry {
                face: Some(face), ..
            } => Some(EntityLocation::Face(*face)),
            InspectError::IoRead { path, .. }
            | InspectError::IoWrite { path, .. }
            | InspectError::ParseError { path, .. } => {
                Some(EntityLocation::File { path: path.clone() })
            }
            _ => None,
        }
    }

    /// Create an InvalidEntities error.
    pub fn invalid_entities(details: impl Into<String>) -> Self {
        InspectError::InvalidEntities {
            details: details.into(),
        }
    }

    /// Create a DegenerateGeometry error at an edge.
    pub fn degenerate_edge(edge: EdgeId, details: impl Into<String>) -> Self {
        InspectError::DegenerateGeometry {
            details: details.into(),
            edge: Some(edge),
            face: None,
        }
    }

    /// Create a DegenerateGeometry error at a face.
    pub fn degenerate_face(face: FaceId, details: impl Into<String>) -> Self {
        InspectError::DegenerateGeometry {
            details: details.into(),
            edge: None,
            face: Some(face),
        }
    }

    /// Create a HostFailure error.
    pub fn host_failure(operation: impl Into<String>, details: impl Into<String>) -> Self {
        InspectError::HostFailure {
            operation: operation.into(),
            details: details.into(),
        }
    }

    /// Create a ParseError.
    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        InspectError::ParseError {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Whether this error came from degenerate geometry.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, InspectError::DegenerateGeometry { .. })
    }
}

/// Why a single defect could not be fixed automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    /// The defect kind has no automatic fix.
    #[error("{} cannot be fixed automatically", kind.display_name())]
    NotImplemented { kind: DefectKind },
    /// The offending entity no longer exists.
    #[error("{} refers to an entity that was already erased", kind.display_name())]
    EntityGone { kind: DefectKind },
}

impl FixError {
    /// The defect kind that failed.
    pub fn kind(&self) -> DefectKind {
        match self {
            FixError::NotImplemented { kind } | FixError::EntityGone { kind } => *kind,
        }
    }
}
