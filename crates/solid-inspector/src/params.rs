//! Inspection and fix parameters.

use serde::{Deserialize, Serialize};

#[cfg(feature = "config")]
use crate::error::{InspectError, InspectResult};

/// Parameters for [`crate::inspect`].
///
/// # Example
///
/// ```
/// use solid_inspector::InspectParams;
///
/// let params = InspectParams {
///     short_edge_threshold: 0.5,
///     ..InspectParams::for_printing()
/// };
/// assert!(params.detect_short_edges);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectParams {
    /// Report edges shorter than [`Self::short_edge_threshold`].
    ///
    /// Default: `false`
    pub detect_short_edges: bool,

    /// Length below which an edge counts as short, in model units after the
    /// inspection transform is applied.
    ///
    /// Default: `3.0` (mm)
    pub short_edge_threshold: f64,

    /// Look for instances and images inside visible nested definitions too.
    ///
    /// Default: `false`
    pub search_nested_instances: bool,

    /// Report hidden faces.
    ///
    /// Default: `true`
    pub detect_hidden_faces: bool,

    /// Log per-phase detail at info level.
    ///
    /// Default: `false`
    pub debug: bool,
}

impl Default for InspectParams {
    fn default() -> Self {
        Self {
            detect_short_edges: false,
            short_edge_threshold: 3.0,
            search_nested_instances: false,
            detect_hidden_faces: true,
            debug: false,
        }
    }
}

impl InspectParams {
    /// Preset for models headed to a slicer: short edges are reported.
    pub fn for_printing() -> Self {
        Self {
            detect_short_edges: true,
            ..Default::default()
        }
    }

    /// Preset that also searches nested definitions.
    pub fn thorough() -> Self {
        Self {
            detect_short_edges: true,
            search_nested_instances: true,
            ..Default::default()
        }
    }

    /// Enable short-edge detection with the given threshold.
    pub fn with_short_edges(mut self, threshold: f64) -> Self {
        self.detect_short_edges = true;
        self.short_edge_threshold = threshold;
        self
    }

    /// Parse parameters from a TOML document. Missing keys keep defaults.
    #[cfg(feature = "config")]
    pub fn from_toml(toml_str: &str) -> InspectResult<Self> {
        let params: Self = toml::from_str(toml_str).map_err(|e| InspectError::InvalidConfig {
            details: e.to_string(),
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a TOML file.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> InspectResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| InspectError::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Serialize to TOML.
    #[cfg(feature = "config")]
    pub fn to_toml(&self) -> InspectResult<String> {
        toml::to_string_pretty(self).map_err(|e| InspectError::InvalidConfig {
            details: e.to_string(),
        })
    }

    #[cfg(feature = "config")]
    fn validate(&self) -> InspectResult<()> {
        if !self.short_edge_threshold.is_finite() || self.short_edge_threshold < 0.0 {
            return Err(InspectError::InvalidConfig {
                details: format!(
                    "short_edge_threshold must be a non-negative number, got {}",
                    self.short_edge_threshold
                ),
            });
        }
        Ok(())
    }
}

/// Parameters for [`crate::fix_errors`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixParams {
    /// Explode nested instances into the surrounding geometry.
    ///
    /// Off by default: exploding merges geometry and can create new
    /// defects, so it is opt-in.
    pub explode_nested_instances: bool,
}
