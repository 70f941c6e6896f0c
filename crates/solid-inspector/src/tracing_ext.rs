//! Tracing extensions for inspection and fixing.
//!
//! Enable output by installing a subscriber in the host application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=solid_inspector=debug for per-phase detail
//! ```
//!
//! # Log Levels
//!
//! - **WARN**: abandoned geometry groups, fixes that failed
//! - **INFO**: inspection and fix summaries, phase timing
//! - **DEBUG**: per-phase detail, resolved shells
//! - **TRACE**: seed selection and tie-break candidates

use std::time::Instant;
use tracing::{Span, debug, info, warn};

use crate::fix::FixReport;
use crate::inspect::InspectionReport;
use crate::types::Entities;

/// Logs the duration of an operation when dropped.
///
/// ```rust,ignore
/// use solid_inspector::tracing_ext::OperationTimer;
///
/// let _timer = OperationTimer::new("inspect");
/// // ... work ...
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Start timing `name`.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("solid_operation", operation = name);
        debug!(target: "solid_inspector::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Start timing `name` with the size of the inspected mesh attached.
    pub fn with_context(name: &'static str, edge_count: usize, face_count: usize) -> Self {
        let span = tracing::info_span!(
            "solid_operation",
            operation = name,
            edges = edge_count,
            faces = face_count
        );
        debug!(
            target: "solid_inspector::timing",
            operation = name,
            edges = edge_count,
            faces = face_count,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Span covering the operation.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        info!(
            target: "solid_inspector::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", self.elapsed_ms()),
            "Operation completed"
        );
    }
}

/// Log the size of an entity collection at debug level.
pub fn log_entity_stats(entities: &Entities, context: &str) {
    let mesh = &entities.mesh;
    let dims = mesh
        .bounds()
        .map(|(min, max)| max - min)
        .unwrap_or_default();
    debug!(
        target: "solid_inspector::entities",
        context = context,
        vertices = mesh.vertex_count(),
        edges = mesh.edge_count(),
        faces = mesh.face_count(),
        instances = entities.instances().count(),
        images = entities.images().count(),
        dimensions = format!("{:.2} x {:.2} x {:.2}", dims.x, dims.y, dims.z),
        "Entity state"
    );
}

/// Log an inspection summary.
pub fn log_inspection_report(report: &InspectionReport) {
    if report.is_solid() {
        info!(target: "solid_inspector::inspect", "Entities form a valid solid");
        return;
    }
    for (kind, count) in report.counts_by_kind() {
        info!(
            target: "solid_inspector::inspect",
            kind = kind.type_name(),
            count,
            "{}: {}",
            kind.display_name(),
            count
        );
    }
    if !report.failures.is_empty() {
        warn!(
            target: "solid_inspector::inspect",
            groups = report.failures.len(),
            "Some geometry groups could not be analysed"
        );
    }
}

/// Log a fix summary.
pub fn log_fix_report(report: &FixReport) {
    info!(
        target: "solid_inspector::fix",
        erased = report.erased,
        reversed = report.reversed,
        unhidden = report.unhidden,
        exploded = report.exploded,
        "Fixes applied"
    );
    for kind in report.manual_attention() {
        warn!(
            target: "solid_inspector::fix",
            kind = kind.type_name(),
            "{} need manual attention",
            kind.display_name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_timer() {
        let timer = OperationTimer::with_context("test_operation", 12, 6);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.elapsed_ms() >= 5.0);
    }

    #[test]
    fn test_log_helpers_on_empty_input() {
        log_entity_stats(&Entities::new(), "test");
        log_inspection_report(&InspectionReport::default());
        log_fix_report(&FixReport::default());
    }
}
