//! # Run reports
//!
//! One record per layer instead of interleaved console prints and alert
//! boxes: every layer the exporter visits ends the run as either `Exported`
//! or `Skipped` with a reason, and the caller decides what to surface.

use crate::state::{tree::AnyID, PathID};

/// Everything that happened during one run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Name of the duplicate document the run operated on.
    pub document: String,
    /// Where the layered document was saved.
    pub saved_to: std::path::PathBuf,
    /// Per-layer outcomes, in final stacking order.
    pub layers: Vec<LayerReport>,
    /// Standalone images written, if image export was requested.
    pub images: Vec<std::path::PathBuf>,
}
impl RunReport {
    /// Layers that got a boundary path.
    pub fn exported(&self) -> impl Iterator<Item = &LayerReport> + '_ {
        self.layers
            .iter()
            .filter(|l| matches!(l.outcome, LayerOutcome::Exported { .. }))
    }
    /// Layers that were skipped, with their reasons.
    pub fn skipped(&self) -> impl Iterator<Item = (&LayerReport, &SkipReason)> + '_ {
        self.layers.iter().filter_map(|l| match &l.outcome {
            LayerOutcome::Skipped { reason } => Some((l, reason)),
            LayerOutcome::Exported { .. } => None,
        })
    }
}

#[derive(Clone, Debug)]
pub struct LayerReport {
    pub layer: AnyID,
    /// Layer name at export time (paths are named after this).
    pub name: String,
    pub outcome: LayerOutcome,
}

#[derive(Clone, Debug)]
pub enum LayerOutcome {
    /// A boundary path was traced and named after the layer.
    Exported { path: PathID },
    /// No boundary path was made for this layer. The run continued.
    Skipped { reason: SkipReason },
}

/// Why a layer ended the run without a boundary path.
#[derive(Clone, Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("background layers are not exported")]
    Background,
    #[error("layer has no non-transparent pixels")]
    EmptySelection,
    #[error("selecting the opaque region failed: {0}")]
    SelectionFailed(String),
    #[error("expanding the selection failed: {0}")]
    ExpandFailed(String),
    #[error("tracing the boundary path failed: {0}")]
    TraceFailed(String),
}
