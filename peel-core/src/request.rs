//! # Export requests
//!
//! Everything a run needs to know, fixed before the first host mutation.

use crate::util::PixelMargin;

/// Request parameters known before a destination has been chosen. This is
/// the surface a host binding exposes to the user (two knobs in the original
/// panel, plus the per-layer image toggle).
#[derive(Copy, Clone, Debug, Default)]
pub struct ExportOptions {
    /// Outward expansion applied to each boundary selection before tracing.
    pub margin: PixelMargin,
    /// Drop layers that are not currently visible before exporting.
    pub visible_only: bool,
    /// Additionally render every layer to a standalone image.
    pub export_images: bool,
}
impl ExportOptions {
    #[must_use]
    pub fn into_request(self, destination: std::path::PathBuf) -> ExportRequest {
        ExportRequest {
            margin: self.margin,
            visible_only: self.visible_only,
            export_images: self.export_images,
            destination,
        }
    }
}

/// The parameters of one run. Immutable for the run's duration.
#[derive(Clone, Debug)]
pub struct ExportRequest {
    pub margin: PixelMargin,
    pub visible_only: bool,
    pub export_images: bool,
    /// Where the duplicated document is saved. Per-layer images, if
    /// requested, land in a directory named after this file's stem.
    pub destination: std::path::PathBuf,
}
