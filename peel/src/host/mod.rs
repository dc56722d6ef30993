//! # The host seam
//!
//! The pipeline never touches a pixel. Selection refinement, boundary
//! tracing, rasterization, and file encoding all belong to the host image
//! editor; this trait is the complete list of capabilities consumed from it.
//! Every call is synchronous and blocking, and every per-layer operation
//! names its target layer explicitly - there is no implicit "active layer"
//! anywhere in this crate.
//!
//! A binding is expected to resolve the stable IDs it handed out in
//! [`Host::snapshot_layers`] for as long as the document stays open.

use std::path::{Path, PathBuf};

use peel_core::state::tree::{AnyID, LayerTree, LeafID};
use peel_core::state::PathID;
use peel_core::util::PixelMargin;

#[cfg(test)]
pub(crate) mod fake;

/// Fraction of the alpha range treated as "outside" when a layer's alpha
/// channel is converted into a selection: 16 levels out of 256. A hard
/// binary edge selects exactly; an anti-aliased skirt does not produce a
/// ragged boundary.
pub const OPAQUE_ALPHA_FLOOR: f32 = 16.0 / 256.0;

/// Polygon approximation tolerance used when tracing a selection into a
/// path, in pixels of allowed deviation.
pub const PATH_TOLERANCE_PX: f32 = 2.0;

pub type HostResult<T> = Result<T, HostError>;

#[derive(thiserror::Error, Debug)]
pub enum HostError {
    /// The host refused or failed a command.
    #[error("host rejected the command: {0}")]
    Rejected(String),
    /// A handle no longer resolves to a live host object.
    #[error("host object no longer exists")]
    Stale,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Save descriptor for the layered document format.
#[derive(Clone, Debug)]
pub struct SaveOptions {
    /// Keep the layer structure instead of merging on save.
    pub layers: bool,
    pub embed_color_profile: bool,
}
impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            layers: true,
            embed_color_profile: true,
        }
    }
}

/// Encoder settings for standalone per-layer images.
#[derive(Clone, Debug)]
pub struct ImageOptions {
    /// Deflate effort, 0 (none) to 9 (max).
    pub compression: u8,
    pub interlaced: bool,
}
impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            compression: 9,
            interlaced: false,
        }
    }
}

pub trait Host {
    /// The host's handle for an open document.
    type Doc;
    /// The host's handle for a canvas selection.
    type Selection;

    fn active_document(&mut self) -> HostResult<Self::Doc>;
    fn document_name(&mut self, doc: &Self::Doc) -> HostResult<String>;
    /// Ask the user where output should go. `None` means they cancelled.
    fn prompt_save_location(
        &mut self,
        default_name: &str,
        filter: &str,
    ) -> HostResult<Option<PathBuf>>;
    fn duplicate_document(&mut self, doc: &Self::Doc, name: &str) -> HostResult<Self::Doc>;
    /// Snapshot the document's layer structure under fresh stable IDs.
    fn snapshot_layers(&mut self, doc: &Self::Doc) -> HostResult<LayerTree>;
    /// Insert an empty scratch layer at the top of the stack.
    fn insert_scratch_layer(&mut self, doc: &Self::Doc) -> HostResult<LeafID>;
    /// Delete a layer. Deleting a group deletes everything still inside it.
    fn delete_layer(&mut self, doc: &Self::Doc, layer: AnyID) -> HostResult<()>;
    /// Move a layer to the bottom of the top-level stack.
    fn move_layer_to_end(&mut self, doc: &Self::Doc, layer: LeafID) -> HostResult<()>;
    /// Delete every path attached to the document.
    fn clear_paths(&mut self, doc: &Self::Doc) -> HostResult<()>;
    /// Convert a non-pixel layer into addressable pixel data, in place.
    fn rasterize_layer(&mut self, doc: &Self::Doc, layer: LeafID) -> HostResult<()>;
    /// Select the layer's non-transparent region. Alpha at or below
    /// `alpha_floor` (as a fraction of full opacity) counts as outside.
    /// `None` when nothing rises above the floor.
    fn select_opaque_region(
        &mut self,
        doc: &Self::Doc,
        layer: LeafID,
        alpha_floor: f32,
    ) -> HostResult<Option<Self::Selection>>;
    /// Expand the selection boundary outward, clipped at canvas bounds and
    /// without modify-at-canvas-bounds effects. A zero margin must return
    /// the selection unchanged.
    fn expand_selection(
        &mut self,
        doc: &Self::Doc,
        selection: Self::Selection,
        by: PixelMargin,
    ) -> HostResult<Self::Selection>;
    /// Trace the selection into a closed path with the given polygon
    /// approximation tolerance.
    fn selection_to_path(
        &mut self,
        doc: &Self::Doc,
        selection: Self::Selection,
        tolerance_px: f32,
    ) -> HostResult<PathID>;
    fn rename_path(&mut self, doc: &Self::Doc, path: PathID, name: &str) -> HostResult<()>;
    fn set_layer_visible(
        &mut self,
        doc: &Self::Doc,
        layer: AnyID,
        visible: bool,
    ) -> HostResult<()>;
    fn save_document(&mut self, doc: &Self::Doc, to: &Path, options: &SaveOptions)
        -> HostResult<()>;
    /// Render the document as currently visible to a standalone image file.
    /// The caller has arranged visibility so only `layer` shows.
    fn export_image(
        &mut self,
        doc: &Self::Doc,
        layer: AnyID,
        to: &Path,
        options: &ImageOptions,
    ) -> HostResult<()>;
    fn close_document(&mut self, doc: Self::Doc) -> HostResult<()>;
    /// One-line user-facing notification.
    fn notify(&mut self, message: &str);
}
