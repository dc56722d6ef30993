//! A scripted in-memory host. Implements just enough of an image editor to
//! exercise the pipeline: it owns real layer trees, honors duplication and
//! snapshotting, records every observable effect, and fails on command.

use std::path::{Path, PathBuf};

use hashbrown::HashSet;

use peel_core::state::tree::{AnyID, LayerTree, Leaf, LeafID, Location};
use peel_core::state::PathID;
use peel_core::util::PixelMargin;

use super::{Host, HostError, HostResult, ImageOptions, SaveOptions};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FakeDocHandle {
    Source,
    Duplicate,
}

/// A selection in the fake: the layer it was lifted from and how far it has
/// been grown since.
#[derive(Clone, PartialEq, Debug)]
pub struct FakeSelection {
    pub layer: LeafID,
    pub grown_px: f32,
}

/// The duplicate document, while one exists.
pub struct FakeDup {
    pub name: String,
    pub tree: LayerTree,
    /// Attached paths in creation order.
    pub paths: Vec<(PathID, String)>,
}

#[derive(Default)]
pub struct FakeHost {
    pub source: LayerTree,
    pub source_name: String,
    /// What the user picks in the save dialog. `None` cancels.
    pub destination: Option<PathBuf>,
    pub duplicate: Option<FakeDup>,

    // Failure switches, keyed by layer name where per-layer.
    pub empty_alpha: HashSet<String>,
    pub fail_select: HashSet<String>,
    pub fail_expand: HashSet<String>,
    pub fail_trace: HashSet<String>,
    pub fail_image_export: HashSet<String>,
    pub fail_clear_paths: bool,
    pub fail_save: bool,

    // Observable effects.
    pub rasterized: Vec<String>,
    pub saved: Vec<PathBuf>,
    pub images: Vec<PathBuf>,
    pub notifications: Vec<String>,
    pub closed: bool,
}

impl FakeHost {
    pub fn new(source: LayerTree, name: &str) -> Self {
        Self {
            source,
            source_name: name.to_owned(),
            ..Self::default()
        }
    }
    fn dup(&mut self) -> HostResult<&mut FakeDup> {
        self.duplicate.as_mut().ok_or(HostError::Stale)
    }
    fn name_of(&self, layer: AnyID) -> HostResult<String> {
        let dup = self.duplicate.as_ref().ok_or(HostError::Stale)?;
        Ok(dup.tree.get(layer).ok_or(HostError::Stale)?.name().to_owned())
    }
}

impl Host for FakeHost {
    type Doc = FakeDocHandle;
    type Selection = FakeSelection;

    fn active_document(&mut self) -> HostResult<FakeDocHandle> {
        Ok(FakeDocHandle::Source)
    }
    fn document_name(&mut self, doc: &FakeDocHandle) -> HostResult<String> {
        Ok(match doc {
            FakeDocHandle::Source => self.source_name.clone(),
            FakeDocHandle::Duplicate => self.dup()?.name.clone(),
        })
    }
    fn prompt_save_location(
        &mut self,
        _default_name: &str,
        _filter: &str,
    ) -> HostResult<Option<PathBuf>> {
        Ok(self.destination.clone())
    }
    fn duplicate_document(
        &mut self,
        doc: &FakeDocHandle,
        name: &str,
    ) -> HostResult<FakeDocHandle> {
        assert_eq!(*doc, FakeDocHandle::Source, "only the source is duplicated");
        self.duplicate = Some(FakeDup {
            name: name.to_owned(),
            tree: self.source.clone(),
            paths: Vec::new(),
        });
        Ok(FakeDocHandle::Duplicate)
    }
    fn snapshot_layers(&mut self, _doc: &FakeDocHandle) -> HostResult<LayerTree> {
        // Stable IDs survive the clone, so the snapshot's IDs keep resolving
        // against this host.
        Ok(self.dup()?.tree.clone())
    }
    fn insert_scratch_layer(&mut self, _doc: &FakeDocHandle) -> HostResult<LeafID> {
        self.dup()?
            .tree
            .add_leaf(Location::IndexIntoRoot(0), "scratch".into(), Leaf::default())
            .map_err(|e| HostError::Rejected(e.to_string()))
    }
    fn delete_layer(&mut self, _doc: &FakeDocHandle, layer: AnyID) -> HostResult<()> {
        self.dup()?.tree.remove(layer).map_err(|_| HostError::Stale)
    }
    fn move_layer_to_end(&mut self, _doc: &FakeDocHandle, layer: LeafID) -> HostResult<()> {
        self.dup()?
            .tree
            .move_to_bottom(layer)
            .map_err(|_| HostError::Stale)
    }
    fn clear_paths(&mut self, _doc: &FakeDocHandle) -> HostResult<()> {
        if self.fail_clear_paths {
            return Err(HostError::Rejected("cannot delete paths".into()));
        }
        self.dup()?.paths.clear();
        Ok(())
    }
    fn rasterize_layer(&mut self, _doc: &FakeDocHandle, layer: LeafID) -> HostResult<()> {
        let name = self.name_of(layer.into())?;
        self.dup()?
            .tree
            .get_mut(layer)
            .ok_or(HostError::Stale)?
            .mark_rasterized();
        self.rasterized.push(name);
        Ok(())
    }
    fn select_opaque_region(
        &mut self,
        _doc: &FakeDocHandle,
        layer: LeafID,
        _alpha_floor: f32,
    ) -> HostResult<Option<FakeSelection>> {
        let name = self.name_of(layer.into())?;
        if self.fail_select.contains(&name) {
            return Err(HostError::Rejected(format!("cannot select {name}")));
        }
        if self.empty_alpha.contains(&name) {
            return Ok(None);
        }
        Ok(Some(FakeSelection {
            layer,
            grown_px: 0.0,
        }))
    }
    fn expand_selection(
        &mut self,
        _doc: &FakeDocHandle,
        selection: FakeSelection,
        by: PixelMargin,
    ) -> HostResult<FakeSelection> {
        // Zero margin is an identity, always.
        if by.get() == 0.0 {
            return Ok(selection);
        }
        let name = self.name_of(selection.layer.into())?;
        if self.fail_expand.contains(&name) {
            return Err(HostError::Rejected(format!("cannot expand {name}")));
        }
        Ok(FakeSelection {
            layer: selection.layer,
            grown_px: selection.grown_px + by.get(),
        })
    }
    fn selection_to_path(
        &mut self,
        _doc: &FakeDocHandle,
        selection: FakeSelection,
        _tolerance_px: f32,
    ) -> HostResult<PathID> {
        let name = self.name_of(selection.layer.into())?;
        if self.fail_trace.contains(&name) {
            return Err(HostError::Rejected(format!("cannot trace {name}")));
        }
        let id = PathID::next();
        // Hosts create work paths under a locale-dependent default name;
        // the caller renames it.
        self.dup()?.paths.push((id, "Work Path".to_owned()));
        Ok(id)
    }
    fn rename_path(&mut self, _doc: &FakeDocHandle, path: PathID, name: &str) -> HostResult<()> {
        let entry = self
            .dup()?
            .paths
            .iter_mut()
            .find(|(id, _)| *id == path)
            .ok_or(HostError::Stale)?;
        entry.1 = name.to_owned();
        Ok(())
    }
    fn set_layer_visible(
        &mut self,
        _doc: &FakeDocHandle,
        layer: AnyID,
        visible: bool,
    ) -> HostResult<()> {
        self.dup()?
            .tree
            .get_mut(layer)
            .ok_or(HostError::Stale)?
            .set_visible(visible);
        Ok(())
    }
    fn save_document(
        &mut self,
        _doc: &FakeDocHandle,
        to: &Path,
        _options: &SaveOptions,
    ) -> HostResult<()> {
        if self.fail_save {
            return Err(HostError::Rejected("save refused".into()));
        }
        self.saved.push(to.to_owned());
        Ok(())
    }
    fn export_image(
        &mut self,
        _doc: &FakeDocHandle,
        layer: AnyID,
        to: &Path,
        _options: &ImageOptions,
    ) -> HostResult<()> {
        let name = self.name_of(layer)?;
        if self.fail_image_export.contains(&name) {
            return Err(HostError::Rejected(format!("cannot render {name}")));
        }
        // A real host refuses to write into a directory that is not there.
        if !to.parent().is_some_and(Path::exists) {
            return Err(HostError::Rejected(format!(
                "no such directory for {}",
                to.display()
            )));
        }
        self.images.push(to.to_owned());
        Ok(())
    }
    fn close_document(&mut self, doc: FakeDocHandle) -> HostResult<()> {
        assert_eq!(
            doc,
            FakeDocHandle::Duplicate,
            "only the duplicate is ever closed"
        );
        self.closed = true;
        Ok(())
    }
    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_owned());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_margin_expansion_is_identity() {
        let mut tree = LayerTree::default();
        tree.add_leaf(Location::root_end(), "a".into(), Leaf::default())
            .unwrap();
        let mut host = FakeHost::new(tree, "x");
        host.duplicate_document(&FakeDocHandle::Source, "x").unwrap();

        let leaf = host
            .duplicate
            .as_ref()
            .unwrap()
            .tree
            .iter_top_level()
            .next()
            .unwrap()
            .0
            .leaf()
            .unwrap();

        let doc = FakeDocHandle::Duplicate;
        let selection = host
            .select_opaque_region(&doc, leaf, super::super::OPAQUE_ALPHA_FLOOR)
            .unwrap()
            .unwrap();

        let same = host
            .expand_selection(&doc, selection.clone(), PixelMargin::ZERO)
            .unwrap();
        assert_eq!(same, selection);

        let grown = host
            .expand_selection(&doc, selection.clone(), PixelMargin::from(5u16))
            .unwrap();
        assert_ne!(grown, selection);
    }
}
