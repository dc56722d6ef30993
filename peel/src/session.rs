//! # Document sessions
//!
//! A [`Session`] owns the duplicate document for the length of one run and
//! keeps the in-memory model in lockstep with every host mutation. Runs are
//! not reentrant: whoever holds the session holds the only reference to the
//! duplicate.

use std::path::Path;

use peel_core::state::tree::{flatten, AnyID, LayerData, LeafID};
use peel_core::state::{Document, PathID, PathItem};
use peel_core::util::PixelMargin;

use crate::host::{
    Host, HostResult, ImageOptions, SaveOptions, OPAQUE_ALPHA_FLOOR, PATH_TOLERANCE_PX,
};

pub struct Session<'h, H: Host> {
    host: &'h mut H,
    doc: H::Doc,
    /// Mirror of the duplicate's state. Updated by every mutating call on
    /// this session, never directly.
    pub model: Document,
}

impl<'h, H: Host> Session<'h, H> {
    /// Duplicate `source` under `name` and snapshot the copy. The original
    /// document is never touched again after this call.
    pub fn duplicate(host: &'h mut H, source: &H::Doc, name: &str) -> HostResult<Self> {
        let doc = host.duplicate_document(source, name)?;
        let layers = host.snapshot_layers(&doc)?;
        Ok(Self {
            host,
            doc,
            model: Document {
                path: None,
                name: name.to_owned(),
                layers,
                paths: Vec::new(),
            },
        })
    }

    /// Delete every pre-existing path on the duplicate.
    ///
    /// The host destroys the active layer's vector mask as a side effect of
    /// clearing paths, so a scratch layer is inserted to take the hit. It is
    /// removed again whether or not the clear succeeds.
    pub fn clear_paths(&mut self) -> HostResult<()> {
        let scratch = self.host.insert_scratch_layer(&self.doc)?;
        let cleared = self.host.clear_paths(&self.doc);
        let removed = self.host.delete_layer(&self.doc, scratch.into());
        cleared?;
        removed?;
        self.model.paths.clear();
        Ok(())
    }

    /// Dissolve every group: relocate the leaves into depth-first order at
    /// the end of the stack, then delete the emptied groups. Plans against
    /// an immutable snapshot first, then applies in one pass.
    pub fn flatten_groups(&mut self) -> HostResult<()> {
        let plan = flatten::plan(&self.model.layers);
        for leaf in &plan.moves {
            self.host.move_layer_to_end(&self.doc, *leaf)?;
            self.model
                .layers
                .move_to_bottom(*leaf)
                // unwrap ok - the plan was computed from this very model.
                .expect("flatten plan out of sync with model");
        }
        for group in &plan.dissolves {
            self.host.delete_layer(&self.doc, (*group).into())?;
            self.model
                .layers
                .remove(*group)
                .expect("flatten plan out of sync with model");
        }
        Ok(())
    }

    /// Remove every top-level layer that is not currently visible, in
    /// forward order. Relative order of the survivors is untouched.
    pub fn remove_invisible(&mut self) -> HostResult<()> {
        let doomed: Vec<(AnyID, String)> = self
            .model
            .layers
            .iter_top_level()
            .filter(|(_, data)| !data.is_visible())
            .map(|(id, data)| (id, data.name().to_owned()))
            .collect();
        for (id, name) in doomed {
            log::debug!("dropping invisible layer {name:?}");
            self.host.delete_layer(&self.doc, id)?;
            self.model
                .layers
                .remove(id)
                .expect("model listed a layer it does not contain");
        }
        Ok(())
    }

    /// The current top-level stack, topmost first.
    #[must_use]
    pub fn top_level(&self) -> Vec<(AnyID, LayerData)> {
        self.model
            .layers
            .iter_top_level()
            .map(|(id, data)| (id, data.clone()))
            .collect()
    }

    /// Rasterize a fill layer in place.
    pub fn rasterize(&mut self, leaf: LeafID) -> HostResult<()> {
        self.host.rasterize_layer(&self.doc, leaf)?;
        self.model
            .layers
            .get_mut(leaf)
            .expect("model listed a layer it does not contain")
            .mark_rasterized();
        Ok(())
    }

    /// Select the layer's non-transparent region with the standard alpha
    /// floor. `None` when the layer has nothing to select.
    pub fn select_opaque_region(&mut self, leaf: LeafID) -> HostResult<Option<H::Selection>> {
        self.host
            .select_opaque_region(&self.doc, leaf, OPAQUE_ALPHA_FLOOR)
    }

    pub fn expand_selection(
        &mut self,
        selection: H::Selection,
        by: PixelMargin,
    ) -> HostResult<H::Selection> {
        self.host.expand_selection(&self.doc, selection, by)
    }

    /// Trace the selection into a closed path with the standard tolerance.
    pub fn trace_selection(&mut self, selection: H::Selection) -> HostResult<PathID> {
        self.host
            .selection_to_path(&self.doc, selection, PATH_TOLERANCE_PX)
    }

    /// Name a freshly traced path and record it on the model.
    pub fn name_path(&mut self, path: PathID, name: &str) -> HostResult<()> {
        self.host.rename_path(&self.doc, path, name)?;
        self.model.paths.push(PathItem {
            id: path,
            name: name.to_owned(),
        });
        Ok(())
    }

    pub fn set_visible(&mut self, layer: AnyID, visible: bool) -> HostResult<()> {
        self.host.set_layer_visible(&self.doc, layer, visible)?;
        self.model
            .layers
            .get_mut(layer)
            .expect("model listed a layer it does not contain")
            .set_visible(visible);
        Ok(())
    }

    pub fn save(&mut self, to: &Path, options: &SaveOptions) -> HostResult<()> {
        self.host.save_document(&self.doc, to, options)?;
        self.model.path = Some(to.to_owned());
        Ok(())
    }

    pub fn export_image(
        &mut self,
        layer: AnyID,
        to: &Path,
        options: &ImageOptions,
    ) -> HostResult<()> {
        self.host.export_image(&self.doc, layer, to, options)
    }

    /// Close the duplicate. Consumes the session; the model outlives the
    /// host document only as a record of what happened.
    pub fn close(self) -> HostResult<()> {
        self.host.close_document(self.doc)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::host::fake::{FakeDocHandle, FakeHost};
    use peel_core::state::tree::{LayerTree, Leaf, Location};

    fn top_names(tree: &LayerTree) -> Vec<String> {
        tree.iter_top_level()
            .map(|(_, data)| data.name().to_owned())
            .collect()
    }

    #[test]
    fn flatten_keeps_model_and_host_in_lockstep() {
        let mut tree = LayerTree::default();
        tree.add_leaf(Location::root_end(), "bg".into(), Leaf::background())
            .unwrap();
        let g = tree.add_group(Location::root_end(), "G".into()).unwrap();
        tree.add_leaf(
            Location::IndexIntoGroup(&g, usize::MAX),
            "a".into(),
            Leaf::default(),
        )
        .unwrap();
        tree.add_leaf(
            Location::IndexIntoGroup(&g, usize::MAX),
            "b".into(),
            Leaf::default(),
        )
        .unwrap();
        tree.add_leaf(Location::root_end(), "c".into(), Leaf::default())
            .unwrap();

        let mut host = FakeHost::new(tree, "scene");
        let mut session = Session::duplicate(&mut host, &FakeDocHandle::Source, "scene").unwrap();
        session.flatten_groups().unwrap();

        let expected = ["bg", "a", "b", "c"];
        let model_names = top_names(&session.model.layers);
        drop(session);
        assert_eq!(model_names, expected);
        assert_eq!(top_names(&host.duplicate.as_ref().unwrap().tree), expected);
    }

    #[test]
    fn remove_invisible_preserves_order() {
        let mut tree = LayerTree::default();
        for (name, visible) in [("a", true), ("b", false), ("c", true), ("d", false)] {
            let leaf = if visible {
                Leaf::default()
            } else {
                Leaf::default().hidden()
            };
            tree.add_leaf(Location::root_end(), name.into(), leaf)
                .unwrap();
        }

        let mut host = FakeHost::new(tree, "scene");
        let mut session = Session::duplicate(&mut host, &FakeDocHandle::Source, "scene").unwrap();
        session.remove_invisible().unwrap();

        let model_names = top_names(&session.model.layers);
        drop(session);
        assert_eq!(model_names, ["a", "c"]);
        assert_eq!(
            top_names(&host.duplicate.as_ref().unwrap().tree),
            ["a", "c"]
        );
    }

    #[test]
    fn scratch_layer_is_removed_even_when_clearing_fails() {
        let mut tree = LayerTree::default();
        tree.add_leaf(Location::root_end(), "a".into(), Leaf::default())
            .unwrap();

        let mut host = FakeHost::new(tree, "scene");
        host.fail_clear_paths = true;
        let mut session = Session::duplicate(&mut host, &FakeDocHandle::Source, "scene").unwrap();
        assert!(session.clear_paths().is_err());
        drop(session);

        assert_eq!(top_names(&host.duplicate.as_ref().unwrap().tree), ["a"]);
    }
}
