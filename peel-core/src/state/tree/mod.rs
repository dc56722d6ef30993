//! # Layer tree
//!
//! The layers of a document form a tree, with drawable layers (raster, fill)
//! as leaves and groups forming the upper levels. Leaves cannot have
//! children. A hidden root holds the top level; it is never handed out.
//!
//! The export pipeline requires the tree to end up with depth 1 - see
//! [`flatten`] for the pure planning half of that operation.

pub mod flatten;
mod stable_id;

pub use stable_id::{AnyID, GroupID, LeafID};

/// What a non-group layer is made of.
#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::Display)]
pub enum LeafKind {
    /// Addressable pixel data.
    Raster,
    /// A procedural solid fill. Has no addressable pixels until rasterized.
    Fill,
}

/// Construction parameters for a leaf layer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Leaf {
    pub kind: LeafKind,
    pub visible: bool,
    pub background: bool,
}
impl Default for Leaf {
    fn default() -> Self {
        Self {
            kind: LeafKind::Raster,
            visible: true,
            background: false,
        }
    }
}
impl Leaf {
    #[must_use]
    pub fn fill() -> Self {
        Self {
            kind: LeafKind::Fill,
            ..Self::default()
        }
    }
    #[must_use]
    pub fn background() -> Self {
        Self {
            background: true,
            ..Self::default()
        }
    }
    #[must_use]
    pub fn hidden(self) -> Self {
        Self {
            visible: false,
            ..self
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
enum LayerTy {
    Root,
    Group,
    Leaf(LeafKind),
}

#[derive(Clone, Debug)]
pub struct LayerData {
    // NOT public - mutating the type from outside would break the tree!
    ty: LayerTy,
    pub name: String,
    visible: bool,
    // NOT public - a layer cannot become (or stop being) the background
    // after creation.
    background: bool,
}
impl LayerData {
    fn root() -> Self {
        Self {
            ty: LayerTy::Root,
            name: String::new(),
            visible: true,
            background: false,
        }
    }
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.ty, LayerTy::Group)
    }
    /// The leaf kind, or None for groups.
    #[must_use]
    pub fn kind(&self) -> Option<LeafKind> {
        match self.ty {
            LayerTy::Leaf(kind) => Some(kind),
            LayerTy::Group | LayerTy::Root => None,
        }
    }
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
    #[must_use]
    pub fn is_background(&self) -> bool {
        self.background
    }
    /// Record an in-place rasterization: a fill leaf becomes a raster leaf.
    /// No-op on anything already raster.
    pub fn mark_rasterized(&mut self) {
        if let LayerTy::Leaf(kind) = &mut self.ty {
            *kind = LeafKind::Raster;
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TargetError {
    #[error("ID not found")]
    TargetNotFound,
}

#[derive(Copy, Clone)]
pub enum Location<'a> {
    /// Set as the nth child of this group, where top = 0.
    ///
    /// An index too large will be clamped to the bottom position.
    IndexIntoGroup(&'a GroupID, usize),
    /// Set as the nth child of the root, where top = 0.
    ///
    /// An index too large will be clamped to the bottom position.
    IndexIntoRoot(usize),
}
impl Location<'_> {
    /// The bottom of the top-level stack.
    #[must_use]
    pub fn root_end() -> Self {
        Self::IndexIntoRoot(usize::MAX)
    }
}

pub struct LayerTree {
    tree: id_tree::Tree<LayerData>,
    ids: stable_id::StableIDMap,
}
impl Default for LayerTree {
    fn default() -> Self {
        Self {
            tree: id_tree::TreeBuilder::new()
                .with_root(id_tree::Node::new(LayerData::root()))
                .build(),
            ids: stable_id::StableIDMap::default(),
        }
    }
}
impl LayerTree {
    /// Iterate the top-level layers, topmost first.
    pub fn iter_top_level(&'_ self) -> impl Iterator<Item = (AnyID, &'_ LayerData)> + '_ {
        // unwrap ok - the tree is always built with a root.
        self.iter_children_of_raw(self.tree.root_node_id().unwrap())
            .unwrap()
    }
    /// Iterate the children of this group, topmost first.
    #[must_use]
    pub fn iter_children(
        &self,
        group: GroupID,
    ) -> Option<impl Iterator<Item = (AnyID, &LayerData)> + '_> {
        self.iter_children_of_raw(self.ids.tree_id_from(AnyID::from(group).raw())?)
    }
    /// Iterate the children of this raw ID. A helper for the public iters.
    fn iter_children_of_raw<'s>(
        &'s self,
        node_id: &id_tree::NodeId,
    ) -> Option<impl Iterator<Item = (AnyID, &'s LayerData)> + 's> {
        Some(self.tree.children_ids(node_id).ok()?.map(|node_id| {
            let node = self.tree.get(node_id).unwrap().data();
            let raw = self
                .ids
                .raw_id_from(node_id)
                // This would be a bug in this module, so report it loudly.
                .expect("unknown node encountered in iteration");
            let id = match node.ty {
                LayerTy::Leaf(_) => AnyID::Leaf(LeafID(raw)),
                LayerTy::Group => AnyID::Group(GroupID(raw)),
                // The root is never anyone's child.
                LayerTy::Root => unreachable!(),
            };
            (id, node)
        }))
    }
    /// Convert a location to a parent and child idx.
    /// Ok implies the parent is present in the tree.
    fn find_location<'a>(
        &'a self,
        location: Location<'a>,
    ) -> Result<(&'a id_tree::NodeId, usize), TargetError> {
        match location {
            Location::IndexIntoGroup(group, idx) => {
                let tree_id = self
                    .ids
                    .tree_id_from(AnyID::from(*group).raw())
                    .ok_or(TargetError::TargetNotFound)?;
                if self.tree.get(tree_id).is_err() {
                    return Err(TargetError::TargetNotFound);
                }
                Ok((tree_id, idx))
            }
            Location::IndexIntoRoot(idx) => Ok((self.tree.root_node_id().unwrap(), idx)),
        }
    }
    fn insert_at(
        &mut self,
        location: Location,
        data: LayerData,
    ) -> Result<id_tree::NodeId, TargetError> {
        let (parent_id, idx) = self.find_location(location)?;
        let parent_id = parent_id.to_owned();

        let new_node = self
            .tree
            .insert(
                id_tree::Node::new(data),
                id_tree::InsertBehavior::UnderNode(&parent_id),
            )
            .map_err(|_| TargetError::TargetNotFound)?;

        // unwrap ok - we just inserted under this parent, it has children.
        let siblings = self.tree.children_ids(&parent_id).unwrap().count();
        // unwrap ok - we just added the node, of course it will be found!
        self.tree
            .make_nth_sibling(&new_node, idx.min(siblings.saturating_sub(1)))
            .unwrap();

        Ok(new_node)
    }
    pub fn add_leaf(
        &mut self,
        location: Location,
        name: String,
        leaf: Leaf,
    ) -> Result<LeafID, TargetError> {
        let node = self.insert_at(
            location,
            LayerData {
                ty: LayerTy::Leaf(leaf.kind),
                name,
                visible: leaf.visible,
                background: leaf.background,
            },
        )?;
        Ok(LeafID(self.ids.get_or_insert_tree_id(node)))
    }
    pub fn add_group(&mut self, location: Location, name: String) -> Result<GroupID, TargetError> {
        let node = self.insert_at(
            location,
            LayerData {
                ty: LayerTy::Group,
                name,
                visible: true,
                background: false,
            },
        )?;
        Ok(GroupID(self.ids.get_or_insert_tree_id(node)))
    }
    #[must_use]
    pub fn get(&self, id: impl Into<AnyID>) -> Option<&LayerData> {
        let tree_id = self.ids.tree_id_from(id.into().raw())?;
        self.tree.get(tree_id).ok().map(id_tree::Node::data)
    }
    pub fn get_mut(&mut self, id: impl Into<AnyID>) -> Option<&mut LayerData> {
        let tree_id = self.ids.tree_id_from(id.into().raw())?;
        self.tree.get_mut(tree_id).ok().map(id_tree::Node::data_mut)
    }
    /// Move a layer to the bottom of the top-level stack. A group moves with
    /// everything inside it.
    pub fn move_to_bottom(&mut self, id: impl Into<AnyID>) -> Result<(), TargetError> {
        let tree_id = self
            .ids
            .tree_id_from(id.into().raw())
            .ok_or(TargetError::TargetNotFound)?
            .to_owned();
        let root = self.tree.root_node_id().unwrap().to_owned();
        self.tree
            .move_node(&tree_id, id_tree::MoveBehavior::ToParent(&root))
            .map_err(|_| TargetError::TargetNotFound)?;
        // unwrap ok - the node was just moved under the root.
        let siblings = self.tree.children_ids(&root).unwrap().count();
        self.tree
            .make_nth_sibling(&tree_id, siblings.saturating_sub(1))
            .unwrap();
        Ok(())
    }
    /// Remove a layer. Removing a group removes everything still inside it.
    pub fn remove(&mut self, id: impl Into<AnyID>) -> Result<(), TargetError> {
        let tree_id = self
            .ids
            .tree_id_from(id.into().raw())
            .ok_or(TargetError::TargetNotFound)?
            .to_owned();
        // Collect the whole subtree up front - the stable IDs of removed
        // nodes must be forgotten, and the traversal cannot outlive removal.
        let doomed: Vec<id_tree::NodeId> = self
            .tree
            .traverse_pre_order_ids(&tree_id)
            .map_err(|_| TargetError::TargetNotFound)?
            .collect();
        self.tree
            .remove_node(tree_id, id_tree::RemoveBehavior::DropChildren)
            .map_err(|_| TargetError::TargetNotFound)?;
        for node in &doomed {
            self.ids.remove_tree_id(node);
        }
        Ok(())
    }
    /// Number of top-level layers.
    #[must_use]
    pub fn top_level_len(&self) -> usize {
        self.iter_top_level().count()
    }
}
/// Very expensive clone impl!
impl Clone for LayerTree {
    fn clone(&self) -> Self {
        let tree_clone = self.tree.clone();
        let mut new_ids = stable_id::StableIDMap::with_capacity(self.ids.capacity());

        // id_tree's NodeIds get scrambled when cloning, but existing stable
        // references must keep working. Reconstruct the map.
        self.tree
            .traverse_post_order_ids(self.tree.root_node_id().unwrap())
            .unwrap()
            .zip(
                tree_clone
                    .traverse_post_order_ids(tree_clone.root_node_id().unwrap())
                    .unwrap(),
            )
            .for_each(|(original_id, new_id)| {
                if let Some(raw) = self.ids.raw_id_from(&original_id) {
                    new_ids.insert_pair(new_id, raw);
                }
            });
        Self {
            tree: tree_clone,
            ids: new_ids,
        }
    }
}
