//! `id_tree`'s `NodeId`s are scrambled by clones and reuse slots after
//! removal, so they cannot leave this module. External code (and host
//! bindings, which must resolve layers long after a snapshot was taken)
//! address layers through the stable typed IDs defined here; the
//! [`StableIDMap`] translates both ways.

/// Namespace marker for the raw IDs. Never constructed.
pub struct LayerNode;
type RawID = crate::PeelID<LayerNode>;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct LeafID(pub(super) RawID);
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct GroupID(pub(super) RawID);

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AnyID {
    Leaf(LeafID),
    Group(GroupID),
}
impl AnyID {
    #[must_use]
    pub fn leaf(self) -> Option<LeafID> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Group(_) => None,
        }
    }
    #[must_use]
    pub fn group(self) -> Option<GroupID> {
        match self {
            Self::Group(group) => Some(group),
            Self::Leaf(_) => None,
        }
    }
    pub(super) fn raw(self) -> RawID {
        match self {
            Self::Leaf(LeafID(raw)) | Self::Group(GroupID(raw)) => raw,
        }
    }
}
impl From<LeafID> for AnyID {
    fn from(value: LeafID) -> Self {
        Self::Leaf(value)
    }
}
impl From<GroupID> for AnyID {
    fn from(value: GroupID) -> Self {
        Self::Group(value)
    }
}
impl std::fmt::Display for LeafID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <RawID as std::fmt::Display>::fmt(&self.0, f)
    }
}
impl std::fmt::Display for GroupID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <RawID as std::fmt::Display>::fmt(&self.0, f)
    }
}
impl std::fmt::Display for AnyID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <RawID as std::fmt::Display>::fmt(&self.raw(), f)
    }
}

/// Two-way map between tree-internal node IDs and stable raw IDs.
#[derive(Default)]
pub(super) struct StableIDMap {
    tree_from_raw: hashbrown::HashMap<RawID, id_tree::NodeId>,
    raw_from_tree: hashbrown::HashMap<id_tree::NodeId, RawID>,
}
impl StableIDMap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree_from_raw: hashbrown::HashMap::with_capacity(capacity),
            raw_from_tree: hashbrown::HashMap::with_capacity(capacity),
        }
    }
    pub fn capacity(&self) -> usize {
        self.tree_from_raw.capacity()
    }
    pub fn tree_id_from(&self, raw: RawID) -> Option<&id_tree::NodeId> {
        self.tree_from_raw.get(&raw)
    }
    pub fn raw_id_from(&self, tree_id: &id_tree::NodeId) -> Option<RawID> {
        self.raw_from_tree.get(tree_id).copied()
    }
    /// Fetch the stable ID for a tree node, minting one if it has none yet.
    pub fn get_or_insert_tree_id(&mut self, tree_id: id_tree::NodeId) -> RawID {
        if let Some(raw) = self.raw_from_tree.get(&tree_id) {
            *raw
        } else {
            let raw = RawID::next();
            self.insert_pair(tree_id, raw);
            raw
        }
    }
    pub fn insert_pair(&mut self, tree_id: id_tree::NodeId, raw: RawID) {
        self.tree_from_raw.insert(raw, tree_id.clone());
        self.raw_from_tree.insert(tree_id, raw);
    }
    /// Forget a node that left the tree. Its stable ID is never reused.
    pub fn remove_tree_id(&mut self, tree_id: &id_tree::NodeId) {
        if let Some(raw) = self.raw_from_tree.remove(tree_id) {
            self.tree_from_raw.remove(&raw);
        }
    }
}
