//! # Flatten planning
//!
//! Group dissolution happens in two halves: this module computes *what*
//! should happen from an immutable snapshot of the tree, and the caller
//! applies the result in one move/remove pass (against both the model and
//! the host document). Planning never mutates, so there is no tree to
//! invalidate mid-walk and no node can be visited twice or skipped.

use smallvec::SmallVec;

use super::{AnyID, GroupID, LayerTree, LeafID};

/// The outcome of planning a flatten over one tree.
#[derive(Clone, Debug, Default)]
pub struct FlattenPlan {
    /// Leaves to relocate to the end of the layer stack, in order. Applying
    /// the moves one at a time leaves the stack in exactly this order, after
    /// any background layers that were left in place.
    pub moves: SmallVec<[LeafID; 8]>,
    /// Groups emptied by the moves, deepest first.
    pub dissolves: Vec<GroupID>,
}

/// Plan the depth-first, left-to-right linearization of the tree.
///
/// A group's children take the group's position, recursively. Background
/// layers are never relocated - the host refuses to reorder them - so they
/// are excluded from `moves` wherever they sit. A background layer nested in
/// a group does not stop its later siblings from being planned.
#[must_use]
pub fn plan(tree: &LayerTree) -> FlattenPlan {
    let mut out = FlattenPlan::default();
    let top: Vec<AnyID> = tree.iter_top_level().map(|(id, _)| id).collect();
    walk(tree, &top, &mut out);
    log::debug!(
        "flatten plan: {} layers to relocate, {} groups to dissolve",
        out.moves.len(),
        out.dissolves.len()
    );
    out
}

fn walk(tree: &LayerTree, level: &[AnyID], out: &mut FlattenPlan) {
    for id in level {
        match *id {
            AnyID::Group(group) => {
                let children: Vec<AnyID> = tree
                    .iter_children(group)
                    // unwrap ok - the ID came out of this very tree.
                    .unwrap()
                    .map(|(id, _)| id)
                    .collect();
                walk(tree, &children, out);
                out.dissolves.push(group);
            }
            AnyID::Leaf(leaf) => {
                // unwrap ok - the ID came out of this very tree.
                let data = tree.get(leaf).unwrap();
                if !data.is_background() {
                    out.moves.push(leaf);
                }
            }
        }
    }
}
