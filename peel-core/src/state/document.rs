pub type ID = crate::PeelID<Document>;

/// In-memory mirror of one host document. A run only ever mirrors the
/// duplicate it owns, never the user's original.
#[derive(Clone, Default)]
pub struct Document {
    /// Where the document will be (or was) saved, or None before a
    /// destination is chosen.
    pub path: Option<std::path::PathBuf>,
    /// Name of the document, inferred from its path or assigned by the host.
    pub name: String,
    /// The layer stack. Depth 1 once flattening has run.
    pub layers: super::tree::LayerTree,
    /// Boundary paths attached to the document, in creation order. Paths
    /// reference their source layer by name only - names may collide.
    pub paths: Vec<super::PathItem>,
}
