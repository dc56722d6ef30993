pub type ID = super::PathID;

/// A closed vector boundary attached to a document. The curve data itself
/// lives host-side; the model only tracks identity and name.
#[derive(Clone, Debug)]
pub struct PathItem {
    pub id: ID,
    pub name: String,
}
