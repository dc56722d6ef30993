pub mod document;
pub mod path;
pub mod tree;

pub use document::Document;
pub use path::PathItem;

pub type DocumentID = crate::PeelID<Document>;
pub type PathID = crate::PeelID<PathItem>;
