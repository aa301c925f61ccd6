pub mod document;
pub mod graph;

pub use document::{FileTypeEntry, RelationEntry, SchemaDocument, load_document};
pub use graph::{FileTypeSchema, KeyFields, KeyLayout, Relation, SchemaGraph};
