//! Open Packaging Convention (OPC) container
//!
//! The ZIP-based package a DOCX file lives in: parts, content types and
//! the relationship graph between parts.

mod content_types;
mod package;
mod part;
mod part_uri;
mod relationships;

pub use content_types::{ContentTypes, MAIN_DOCUMENT, NUMBERING, RELATIONSHIPS, XML};
pub use package::{Package, SharedPackage};
pub use part::Part;
pub use part_uri::PartUri;
pub use relationships::{rel_types, Relationship, Relationships};
