//! Error types for docx-splice

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Missing required part: {0}")]
    MissingPart(String),

    #[error("Invalid part URI: {0}")]
    InvalidPartUri(String),

    #[error("Missing attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },

    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Relationship {id} not found on {source_part}")]
    RelationshipNotFound { source_part: String, id: String },

    /// A part could not be parsed into the shape the model expects
    #[error("Malformed part {part}: {reason}")]
    MalformedPart { part: String, reason: String },

    /// An edit or split addressed an offset outside the node's interval
    #[error("Offset {offset} outside of [{start}, {end}]")]
    OffsetOutOfRange {
        offset: usize,
        start: usize,
        end: usize,
    },

    /// Paragraph numbering cannot be linked to the requested list
    #[error("Incompatible list: {0}")]
    IncompatibleList(String),

    /// Structural inconsistency found while rebuilding the offset table
    #[error("Inconsistent document tree: {0}")]
    InconsistentTree(String),

    #[error("Paragraph {0} not found")]
    ParagraphNotFound(usize),
}

impl Error {
    pub(crate) fn out_of_range(offset: usize, start: usize, end: usize) -> Self {
        Error::OffsetOutOfRange { offset, start, end }
    }

    pub(crate) fn malformed(part: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedPart {
            part: part.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
