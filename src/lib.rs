//! # docx-splice
//!
//! Offset-addressed text editing for DOCX documents.
//!
//! ## Features
//!
//! - Address paragraph content by flat offsets (tabs and breaks count as one)
//! - Split paragraphs, insert text, tabs and breaks, delete ranges
//! - Optional tracked changes (`w:ins` / `w:del`) with author and date
//! - List creation and relinking through the numbering part
//! - Round-trip preservation (unknown elements are kept intact)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docx_splice::{Document, EditOptions, Editor};
//!
//! let mut doc = Document::open("example.docx")?;
//!
//! // Plain insert at document offset 5
//! doc.insert_text_at(5, ", world", &EditOptions::new())?;
//!
//! // Tracked deletion of the first three offsets of paragraph 0
//! let editor = Editor::now("Reviewer");
//! doc.delete_range(0, 0, 3, Some(&editor))?;
//!
//! doc.split_paragraph(0, 2)?;
//! doc.save("output.docx")?;
//! ```

pub mod document;
pub mod error;
pub mod opc;
pub mod xml;

pub use document::{
    BreakType, Document, EditOptions, Editor, Leaf, ListHandle, ListStyle, Paragraph, Run,
    RunFormat,
};
pub use error::{Error, Result};
pub use opc::{Package, Part, PartUri, SharedPackage};
