//! XML namespaces used in WordprocessingML parts

/// WordprocessingML main namespace
pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Relationships namespace
pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// Content Types namespace
pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
/// Package Relationships namespace
pub const PR: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Namespace declarations for a freshly created document or numbering part
pub fn document_namespaces() -> Vec<(String, String)> {
    vec![
        ("xmlns:w".to_string(), W.to_string()),
        ("xmlns:r".to_string(), R.to_string()),
    ]
}
