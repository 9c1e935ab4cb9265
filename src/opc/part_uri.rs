//! Part names inside a package

use crate::error::{Error, Result};
use std::fmt;

/// Absolute name of a part within the package, e.g. `/word/document.xml`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartUri {
    path: String,
}

impl PartUri {
    /// Normalize `path` to a leading '/' and no trailing '/'.
    pub fn new(path: &str) -> Result<Self> {
        let path = path.trim().trim_end_matches('/');
        if path.is_empty() {
            return Err(Error::InvalidPartUri("empty path".into()));
        }

        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        if normalized.contains("//") {
            return Err(Error::InvalidPartUri(format!(
                "'{}' contains an empty segment",
                path
            )));
        }

        Ok(Self { path: normalized })
    }

    /// Well-known part name, already in normalized form
    pub(crate) fn from_static(path: &'static str) -> Self {
        debug_assert!(path.starts_with('/') && !path.ends_with('/'));
        Self { path: path.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Path inside the zip archive (no leading '/')
    pub fn zip_path(&self) -> &str {
        &self.path[1..]
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// Directory holding this part ("" for parts at the root)
    fn directory(&self) -> &str {
        let pos = self.path.rfind('/').unwrap_or(0);
        &self.path[..pos]
    }

    /// `/word/document.xml` → `/word/_rels/document.xml.rels`
    pub fn relationships_uri(&self) -> PartUri {
        PartUri {
            path: format!("{}/_rels/{}.rels", self.directory(), self.file_name()),
        }
    }

    /// Resolve a relationship target relative to this part.
    ///
    /// `/word/document.xml` + `../media/image1.png` → `/media/image1.png`
    pub fn resolve(&self, target: &str) -> Result<PartUri> {
        if target.starts_with('/') {
            return PartUri::new(target);
        }

        let mut segments: Vec<&str> = self
            .directory()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        for segment in target.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }

        PartUri::new(&segments.join("/"))
    }

    /// Target of a relationship from `source` to this part
    pub fn relative_to(&self, source: &PartUri) -> String {
        let dir = source.directory();
        match self.path.strip_prefix(dir) {
            Some(rest) if !dir.is_empty() && rest.starts_with('/') => rest[1..].to_string(),
            _ => self.zip_path().to_string(),
        }
    }

    pub fn is_relationships(&self) -> bool {
        self.path.contains("/_rels/") && self.path.ends_with(".rels")
    }
}

impl fmt::Display for PartUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl std::str::FromStr for PartUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PartUri::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_leading_slash() {
        assert_eq!(PartUri::new("word/document.xml").unwrap().as_str(), "/word/document.xml");
        assert_eq!(PartUri::new("/word/").unwrap().as_str(), "/word");
        assert!(PartUri::new("  ").is_err());
        assert!(PartUri::new("/word//x.xml").is_err());
    }

    #[test]
    fn test_names() {
        let uri = PartUri::new("/word/document.xml").unwrap();
        assert_eq!(uri.file_name(), "document.xml");
        assert_eq!(uri.extension(), Some("xml"));
        assert_eq!(uri.zip_path(), "word/document.xml");
    }

    #[test]
    fn test_relationships_uri() {
        let uri = PartUri::new("/word/document.xml").unwrap();
        assert_eq!(uri.relationships_uri().as_str(), "/word/_rels/document.xml.rels");
        assert!(uri.relationships_uri().is_relationships());
        assert!(!uri.is_relationships());
    }

    #[test]
    fn test_resolve() {
        let uri = PartUri::new("/word/document.xml").unwrap();
        assert_eq!(uri.resolve("../media/image1.png").unwrap().as_str(), "/media/image1.png");
        assert_eq!(uri.resolve("numbering.xml").unwrap().as_str(), "/word/numbering.xml");
    }

    #[test]
    fn test_relative_to() {
        let doc = PartUri::new("/word/document.xml").unwrap();
        let numbering = PartUri::new("/word/numbering.xml").unwrap();
        assert_eq!(numbering.relative_to(&doc), "numbering.xml");

        let top = PartUri::new("/content.xml").unwrap();
        assert_eq!(doc.relative_to(&top), "word/document.xml");
    }
}
