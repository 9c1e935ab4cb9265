//! OPC package: the zip container holding a document's parts.
//!
//! The package is the only resource shared between documents. Writers go
//! through [`SharedPackage`], whose lock scopes every physical write.

use crate::error::{Error, Result};
use crate::opc::relationships::rel_types;
use crate::opc::{ContentTypes, Part, PartUri, Relationship, Relationships};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
const PACKAGE_RELS_PATH: &str = "_rels/.rels";

/// A package shared by every document opened on it
pub type SharedPackage = Arc<Mutex<Package>>;

/// An OPC package (ZIP-based container)
#[derive(Debug, Default)]
pub struct Package {
    parts: BTreeMap<PartUri, Part>,
    /// Package-level relationships (/_rels/.rels)
    relationships: Relationships,
    content_types: ContentTypes,
}

impl Package {
    pub fn new() -> Self {
        Self {
            content_types: ContentTypes::new(),
            ..Default::default()
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let content_types = match read_entry(&mut archive, CONTENT_TYPES_PATH)? {
            Some(text) => ContentTypes::from_xml(&text)?,
            None => return Err(Error::MissingPart(CONTENT_TYPES_PATH.into())),
        };
        let relationships = match read_entry(&mut archive, PACKAGE_RELS_PATH)? {
            Some(text) => Relationships::from_xml(&text)?,
            None => Relationships::new(),
        };

        let mut package = Self {
            parts: BTreeMap::new(),
            relationships,
            content_types,
        };

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            if name.ends_with('/') || name == CONTENT_TYPES_PATH {
                continue;
            }

            let uri = PartUri::new(&name)?;
            if uri.is_relationships() {
                continue;
            }

            let content_type = package
                .content_types
                .get(&uri)
                .unwrap_or("application/octet-stream")
                .to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            package.parts.insert(uri.clone(), Part::new(uri, content_type, data));
        }

        let uris: Vec<PartUri> = package.parts.keys().cloned().collect();
        for uri in uris {
            let rels_uri = uri.relationships_uri();
            if let Some(text) = read_entry(&mut archive, rels_uri.zip_path())? {
                let rels = Relationships::from_xml(&text)?;
                if let Some(part) = package.parts.get_mut(&uri) {
                    part.set_relationships(rels);
                }
            }
        }

        log::debug!("opened package with {} parts", package.parts.len());
        Ok(package)
    }

    /// Wrap this package for sharing between documents
    pub fn into_shared(self) -> SharedPackage {
        Arc::new(Mutex::new(self))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_to(File::create(path)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(Cursor::new(&mut buf))?;
        Ok(buf)
    }

    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(CONTENT_TYPES_PATH, options)?;
        self.content_types.write_to(&mut zip)?;

        if !self.relationships.is_empty() {
            zip.start_file(PACKAGE_RELS_PATH, options)?;
            self.relationships.write_to(&mut zip)?;
        }

        for (uri, part) in &self.parts {
            zip.start_file(uri.zip_path(), options)?;
            zip.write_all(part.data())?;

            if !part.relationships().is_empty() {
                zip.start_file(uri.relationships_uri().zip_path(), options)?;
                part.relationships().write_to(&mut zip)?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    /// Part by name, e.g. `/word/document.xml`
    pub fn get_part(&self, name: &str) -> Option<&Part> {
        let uri = PartUri::new(name).ok()?;
        self.parts.get(&uri)
    }

    /// Store `data` as part `name`, replacing any existing bytes.
    ///
    /// Relationships of an existing part are kept.
    pub fn put_part(&mut self, name: &str, content_type: &str, data: Vec<u8>) -> Result<()> {
        let uri = PartUri::new(name)?;
        self.content_types.add_override(&uri, content_type);
        match self.parts.get_mut(&uri) {
            Some(part) => part.set_data(data),
            None => {
                self.parts
                    .insert(uri.clone(), Part::new(uri, content_type, data));
            }
        }
        Ok(())
    }

    pub fn remove_part(&mut self, name: &str) -> Option<Part> {
        let uri = PartUri::new(name).ok()?;
        self.content_types.remove_override(&uri);
        self.parts.remove(&uri)
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Package-level relationships
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Relate `source` (or the package itself when `None`) to the part `target`.
    pub fn create_relationship(
        &mut self,
        source: Option<&str>,
        target: &str,
        rel_type: &str,
    ) -> Result<String> {
        let target = PartUri::new(target)?;
        match source {
            None => Ok(self.relationships.add(rel_type, target.zip_path())),
            Some(name) => {
                let uri = PartUri::new(name)?;
                let part = self
                    .parts
                    .get_mut(&uri)
                    .ok_or_else(|| Error::PartNotFound(uri.to_string()))?;
                let relative = target.relative_to(&uri);
                Ok(part.relationships_mut().add(rel_type, &relative))
            }
        }
    }

    pub fn delete_relationship(&mut self, source: Option<&str>, id: &str) -> Result<Relationship> {
        let (rels, source_part) = match source {
            None => (&mut self.relationships, "/".to_string()),
            Some(name) => {
                let uri = PartUri::new(name)?;
                let part = self
                    .parts
                    .get_mut(&uri)
                    .ok_or_else(|| Error::PartNotFound(uri.to_string()))?;
                (part.relationships_mut(), uri.to_string())
            }
        };

        rels.remove(id).ok_or(Error::RelationshipNotFound {
            source_part,
            id: id.to_string(),
        })
    }

    /// Name of the main document part
    pub fn main_document_uri(&self) -> Option<PartUri> {
        let rel = self.relationships.by_type(rel_types::OFFICE_DOCUMENT)?;
        PartUri::new(&rel.target).ok()
    }

    /// Part related to `source` by the first relationship of `rel_type`
    pub fn related_part_uri(&self, source: &PartUri, rel_type: &str) -> Option<PartUri> {
        let rel = self.parts.get(source)?.relationships().by_type(rel_type)?;
        if rel.external {
            return None;
        }
        source.resolve(&rel.target).ok()
    }
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Option<String>> {
    match archive.by_name(path) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(Some(content))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
