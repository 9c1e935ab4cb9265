//! Numbering instance definitions

use crate::error::{Error, Result};
use crate::xml::RawXmlElement;

use super::{parse_id, required_attr};
use crate::document::NUMBERING_PART;

/// Numbering instance (w:num), kept verbatim
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Num {
    id: u32,
    abstract_num_id: u32,
    pub raw: RawXmlElement,
}

impl Num {
    /// Create a new numbering instance
    pub fn new(num_id: u32, abstract_num_id: u32) -> Self {
        let raw = RawXmlElement::new("w:num")
            .with_attr("w:numId", num_id.to_string())
            .with_child(
                RawXmlElement::new("w:abstractNumId").with_attr("w:val", abstract_num_id.to_string()),
            );
        Num {
            id: num_id,
            abstract_num_id,
            raw,
        }
    }

    /// Instance whose first level counts from 1 again
    pub fn restart(num_id: u32, abstract_num_id: u32) -> Self {
        let mut num = Self::new(num_id, abstract_num_id);
        num.raw.push_child(
            RawXmlElement::new("w:lvlOverride")
                .with_attr("w:ilvl", "0")
                .with_child(RawXmlElement::new("w:startOverride").with_attr("w:val", "1")),
        );
        num
    }

    pub(crate) fn from_raw(raw: RawXmlElement) -> Result<Self> {
        let id = parse_id(required_attr(&raw, "w:numId")?)?;
        let abstract_num_id = raw
            .child("abstractNumId")
            .and_then(|e| e.attr("w:val"))
            .ok_or_else(|| Error::malformed(NUMBERING_PART, format!("w:num {} has no w:abstractNumId", id)))?;
        let abstract_num_id = parse_id(abstract_num_id)?;
        Ok(Num {
            id,
            abstract_num_id,
            raw,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn abstract_num_id(&self) -> u32 {
        self.abstract_num_id
    }

    /// Start values overridden per level
    pub fn start_overrides(&self) -> Vec<(u8, u32)> {
        self.raw
            .elements()
            .filter(|e| e.local_name() == "lvlOverride")
            .filter_map(|e| {
                let ilvl = e.attr("w:ilvl")?.parse().ok()?;
                let start = e.child("startOverride")?.attr("w:val")?.parse().ok()?;
                Some((ilvl, start))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_restart_adds_override() {
        let num = Num::restart(5, 2);
        assert_eq!(num.id(), 5);
        assert_eq!(num.abstract_num_id(), 2);
        assert_eq!(num.start_overrides(), vec![(0, 1)]);
        assert!(Num::new(5, 2).start_overrides().is_empty());
    }

    #[test]
    fn test_from_raw() {
        let num = Num::from_raw(Num::restart(3, 1).raw).unwrap();
        assert_eq!((num.id(), num.abstract_num_id()), (3, 1));

        let orphan = RawXmlElement::new("w:num").with_attr("w:numId", "3");
        assert!(matches!(Num::from_raw(orphan), Err(Error::MalformedPart { .. })));
    }
}
