//! Abstract numbering definitions

use crate::error::Result;
use crate::xml::RawXmlElement;

use super::level::Level;
use super::types::NumberFormat;
use super::{parse_id, required_attr};

const BULLET_GLYPHS: [(&str, Option<&str>); 3] = [
    ("\u{f0b7}", Some("Symbol")),
    ("o", Some("Courier New")),
    ("\u{f0a7}", Some("Wingdings")),
];

/// Abstract numbering definition (w:abstractNum), kept verbatim
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbstractNum {
    id: u32,
    pub raw: RawXmlElement,
}

impl AbstractNum {
    pub(crate) fn from_raw(raw: RawXmlElement) -> Result<Self> {
        let id = parse_id(required_attr(&raw, "w:abstractNumId")?)?;
        Ok(Self { id, raw })
    }

    fn with_levels(id: u32, levels: impl Iterator<Item = Level>) -> Self {
        let raw = levels.fold(
            RawXmlElement::new("w:abstractNum")
                .with_attr("w:abstractNumId", id.to_string())
                .with_child(RawXmlElement::new("w:multiLevelType").with_attr("w:val", "hybridMultilevel")),
            |raw, level| raw.with_child(level.to_raw()),
        );
        Self { id, raw }
    }

    /// Nine-level bullet list
    pub fn bullet_list(id: u32) -> Self {
        Self::with_levels(
            id,
            (0..9u8).map(|ilvl| {
                let (glyph, font) = BULLET_GLYPHS[usize::from(ilvl) % BULLET_GLYPHS.len()];
                let level = Level::new(ilvl, NumberFormat::Bullet, glyph);
                match font {
                    Some(font) => level.with_font(font),
                    None => level,
                }
            }),
        )
    }

    /// Nine-level decimal list: "1.", "a.", "i." repeating
    pub fn decimal_list(id: u32) -> Self {
        Self::with_levels(
            id,
            (0..9u8).map(|ilvl| {
                let format = match ilvl % 3 {
                    0 => NumberFormat::Decimal,
                    1 => NumberFormat::LowerLetter,
                    _ => NumberFormat::LowerRoman,
                };
                Level::new(ilvl, format, format!("%{}.", ilvl + 1))
            }),
        )
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number format of level `ilvl`
    pub fn format(&self, ilvl: u8) -> Option<NumberFormat> {
        let ilvl = ilvl.to_string();
        let level = self
            .raw
            .elements()
            .find(|e| e.local_name() == "lvl" && e.attr("w:ilvl") == Some(ilvl.as_str()))?;
        level.child("numFmt")?.attr("w:val")?.parse().ok()
    }
}
