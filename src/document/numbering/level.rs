//! Level definitions for numbering

use crate::xml::RawXmlElement;

use super::types::NumberFormat;

/// Builder for a level definition (w:lvl)
#[derive(Clone, Debug)]
pub struct Level {
    /// Level index (0-8)
    pub ilvl: u8,
    pub start: u32,
    pub num_fmt: NumberFormat,
    /// Level text (e.g., "%1.", "%1.%2.")
    pub level_text: String,
    pub lvl_jc: String,
    /// Left indentation (twips)
    pub ind_left: u32,
    /// Hanging indentation (twips)
    pub ind_hanging: u32,
    /// Symbol font for bullet glyphs
    pub font: Option<String>,
}

impl Level {
    pub fn new(ilvl: u8, num_fmt: NumberFormat, level_text: impl Into<String>) -> Self {
        Level {
            ilvl,
            start: 1,
            num_fmt,
            level_text: level_text.into(),
            lvl_jc: "left".into(),
            ind_left: 720 * (u32::from(ilvl) + 1),
            ind_hanging: 360,
            font: None,
        }
    }

    pub fn with_start(mut self, start: u32) -> Self {
        self.start = start;
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    /// Render as a `w:lvl` element, children in schema order
    pub fn to_raw(&self) -> RawXmlElement {
        let mut lvl = RawXmlElement::new("w:lvl")
            .with_attr("w:ilvl", self.ilvl.to_string())
            .with_child(RawXmlElement::new("w:start").with_attr("w:val", self.start.to_string()))
            .with_child(RawXmlElement::new("w:numFmt").with_attr("w:val", self.num_fmt.as_str()))
            .with_child(RawXmlElement::new("w:lvlText").with_attr("w:val", self.level_text.as_str()))
            .with_child(RawXmlElement::new("w:lvlJc").with_attr("w:val", self.lvl_jc.as_str()))
            .with_child(
                RawXmlElement::new("w:pPr").with_child(
                    RawXmlElement::new("w:ind")
                        .with_attr("w:left", self.ind_left.to_string())
                        .with_attr("w:hanging", self.ind_hanging.to_string()),
                ),
            );

        if let Some(font) = &self.font {
            lvl.push_child(
                RawXmlElement::new("w:rPr").with_child(
                    RawXmlElement::new("w:rFonts")
                        .with_attr("w:ascii", font.as_str())
                        .with_attr("w:hAnsi", font.as_str())
                        .with_attr("w:hint", "default"),
                ),
            );
        }
        lvl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_level_to_raw() {
        let raw = Level::new(1, NumberFormat::LowerLetter, "%2)").with_start(3).to_raw();

        assert_eq!(raw.attr("w:ilvl"), Some("1"));
        assert_eq!(raw.child("start").unwrap().attr("w:val"), Some("3"));
        assert_eq!(raw.child("numFmt").unwrap().attr("w:val"), Some("lowerLetter"));
        let ind = raw.child("pPr").unwrap().child("ind").unwrap();
        assert_eq!(ind.attr("w:left"), Some("1440"));
        assert!(raw.child("rPr").is_none());
    }

    #[test]
    fn test_bullet_font() {
        let raw = Level::new(0, NumberFormat::Bullet, "\u{f0b7}")
            .with_font("Symbol")
            .to_raw();
        let fonts = raw.child("rPr").unwrap().child("rFonts").unwrap();
        assert_eq!(fonts.attr("w:ascii"), Some("Symbol"));
    }
}
