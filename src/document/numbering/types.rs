//! Numbering-related types and enums

/// Number format (`w:numFmt`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    /// 1, 2, 3
    Decimal,
    /// I, II, III
    UpperRoman,
    /// i, ii, iii
    LowerRoman,
    /// A, B, C
    UpperLetter,
    /// a, b, c
    LowerLetter,
    /// •
    Bullet,
    /// 01, 02, 03
    DecimalZero,
    /// None (no number)
    None,
    /// Other format (preserved as string)
    Other(String),
}

impl std::str::FromStr for NumberFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "decimal" => NumberFormat::Decimal,
            "upperRoman" => NumberFormat::UpperRoman,
            "lowerRoman" => NumberFormat::LowerRoman,
            "upperLetter" => NumberFormat::UpperLetter,
            "lowerLetter" => NumberFormat::LowerLetter,
            "bullet" => NumberFormat::Bullet,
            "decimalZero" => NumberFormat::DecimalZero,
            "none" => NumberFormat::None,
            other => NumberFormat::Other(other.to_string()),
        })
    }
}

impl NumberFormat {
    pub fn as_str(&self) -> &str {
        match self {
            NumberFormat::Decimal => "decimal",
            NumberFormat::UpperRoman => "upperRoman",
            NumberFormat::LowerRoman => "lowerRoman",
            NumberFormat::UpperLetter => "upperLetter",
            NumberFormat::LowerLetter => "lowerLetter",
            NumberFormat::Bullet => "bullet",
            NumberFormat::DecimalZero => "decimalZero",
            NumberFormat::None => "none",
            NumberFormat::Other(s) => s,
        }
    }

    pub fn is_bullet(&self) -> bool {
        matches!(self, NumberFormat::Bullet)
    }
}

/// Kind of list created by [`Numbering::create_list`](super::Numbering::create_list)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListStyle {
    /// New bullet definition
    Bullet,
    /// New decimal definition
    Decimal,
    /// New instance of an existing abstract definition, counting from 1 again
    Restart(u32),
}

/// Ids of a list created in the numbering store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListHandle {
    /// `w:num/@w:numId`, referenced by paragraphs
    pub num_id: u32,
    pub abstract_num_id: u32,
}
