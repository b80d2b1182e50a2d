use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Font weight/slant of a document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FontWeight {
    Plain,
    Bold,
    Italic,
    BoldItalic,
}

impl FontWeight {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(FontWeight::Plain),
            1 => Some(FontWeight::Bold),
            2 => Some(FontWeight::Italic),
            3 => Some(FontWeight::BoldItalic),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            FontWeight::Plain => 0,
            FontWeight::Bold => 1,
            FontWeight::Italic => 2,
            FontWeight::BoldItalic => 3,
        }
    }
}

/// Presentation metadata attached to a document. Opaque to the edit engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub struct Style {
    pub font: u32,
    pub weight: FontWeight,
    pub size: u32,
    pub color: u32,
}

impl Style {
    pub fn new(font: u32, weight: FontWeight, size: u32, color: u32) -> Self {
        Self { font, weight, size, color }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(1, FontWeight::Plain, 12, 0)
    }
}

/// Wire form: four integers separated by single spaces.
impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.font, self.weight.code(), self.size, self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_renders_like_the_wire_format() {
        assert_eq!(Style::default().to_string(), "1 0 12 0");
    }

    #[test]
    fn weight_codes_round_trip() {
        for code in 0..4 {
            assert_eq!(FontWeight::from_code(code).map(FontWeight::code), Some(code));
        }
        assert_eq!(FontWeight::from_code(4), None);
    }
}
