use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("'{0}' is not a color of the form #RRGGBB")]
pub struct ColorParseError(pub String);

/// An sRGB color in the `#RRGGBB` form that HTML color inputs submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const BLACK: HexColor = HexColor { r: 0, g: 0, b: 0 };
    pub const WHITE: HexColor = HexColor {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        HexColor { r, g, b }
    }

    /// Parse `#RRGGBB`. Hex digits are case-insensitive, the leading `#` is
    /// optional, and nothing shorter or longer is accepted: the 3-digit CSS
    /// shorthand and alpha variants are rejected.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError(input.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| -> Result<u8, ColorParseError> {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorParseError(input.to_string()))
        };
        Ok(HexColor {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HexColor::parse(s)
    }
}

impl From<HexColor> for image::Rgb<u8> {
    fn from(color: HexColor) -> Self {
        image::Rgb([color.r, color.g, color.b])
    }
}

impl serde::Serialize for HexColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for HexColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
