pub mod color;
pub mod error;
pub mod frequency;
mod layout;
pub mod mask;
pub mod render;
pub mod stopwords;
pub mod typeface;

pub use color::{ColorParseError, HexColor};
pub use error::WordCloudError;
pub use mask::RegionMask;
pub use render::{RenderOptions, WordCloud, encode_png};
pub use stopwords::StopwordSet;
pub use typeface::{BlockTypeface, CoverageMap, FontTypeface, GlyphExtent, Typeface, TypefaceError};
