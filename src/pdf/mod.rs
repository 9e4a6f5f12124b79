//! PDF output: font registry, page geometry and document building.

mod builder;
pub(crate) mod font;
mod layout;

pub use builder::{BuildSummary, DocumentBuilder};
pub use font::{FontLocator, FontRegistry, Glyph, RegisteredFont};
pub use layout::{wrap, Margins, PageConfig, TableStyle, A4_HEIGHT, A4_WIDTH, DEFAULT_MARGIN};
