//! Data model shared by the planning, rendering and scheduling stages.
//!
//! Chunks describe what to render, layout elements describe how a chunk's
//! lines become flowable content, and render results carry per-chunk
//! outcomes back to the caller as plain data.

mod chunk;
mod element;
mod result;
mod table;

pub use chunk::Chunk;
pub use element::{Alignment, LayoutElement, ParagraphStyle};
pub use result::{ConversionReport, RenderResult};
pub use table::TableBlock;
