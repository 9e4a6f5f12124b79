//! Per-line text processing: table detection, RTL shaping and rendering
//! lines into layout elements.

mod line_renderer;
pub mod markup;
mod reshape;
mod shaper;
mod table_detector;

pub use line_renderer::{LineRenderer, DEFAULT_SPACER_HEIGHT};
pub use reshape::{needs_reshaping, reshape};
pub use shaper::{
    contains_rtl, visual_order, ArabicReshaper, RtlShaper, ShapeOutput, ShapingStage,
    DEFAULT_CACHE_CAPACITY,
};
pub use table_detector::{Segment, TableDetector};
