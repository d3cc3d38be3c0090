//! Lesson card renderer.
//!
//! Raw lesson text goes through [`compose`] (normalization and block
//! splitting), is laid out in two passes by [`layout::LayoutEngine`] and is
//! rasterized to PNG through an SVG [`surface`].

pub mod compose;
pub mod error;
pub mod header;
pub mod layout;
pub mod metrics;
pub mod render;
pub mod styled;
pub mod surface;
pub mod wrap;

pub use compose::{Normalizer, compose_blocks, split_blocks};
pub use error::CardError;
pub use header::{BackgroundSource, HeaderImage};
pub use layout::{
    CanvasPlan, CardBlock, CardFonts, CardStyle, CardTheme, LayoutEngine, LineRole, MeasuredCard,
    SizingPolicy, TitleAlign,
};
pub use metrics::{FontBook, FontSpec, FontWeight, TextMeasure, resolve_generic_sans};
pub use render::CardRenderer;
pub use styled::{RunStyle, StyledRun, render_styled_line, split_runs};
pub use surface::{Color, Ellipse, Rect, Stroke, Surface, SvgSurface, TextAnchor, TextPaint};
pub use wrap::{split_oversized_word, wrap_text};

/// Re-exported so callers can build a shared font database.
pub use resvg::usvg::fontdb;
