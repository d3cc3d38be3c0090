//! Top-level card rendering: normalize, lay out, rasterize.

use std::sync::Arc;

use resvg::usvg::fontdb;
use tracing::{debug, info};

use crate::compose::{Normalizer, compose_blocks};
use crate::error::CardError;
use crate::header::{BackgroundSource, HeaderImage};
use crate::layout::{CardBlock, CardStyle, LayoutEngine};
use crate::metrics::{FontBook, TextMeasure};
use crate::surface::SvgSurface;

/// Renders lesson text into PNG cards.
///
/// Holds no per-call state, so one renderer can be shared behind an `Arc`
/// and used from several blocking tasks at once.
pub struct CardRenderer<M = FontBook> {
    measure: M,
    fontdb: Arc<fontdb::Database>,
    css_family: String,
    style: CardStyle,
    normalizer: Normalizer,
}

impl CardRenderer<FontBook> {
    /// Scan system fonts for `families` and build a renderer.
    ///
    /// Blocking; call once at startup.
    pub fn system(families: &[String], style: CardStyle) -> Result<Self, CardError> {
        let book = FontBook::system(families)?;
        info!(
            "card fonts resolved: {}",
            book.resolved_families().collect::<Vec<_>>().join(", ")
        );
        Ok(Self::from_font_book(book, style))
    }

    pub fn from_font_book(book: FontBook, style: CardStyle) -> Self {
        let fontdb = book.database();
        let css_family = book.css_family().to_string();
        Self::with_measure(book, fontdb, css_family, style)
    }
}

impl<M: TextMeasure> CardRenderer<M> {
    /// Renderer with a custom measurer. `fontdb` is used for rasterizing only.
    pub fn with_measure(
        measure: M,
        fontdb: Arc<fontdb::Database>,
        css_family: impl Into<String>,
        style: CardStyle,
    ) -> Self {
        let normalizer = Normalizer::new(&style.theme.title_sentinel);
        Self {
            measure,
            fontdb,
            css_family: css_family.into(),
            style,
            normalizer,
        }
    }

    /// Normalize raw lesson text and render it.
    pub fn compose(&self, raw: &str, header: Option<&HeaderImage>) -> Result<Vec<u8>, CardError> {
        let blocks = compose_blocks(raw, &self.normalizer);
        self.render_blocks(&blocks, header)
    }

    /// Load the optional background, then compose.
    ///
    /// A background that cannot be read or decoded falls back to the flat
    /// header; it never fails the call.
    pub async fn compose_with_background(
        &self,
        raw: &str,
        background: Option<&BackgroundSource>,
    ) -> Result<Vec<u8>, CardError> {
        let header = match background {
            Some(source) => HeaderImage::resolve(source).await,
            None => None,
        };
        self.compose(raw, header.as_ref())
    }

    /// Run both layout phases over prepared blocks and encode the result.
    pub fn render_blocks(
        &self,
        blocks: &[CardBlock],
        header: Option<&HeaderImage>,
    ) -> Result<Vec<u8>, CardError> {
        let engine = LayoutEngine::new(&self.measure, &self.style);
        let measured = engine.measure(blocks, header);
        let plan = measured.plan;
        debug!(
            "card plan {}x{} for {} blocks",
            plan.width,
            plan.height,
            blocks.len()
        );

        let mut surface = SvgSurface::new(plan.width, plan.height, self.css_family.as_str());
        let drawn = engine.render(&mut surface, blocks, &measured, header);
        check_phases(&measured.block_line_counts, &drawn)?;

        surface.into_png(Arc::clone(&self.fontdb))
    }
}

fn check_phases(measured: &[usize], rendered: &[usize]) -> Result<(), CardError> {
    let longest = measured.len().max(rendered.len());
    for block in 0..longest {
        let m = measured.get(block).copied().unwrap_or(0);
        let r = rendered.get(block).copied().unwrap_or(0);
        if m != r {
            return Err(CardError::PhaseMismatch {
                block,
                measured: m,
                rendered: r,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_counts_pass() {
        assert!(check_phases(&[1, 3, 2], &[1, 3, 2]).is_ok());
    }

    #[test]
    fn first_divergent_block_is_reported() {
        let err = check_phases(&[1, 3, 2], &[1, 4, 2]).unwrap_err();
        assert!(matches!(
            err,
            CardError::PhaseMismatch {
                block: 1,
                measured: 3,
                rendered: 4
            }
        ));
    }

    #[test]
    fn missing_rendered_block_is_a_mismatch() {
        let err = check_phases(&[1, 2], &[1]).unwrap_err();
        assert!(matches!(
            err,
            CardError::PhaseMismatch {
                block: 1,
                measured: 2,
                rendered: 0
            }
        ));
    }
}
