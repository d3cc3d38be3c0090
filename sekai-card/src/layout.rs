//! Two-pass card layout.
//!
//! [`LayoutEngine::measure`] walks every block with the same fonts and wrap
//! width that [`LayoutEngine::render`] later draws with, so the canvas it
//! sizes always fits what gets drawn. Width is clamped to the policy range;
//! height only has a floor and grows with the content.

use crate::header::{HeaderImage, draw_header, header_height};
use crate::metrics::{FontSpec, TextMeasure};
use crate::styled::{has_bold_span, render_styled_line, styled_width};
use crate::surface::{Color, Rect, Stroke, Surface, TextPaint};
use crate::wrap::wrap_text;

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Canvas sizing and spacing, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingPolicy {
    pub min_width: f32,
    pub max_width: f32,
    /// Height floor; cards are never shorter than this.
    pub base_height: f32,
    /// Header band height when no background image is used.
    pub header_height: f32,
    /// Gap between the header band and the first baseline.
    pub content_top: f32,
    pub left_pad: f32,
    pub line_height: f32,
    pub title_line_height: f32,
    pub block_spacing: f32,
    pub bottom_margin: f32,
    pub border_inset: f32,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            min_width: 800.0,
            max_width: 1200.0,
            base_height: 600.0,
            header_height: 200.0,
            content_top: 50.0,
            left_pad: 50.0,
            line_height: 32.0,
            title_line_height: 48.0,
            block_spacing: 32.0,
            bottom_margin: 60.0,
            border_inset: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardFonts {
    pub body: FontSpec,
    pub title: FontSpec,
    pub bold_run: FontSpec,
    pub heading: FontSpec,
    pub heading_stroke: f32,
    pub wordmark: FontSpec,
}

impl Default for CardFonts {
    fn default() -> Self {
        Self {
            body: FontSpec::regular(22.0),
            title: FontSpec::bold(32.0),
            bold_run: FontSpec::bold(26.0),
            heading: FontSpec::bold(36.0),
            heading_stroke: 2.0,
            wordmark: FontSpec::bold(40.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleAlign {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardTheme {
    pub header_color: Color,
    pub body_color: Color,
    pub text_color: Color,
    pub border: Option<Stroke>,
    pub wordmark: String,
    /// Bold text matching this string is drawn as a heading run.
    pub title_sentinel: String,
    pub title_align: TitleAlign,
    pub title_outline: Option<f32>,
}

impl Default for CardTheme {
    fn default() -> Self {
        Self {
            header_color: Color(0xA3, 0xC9, 0xF9),
            body_color: Color(0xFF, 0xF9, 0xE3),
            text_color: Color::INK,
            border: Some(Stroke {
                color: Color(0xFF, 0xC8, 0x57),
                width: 4.0,
            }),
            wordmark: "Sekai Meetup".to_string(),
            title_sentinel: "Today's small talk".to_string(),
            title_align: TitleAlign::Left,
            title_outline: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardStyle {
    pub policy: SizingPolicy,
    pub fonts: CardFonts,
    pub theme: CardTheme,
}

// ---------------------------------------------------------------------------
// Input and plans
// ---------------------------------------------------------------------------

/// One blank-line separated unit of card text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardBlock {
    pub lines: Vec<String>,
    /// First line uses the title font.
    pub titled: bool,
}

impl CardBlock {
    pub fn body(lines: Vec<String>) -> Self {
        Self {
            lines,
            titled: false,
        }
    }

    pub fn titled(lines: Vec<String>) -> Self {
        Self {
            lines,
            titled: true,
        }
    }

    pub fn role(&self, index: usize) -> LineRole {
        if self.titled && index == 0 {
            LineRole::Title
        } else if self.lines.get(index).is_some_and(|l| has_bold_span(l)) {
            LineRole::Styled
        } else {
            LineRole::Plain
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Title,
    /// Contains `**bold**` spans; drawn run by run on a single line.
    Styled,
    Plain,
}

/// Final canvas dimensions, fixed before anything is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasPlan {
    pub width: u32,
    pub height: u32,
    pub header_height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredCard {
    pub plan: CanvasPlan,
    /// Wrapped line count per block, in block order.
    pub block_line_counts: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct LayoutEngine<'a, M: ?Sized> {
    measure: &'a M,
    style: &'a CardStyle,
}

impl<'a, M: TextMeasure + ?Sized> LayoutEngine<'a, M> {
    pub fn new(measure: &'a M, style: &'a CardStyle) -> Self {
        Self { measure, style }
    }

    /// Canvas width: the longest unwrapped line plus padding, clamped.
    pub fn canvas_width(&self, blocks: &[CardBlock]) -> f32 {
        let longest = blocks
            .iter()
            .flat_map(|block| (0..block.lines.len()).map(move |i| (block, i)))
            .map(|(block, i)| self.natural_width(block, i))
            .fold(0.0_f32, f32::max);

        let policy = &self.style.policy;
        (longest + 2.0 * policy.left_pad)
            .ceil()
            .clamp(policy.min_width, policy.max_width)
    }

    /// Phase 1: size the canvas and count wrapped lines per block.
    pub fn measure(&self, blocks: &[CardBlock], header: Option<&HeaderImage>) -> MeasuredCard {
        let policy = &self.style.policy;
        let width = self.canvas_width(blocks);
        let header_h = header_height(self.style, header, width);
        let content_width = self.content_width(width);

        let mut y = header_h + policy.content_top;
        let mut block_line_counts = Vec::with_capacity(blocks.len());
        for block in blocks {
            let mut count = 0;
            for index in 0..block.lines.len() {
                let (lines, advance) = self.line_extent(block, index, content_width);
                count += lines;
                y += lines as f32 * advance;
            }
            block_line_counts.push(count);
            y += policy.block_spacing;
        }

        let height = (y + policy.bottom_margin).ceil().max(policy.base_height);
        MeasuredCard {
            plan: CanvasPlan {
                width: width as u32,
                height: height as u32,
                header_height: header_h,
            },
            block_line_counts,
        }
    }

    /// Phase 2: draw onto a surface of `measured.plan` size.
    ///
    /// Returns the wrapped line count drawn per block, which matches
    /// `measured.block_line_counts` for the same inputs.
    pub fn render<S: Surface>(
        &self,
        surface: &mut S,
        blocks: &[CardBlock],
        measured: &MeasuredCard,
        header: Option<&HeaderImage>,
    ) -> Vec<usize> {
        let policy = &self.style.policy;
        let fonts = &self.style.fonts;
        let theme = &self.style.theme;
        let width = measured.plan.width as f32;
        let height = measured.plan.height as f32;
        let header_h = measured.plan.header_height;

        draw_header(surface, self.style, header, width, header_h);
        surface.fill_rect(
            Rect::new(0.0, header_h, width, height - header_h),
            theme.body_color,
        );

        let content_width = self.content_width(width);
        let body_paint = TextPaint::fill(theme.text_color);
        let (title_x, title_paint) = self.title_placement(width);

        let mut y = header_h + policy.content_top;
        let mut drawn = Vec::with_capacity(blocks.len());
        for block in blocks {
            let mut count = 0;
            for (index, line) in block.lines.iter().enumerate() {
                match block.role(index) {
                    LineRole::Title => {
                        for wrapped in self.wrapped(line, &fonts.title, content_width) {
                            surface.text(&wrapped, title_x, y, &fonts.title, &title_paint);
                            y += policy.title_line_height;
                            count += 1;
                        }
                    }
                    LineRole::Styled => {
                        y = render_styled_line(
                            surface,
                            self.measure,
                            self.style,
                            line,
                            policy.left_pad,
                            y,
                        );
                        count += 1;
                    }
                    LineRole::Plain => {
                        for wrapped in self.wrapped(line, &fonts.body, content_width) {
                            surface.text(&wrapped, policy.left_pad, y, &fonts.body, &body_paint);
                            y += policy.line_height;
                            count += 1;
                        }
                    }
                }
            }
            drawn.push(count);
            y += policy.block_spacing;
        }

        if let Some(border) = theme.border {
            let inset = policy.border_inset;
            surface.stroke_rect(
                Rect::new(inset, inset, width - 2.0 * inset, height - 2.0 * inset),
                border,
            );
        }

        drawn
    }

    fn content_width(&self, width: f32) -> f32 {
        (width - 2.0 * self.style.policy.left_pad).max(1.0)
    }

    fn natural_width(&self, block: &CardBlock, index: usize) -> f32 {
        let line = &block.lines[index];
        match block.role(index) {
            LineRole::Title => self.measure.width(line, &self.style.fonts.title),
            LineRole::Styled => styled_width(line, self.measure, self.style),
            LineRole::Plain => self.measure.width(line, &self.style.fonts.body),
        }
    }

    /// Number of drawn lines and the baseline advance for one source line.
    fn line_extent(&self, block: &CardBlock, index: usize, content_width: f32) -> (usize, f32) {
        let policy = &self.style.policy;
        let line = &block.lines[index];
        match block.role(index) {
            LineRole::Title => (
                self.wrapped(line, &self.style.fonts.title, content_width).len(),
                policy.title_line_height,
            ),
            LineRole::Styled => (1, policy.line_height),
            LineRole::Plain => (
                self.wrapped(line, &self.style.fonts.body, content_width).len(),
                policy.line_height,
            ),
        }
    }

    /// Wrapped lines, keeping one (empty) line for blank input so vertical
    /// rhythm matches the source text.
    fn wrapped(&self, line: &str, font: &FontSpec, content_width: f32) -> Vec<String> {
        let lines = wrap_text(line, self.measure, font, content_width);
        if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        }
    }

    fn title_placement(&self, width: f32) -> (f32, TextPaint) {
        let theme = &self.style.theme;
        let mut paint = TextPaint::fill(theme.text_color);
        if let Some(outline) = theme.title_outline {
            paint = paint.with_stroke(Stroke {
                color: theme.text_color,
                width: outline,
            });
        }
        match theme.title_align {
            TitleAlign::Left => (self.style.policy.left_pad, paint),
            TitleAlign::Center => (width / 2.0, paint.centered()),
        }
    }
}
