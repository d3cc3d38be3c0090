//! Drawing targets for the layout engine.
//!
//! The engine only talks to [`Surface`]. [`SvgSurface`] builds an SVG document
//! and rasterizes it to PNG through resvg.

use std::f32::consts::PI;
use std::fmt::Write;
use std::sync::Arc;

use resvg::tiny_skia;
use resvg::usvg::{self, fontdb};

use crate::error::CardError;
use crate::header::HeaderImage;
use crate::metrics::FontSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const WHITE: Color = Color(0xFF, 0xFF, 0xFF);
    pub const INK: Color = Color(0x22, 0x22, 0x22);

    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

/// Ellipse with rotation in radians, the way canvas `ellipse()` takes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub cx: f32,
    pub cy: f32,
    pub rx: f32,
    pub ry: f32,
    pub rotation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPaint {
    pub fill: Color,
    /// Outline drawn underneath the fill.
    pub stroke: Option<Stroke>,
    pub anchor: TextAnchor,
}

impl TextPaint {
    pub const fn fill(color: Color) -> Self {
        Self {
            fill: color,
            stroke: None,
            anchor: TextAnchor::Start,
        }
    }

    pub const fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub const fn centered(mut self) -> Self {
        self.anchor = TextAnchor::Middle;
        self
    }
}

/// Primitive drawing operations used by the card layout.
///
/// Text `y` is the alphabetic baseline.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);
    fn fill_ellipse(&mut self, ellipse: Ellipse, color: Color, opacity: f32);
    fn circle(&mut self, cx: f32, cy: f32, r: f32, fill: Option<Color>, stroke: Option<Stroke>);
    /// Stroke a circular arc from `start` to `end` radians, clockwise on screen.
    fn arc(&mut self, cx: f32, cy: f32, r: f32, start: f32, end: f32, stroke: Stroke);
    fn image(&mut self, rect: Rect, image: &HeaderImage);
    fn text(&mut self, text: &str, x: f32, y: f32, font: &FontSpec, paint: &TextPaint);
}

/// SVG document builder.
pub struct SvgSurface {
    width: u32,
    height: u32,
    font_family: String,
    body: String,
}

impl SvgSurface {
    pub fn new(width: u32, height: u32, font_family: impl Into<String>) -> Self {
        Self {
            width,
            height,
            font_family: font_family.into(),
            body: String::with_capacity(8192),
        }
    }

    /// Close the document and return the SVG source.
    pub fn finish(self) -> String {
        let (w, h) = (self.width, self.height);
        let mut s = String::with_capacity(self.body.len() + 256);
        let _ = write!(
            s,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        );
        s.push_str(&self.body);
        s.push_str("</svg>");
        s
    }

    /// Rasterize with `fontdb` providing the text faces.
    pub fn into_png(self, fontdb: Arc<fontdb::Database>) -> Result<Vec<u8>, CardError> {
        rasterize(&self.finish(), fontdb)
    }
}

impl Surface for SvgSurface {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            color.hex()
        );
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            stroke.color.hex(),
            stroke.width
        );
    }

    fn fill_ellipse(&mut self, e: Ellipse, color: Color, opacity: f32) {
        let degrees = e.rotation * 180.0 / PI;
        let _ = write!(
            self.body,
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" transform="rotate({degrees} {} {})" fill="{}" fill-opacity="{opacity}"/>"#,
            e.cx,
            e.cy,
            e.rx,
            e.ry,
            e.cx,
            e.cy,
            color.hex()
        );
    }

    fn circle(&mut self, cx: f32, cy: f32, r: f32, fill: Option<Color>, stroke: Option<Stroke>) {
        let fill = fill.map_or_else(|| "none".to_string(), Color::hex);
        let _ = write!(
            self.body,
            r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{fill}"{}/>"#,
            stroke_attrs(stroke)
        );
    }

    fn arc(&mut self, cx: f32, cy: f32, r: f32, start: f32, end: f32, stroke: Stroke) {
        let (x0, y0) = (cx + r * start.cos(), cy + r * start.sin());
        let (x1, y1) = (cx + r * end.cos(), cy + r * end.sin());
        let large = if (end - start).abs() > PI { 1 } else { 0 };
        let _ = write!(
            self.body,
            r#"<path d="M {x0} {y0} A {r} {r} 0 {large} 1 {x1} {y1}" fill="none" stroke-linecap="round"{}/>"#,
            stroke_attrs(Some(stroke))
        );
    }

    fn image(&mut self, rect: Rect, image: &HeaderImage) {
        let _ = write!(
            self.body,
            r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none" href="{}"/>"#,
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            image.data_uri()
        );
    }

    fn text(&mut self, text: &str, x: f32, y: f32, font: &FontSpec, paint: &TextPaint) {
        if text.is_empty() {
            return;
        }
        let anchor = match paint.anchor {
            TextAnchor::Start => "",
            TextAnchor::Middle => r#" text-anchor="middle""#,
        };
        let outline = match paint.stroke {
            Some(stroke) => format!(
                r#"{} stroke-linejoin="round" paint-order="stroke""#,
                stroke_attrs(Some(stroke))
            ),
            None => String::new(),
        };
        let _ = write!(
            self.body,
            r#"<text x="{x}" y="{y}" font-family="{}" font-size="{}" font-weight="{}" fill="{}"{anchor}{outline} xml:space="preserve">{}</text>"#,
            xml_escape(&self.font_family),
            font.size,
            font.weight.css(),
            paint.fill.hex(),
            xml_escape(text)
        );
    }
}

fn stroke_attrs(stroke: Option<Stroke>) -> String {
    match stroke {
        Some(s) => format!(
            r#" stroke="{}" stroke-width="{}""#,
            s.color.hex(),
            s.width
        ),
        None => String::new(),
    }
}

fn rasterize(svg: &str, fontdb: Arc<fontdb::Database>) -> Result<Vec<u8>, CardError> {
    let mut opt = usvg::Options::default();
    opt.fontdb = fontdb;

    let tree =
        usvg::Tree::from_data(svg.as_bytes(), &opt).map_err(|e| CardError::Svg(e.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap =
        tiny_skia::Pixmap::new(size.width(), size.height()).ok_or(CardError::Pixmap {
            width: size.width(),
            height: size.height(),
        })?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| CardError::Encode(e.to_string()))
}

pub(crate) fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
