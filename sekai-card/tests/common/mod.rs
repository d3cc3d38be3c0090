#![allow(dead_code)]

use std::sync::Arc;

use sekai_card::{
    CardRenderer, CardStyle, Color, Ellipse, FontSpec, FontWeight, HeaderImage, Rect, Stroke,
    Surface, TextMeasure, TextPaint, fontdb,
};

/// Fixed-advance measurer so layout does not depend on installed fonts.
pub struct MonoMeasure {
    pub advance: f32,
}

impl TextMeasure for MonoMeasure {
    fn width(&self, text: &str, font: &FontSpec) -> f32 {
        let scale = match font.weight {
            FontWeight::Regular => 1.0,
            FontWeight::Bold => 1.2,
        };
        text.chars().count() as f32 * self.advance * scale
    }
}

pub fn renderer() -> CardRenderer<MonoMeasure> {
    CardRenderer::with_measure(
        MonoMeasure { advance: 10.0 },
        Arc::new(fontdb::Database::new()),
        "sans-serif",
        CardStyle::default(),
    )
}

/// Records what was drawn, enough to assert on header and text placement.
#[derive(Default)]
pub struct Recorder {
    pub fills: Vec<(Rect, Color)>,
    pub ellipses: usize,
    pub images: Vec<Rect>,
    pub texts: Vec<(String, f32, f32)>,
}

impl Surface for Recorder {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fills.push((rect, color));
    }
    fn stroke_rect(&mut self, _rect: Rect, _stroke: Stroke) {}
    fn fill_ellipse(&mut self, _ellipse: Ellipse, _color: Color, _opacity: f32) {
        self.ellipses += 1;
    }
    fn circle(&mut self, _: f32, _: f32, _: f32, _: Option<Color>, _: Option<Stroke>) {}
    fn arc(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: Stroke) {}
    fn image(&mut self, rect: Rect, _image: &HeaderImage) {
        self.images.push(rect);
    }
    fn text(&mut self, text: &str, x: f32, y: f32, _font: &FontSpec, _paint: &TextPaint) {
        self.texts.push((text.to_string(), x, y));
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 220, 250]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}
