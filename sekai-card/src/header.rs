//! Card header band: a supplied background image, or the flat sky colour
//! with clouds, the globe mascot and the wordmark.

use std::f32::consts::PI;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, warn};

use crate::error::CardError;
use crate::layout::CardStyle;
use crate::surface::{Color, Ellipse, Rect, Stroke, Surface, TextPaint};

/// Where a background image comes from.
#[derive(Debug, Clone)]
pub enum BackgroundSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Decoded background image, re-encoded as PNG for embedding.
#[derive(Debug, Clone)]
pub struct HeaderImage {
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl HeaderImage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CardError> {
        let decoded = image::load_from_memory(bytes).map_err(|e| CardError::Image(e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(CardError::Image("image has zero size".to_string()));
        }

        let mut png = Vec::new();
        decoded
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| CardError::Image(e.to_string()))?;

        Ok(Self { width, height, png })
    }

    /// Read and decode an image file.
    ///
    /// Failures are logged and return `None`; the caller falls back to the
    /// flat header.
    pub async fn load(path: &Path) -> Option<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("background image {} unreadable: {e}", path.display());
                return None;
            }
        };
        Self::decode_or_warn(&bytes, &path.display().to_string())
    }

    pub async fn resolve(source: &BackgroundSource) -> Option<Self> {
        match source {
            BackgroundSource::Path(path) => Self::load(path).await,
            BackgroundSource::Bytes(bytes) => Self::decode_or_warn(bytes, "in-memory image"),
        }
    }

    fn decode_or_warn(bytes: &[u8], label: &str) -> Option<Self> {
        match Self::from_bytes(bytes) {
            Ok(image) => {
                debug!("background image {label}: {}x{}", image.width, image.height);
                Some(image)
            }
            Err(e) => {
                warn!("background image {label} could not be decoded: {e}");
                None
            }
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Height of the image when scaled to `width`, keeping its aspect ratio.
    pub fn height_for_width(&self, width: f32) -> f32 {
        (width * self.height as f32 / self.width as f32).round()
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", BASE64.encode(&self.png))
    }
}

/// Header band height for a card of `width` pixels.
pub(crate) fn header_height(style: &CardStyle, header: Option<&HeaderImage>, width: f32) -> f32 {
    match header {
        Some(image) => image.height_for_width(width),
        None => style.policy.header_height,
    }
}

pub(crate) fn draw_header<S: Surface>(
    surface: &mut S,
    style: &CardStyle,
    header: Option<&HeaderImage>,
    width: f32,
    height: f32,
) {
    match header {
        Some(image) => surface.image(Rect::new(0.0, 0.0, width, height), image),
        None => draw_flat_header(surface, style, width, height),
    }
}

fn draw_flat_header<S: Surface>(surface: &mut S, style: &CardStyle, width: f32, height: f32) {
    let theme = &style.theme;
    surface.fill_rect(Rect::new(0.0, 0.0, width, height), theme.header_color);

    let mid_x = width / 2.0;
    let mid_y = height / 2.0;
    draw_cloud(surface, mid_x - 120.0, mid_y - 30.0, 1.1);
    draw_cloud(surface, mid_x + 100.0, mid_y - 40.0, 0.9);
    draw_cloud(surface, mid_x - 40.0, mid_y + 50.0, 0.7);

    draw_mascot(surface, mid_x, mid_y + 10.0);

    surface.text(
        &theme.wordmark,
        mid_x,
        55.0,
        &style.fonts.wordmark,
        &TextPaint::fill(theme.text_color).centered(),
    );
}

fn draw_cloud<S: Surface>(surface: &mut S, cx: f32, cy: f32, scale: f32) {
    let puffs = [
        (0.0, 0.0, 32.0, 20.0),
        (-22.0, 6.0, 18.0, 14.0),
        (22.0, 6.0, 18.0, 14.0),
        (0.0, 12.0, 22.0, 14.0),
    ];
    for (dx, dy, rx, ry) in puffs {
        surface.fill_ellipse(
            Ellipse {
                cx: cx + dx * scale,
                cy: cy + dy * scale,
                rx: rx * scale,
                ry: ry * scale,
                rotation: 0.0,
            },
            Color::WHITE,
            0.92,
        );
    }
}

const WATER: Color = Color(0x6A, 0x9C, 0xFD);
const LAND: Color = Color(0x4C, 0xB0, 0x50);

fn draw_mascot<S: Surface>(surface: &mut S, x: f32, y: f32) {
    let radius = 60.0;
    surface.circle(
        x,
        y,
        radius,
        Some(WATER),
        Some(Stroke {
            color: LAND,
            width: 3.0,
        }),
    );

    let continents = [
        (x - 20.0, y, 18.0, 10.0, PI / 6.0),
        (x + 15.0, y + 20.0, 12.0, 8.0, -PI / 4.0),
    ];
    for (cx, cy, rx, ry, rotation) in continents {
        surface.fill_ellipse(
            Ellipse {
                cx,
                cy,
                rx,
                ry,
                rotation,
            },
            LAND,
            1.0,
        );
    }

    // eyes, then highlights
    surface.circle(x - 18.0, y - 10.0, 6.0, Some(Color::INK), None);
    surface.circle(x + 18.0, y - 10.0, 6.0, Some(Color::INK), None);
    surface.circle(x - 16.0, y - 12.0, 2.0, Some(Color::WHITE), None);
    surface.circle(x + 20.0, y - 12.0, 2.0, Some(Color::WHITE), None);

    surface.arc(
        x,
        y + 5.0,
        18.0,
        PI / 8.0,
        PI - PI / 8.0,
        Stroke {
            color: Color::INK,
            width: 3.0,
        },
    );
}
