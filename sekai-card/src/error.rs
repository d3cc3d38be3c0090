/// Card rendering errors.
///
/// Font resolution and rasterization failures are fatal for a render call.
/// Background image problems never surface here: they are logged and the
/// flat header is drawn instead.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("no font face found for families: {0}")]
    FontUnavailable(String),

    #[error("failed to load font face '{0}'")]
    FontLoad(String),

    #[error("image decode: {0}")]
    Image(String),

    #[error("SVG parse: {0}")]
    Svg(String),

    #[error("pixmap allocation failed ({width}x{height})")]
    Pixmap { width: u32, height: u32 },

    #[error("PNG encode: {0}")]
    Encode(String),

    #[error("block {block}: measured {measured} lines but rendered {rendered}")]
    PhaseMismatch {
        block: usize,
        measured: usize,
        rendered: usize,
    },
}
