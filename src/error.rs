use thiserror::Error;

/// Reasons the drawing surface cannot be set up
#[derive(Debug, Error, PartialEq)]
pub enum SurfaceError {
    #[error("terminal size is unavailable; is stdout attached to a terminal?")]
    SizeUnavailable,
    #[error("terminal is too small to draw on ({cols}x{rows})")]
    Empty { cols: u16, rows: u16 },
    #[error("viewport must be positive and finite, got {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
    #[error("viewport {width}x{height} at scale {scale} needs too many pixels")]
    TooLarge { width: f64, height: f64, scale: f64 },
}
