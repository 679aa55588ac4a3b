// Error types shared by the canvas viewer
//
// Ingestion adapters reject malformed buffers here. The presenter itself only
// ever surfaces errors coming from the render surface.

use thiserror::Error;

/// Errors produced by the canvas viewer
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Pixel buffer length does not match width × height × channels
    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// Buffer size computation does not fit in memory
    #[error("a {width}x{height} buffer exceeds addressable memory")]
    BufferTooLarge { width: u32, height: u32 },

    /// Row stride is shorter than one row of pixels
    #[error("row stride {stride} is smaller than the row length {row_len}")]
    InvalidStride { stride: usize, row_len: usize },

    /// Normalized arrays must carry 1, 3 or 4 channels
    #[error("unsupported channel count {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(usize),

    /// Unknown pixel mode name
    #[error("unsupported pixel mode '{0}'")]
    UnsupportedPixelMode(String),

    /// Unknown fit policy name
    #[error("invalid fit policy '{0}' (expected no-stretch, fill, smaller-border or larger-border)")]
    InvalidPolicy(String),

    /// Unknown scale filter name
    #[error("invalid scale filter '{0}' (expected nearest, triangle, catmull-rom or lanczos3)")]
    InvalidFilter(String),

    /// Image decoding failed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The drawable surface could not be created, resized or presented
    #[error("surface error: {0}")]
    Surface(String),

    /// The windowing event loop failed
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The operating system refused to create the window
    #[error("window creation failed: {0}")]
    Os(#[from] winit::error::OsError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("configuration serialization failed: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

impl From<pixels::Error> for ViewerError {
    fn from(e: pixels::Error) -> Self {
        ViewerError::Surface(e.to_string())
    }
}

impl From<pixels::TextureError> for ViewerError {
    fn from(e: pixels::TextureError) -> Self {
        ViewerError::Surface(e.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ViewerError>;
