// Canvas viewer library
// Shows a pixel buffer in a resizable window using a choice of fit policies

// Public modules
pub mod config;
pub mod display;
pub mod error;

// Re-export main types for convenience
pub use config::{PresentationConfig, ViewerConfig, WindowMode, CONFIG_FILE};
pub use display::{
    fit_rect, Canvas, CanvasPresenter, CanvasSource, DestinationRect, Dimensions, Display,
    FadeDemo, FitPolicy, MemorySurface, PixelMode, RenderSurface, SampleOrder, ScaleFilter,
    StillImage,
};
pub use error::{Result, ViewerError};
