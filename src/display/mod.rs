// Display module - Fits a canvas into a window and presents it
//
// This module provides:
// - Canvas/window geometry and the four fit policies
// - Canvas buffers and ingestion from bytes, normalized arrays and images
// - The render surface abstraction (software and pixels-backed)
// - The presenter that owns canvas/window/policy state
// - Window creation and the poll-update-render loop using winit + pixels

pub mod canvas;
pub mod geometry;
pub mod presenter;
pub mod source;
pub mod surface;
pub mod window;

pub use canvas::{Canvas, PixelMode, SampleOrder, ScaleFilter, UnitSample};
pub use geometry::{fit_rect, DestinationRect, Dimensions, FitPolicy};
pub use presenter::{CanvasPresenter, BACKGROUND};
pub use source::{CanvasSource, FadeDemo, StillImage};
pub use surface::{MemorySurface, RenderSurface};
pub use window::{window_attributes, CanvasWindow, Display, PixelsSurface};
