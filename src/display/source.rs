// Canvas sources - Supply new canvases to the window loop
//
// The loop asks its source for a canvas once per frame. Returning `None` keeps
// whatever canvas the presenter already holds.

use super::canvas::{Canvas, SampleOrder};
use super::geometry::Dimensions;
use crate::error::Result;

/// Producer of canvases for the window loop
pub trait CanvasSource {
    /// Next canvas to show, or `None` to keep the current one
    fn next_canvas(&mut self) -> Option<Canvas>;
}

impl<F> CanvasSource for F
where
    F: FnMut() -> Option<Canvas>,
{
    fn next_canvas(&mut self) -> Option<Canvas> {
        self()
    }
}

/// A single canvas shown for the lifetime of the window
#[derive(Debug)]
pub struct StillImage {
    canvas: Option<Canvas>,
}

impl StillImage {
    /// Show `canvas` once and keep it
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas: Some(canvas),
        }
    }
}

impl CanvasSource for StillImage {
    fn next_canvas(&mut self) -> Option<Canvas> {
        self.canvas.take()
    }
}

/// Normalized RGB array that brightens every frame and wraps back to black
///
/// Samples are stored column by column (x-first), the layout numeric array
/// libraries hand over for surfaces.
#[derive(Debug, Clone)]
pub struct FadeDemo {
    size: Dimensions,
    samples: Vec<f32>,
    step: f32,
}

impl FadeDemo {
    /// Default brightness increase per frame
    pub const DEFAULT_STEP: f32 = 0.01;

    /// Fade demo stepping by [`Self::DEFAULT_STEP`]
    pub fn new(size: Dimensions) -> Self {
        Self::with_step(size, Self::DEFAULT_STEP)
    }

    /// Fade demo stepping by `step` each frame
    pub fn with_step(size: Dimensions, step: f32) -> Self {
        Self {
            size,
            samples: vec![0.0; size.width as usize * size.height as usize * 3],
            step,
        }
    }

    /// Current brightness of every sample
    pub fn level(&self) -> f32 {
        self.samples.first().copied().unwrap_or(0.0)
    }

    fn frame(&self) -> Result<Canvas> {
        Canvas::from_normalized(
            self.size.width,
            self.size.height,
            3,
            SampleOrder::ColumnMajor,
            &self.samples,
        )
    }

    fn advance(&mut self) {
        if self.level() > 1.0 {
            self.samples.fill(0.0);
        } else {
            let step = self.step;
            self.samples.iter_mut().for_each(|s| *s += step);
        }
    }
}

impl CanvasSource for FadeDemo {
    fn next_canvas(&mut self) -> Option<Canvas> {
        let canvas = match self.frame() {
            Ok(canvas) => canvas,
            Err(e) => {
                log::error!("Fade demo produced an invalid canvas: {}", e);
                return None;
            }
        };
        self.advance();
        Some(canvas)
    }
}
