// Render surface - The drawable the presenter paints into
//
// The presenter only ever talks to this trait. The window backend implements
// it on top of `pixels`; `MemorySurface` keeps everything in RAM for tests and
// benchmarks.

use super::geometry::Dimensions;
use crate::error::Result;
use image::imageops;
use image::{ImageBuffer, Rgba, RgbaImage};

/// Drawable surface owned by the windowing collaborator
pub trait RenderSurface {
    /// Current drawable size in pixels
    fn size(&self) -> Dimensions;

    /// Re-acquire the drawable at a new size
    fn resize(&mut self, size: Dimensions) -> Result<()>;

    /// Fill the whole surface with one color
    fn clear(&mut self, color: Rgba<u8>);

    /// Copy `image` with its top-left corner at (`x`, `y`), clipped to the surface
    fn blit(&mut self, image: &RgbaImage, x: i64, y: i64);

    /// Show the current contents on screen
    fn present(&mut self) -> Result<()>;
}

/// Clear an RGBA8 byte frame
pub(crate) fn clear_frame(frame: &mut [u8], color: Rgba<u8>) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color.0);
    }
}

/// Blit into an RGBA8 byte frame of the given size
///
/// Frames whose length does not match `size` are left untouched.
pub(crate) fn blit_frame(frame: &mut [u8], size: Dimensions, image: &RgbaImage, x: i64, y: i64) {
    if let Some(mut target) =
        ImageBuffer::<Rgba<u8>, &mut [u8]>::from_raw(size.width, size.height, frame)
    {
        imageops::replace(&mut target, image, x, y);
    }
}

/// Software surface backed by an in-memory RGBA image
#[derive(Debug, Clone)]
pub struct MemorySurface {
    frame: RgbaImage,
    presented: u64,
    blits: u64,
}

impl MemorySurface {
    /// Transparent surface of the given size
    pub fn new(size: Dimensions) -> Self {
        Self {
            frame: RgbaImage::new(size.width, size.height),
            presented: 0,
            blits: 0,
        }
    }

    /// Current frame contents
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// Color of one pixel, or `None` outside the surface
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.frame.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Number of frames presented so far
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Number of blits performed so far
    pub fn blits(&self) -> u64 {
        self.blits
    }
}

impl RenderSurface for MemorySurface {
    fn size(&self) -> Dimensions {
        Dimensions::new(self.frame.width(), self.frame.height())
    }

    fn resize(&mut self, size: Dimensions) -> Result<()> {
        if size != self.size() {
            self.frame = RgbaImage::new(size.width, size.height);
        }
        Ok(())
    }

    fn clear(&mut self, color: Rgba<u8>) {
        clear_frame(&mut self.frame, color);
    }

    fn blit(&mut self, image: &RgbaImage, x: i64, y: i64) {
        self.blits += 1;
        imageops::replace(&mut self.frame, image, x, y);
    }

    fn present(&mut self) -> Result<()> {
        self.presented += 1;
        Ok(())
    }
}
