// Presenter - Owns the canvas and maps it onto the window
//
// State is the current canvas (if any), the window size and the fit policy.
// Any change to one of them replaces the destination rectangle with a freshly
// computed value; nothing is patched incrementally.

use super::canvas::{Canvas, ScaleFilter};
use super::geometry::{fit_rect, DestinationRect, Dimensions, FitPolicy};
use super::surface::RenderSurface;
use crate::error::Result;
use image::{Rgba, RgbaImage};

/// Color the window is cleared to before every frame
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0xFF]);

/// Part of the destination that lands on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VisibleRegion {
    /// Canvas region `(x, y, width, height)` feeding the visible pixels
    source: (u32, u32, u32, u32),
    /// Visible size on the surface
    size: Dimensions,
    /// Top-left corner on the surface
    origin: (i64, i64),
}

/// Scaled copy of the visible canvas region
#[derive(Debug)]
struct ScaledCache {
    destination: DestinationRect,
    region: VisibleRegion,
    filter: ScaleFilter,
    image: RgbaImage,
}

/// Clip one axis of the destination to `0..limit`
///
/// Returns the canvas span `(start, len)` covering the visible pixels and the
/// visible span `(start, len)` on the surface.
fn clip_axis(
    pos: i32,
    len: u32,
    canvas_len: u32,
    limit: u32,
) -> Option<((u32, u32), (i64, u32))> {
    let pos = pos as i64;
    let start = pos.max(0);
    let end = (pos + len as i64).min(limit as i64);
    if end <= start || canvas_len == 0 {
        return None;
    }

    // Map the visible span back onto the canvas, widening to whole pixels
    let len = len as u128;
    let canvas_len = canvas_len as u128;
    let src_start = (start - pos) as u128 * canvas_len / len;
    let src_end = ((end - pos) as u128 * canvas_len).div_ceil(len).min(canvas_len);

    Some((
        (src_start as u32, (src_end - src_start) as u32),
        (start, (end - start) as u32),
    ))
}

/// Intersect the destination with the surface, or `None` when nothing shows
fn visible_region(
    dest: DestinationRect,
    canvas: Dimensions,
    surface: Dimensions,
) -> Option<VisibleRegion> {
    if dest.is_degenerate() {
        return None;
    }
    let ((sx, sw), (x, w)) = clip_axis(dest.x, dest.width, canvas.width, surface.width)?;
    let ((sy, sh), (y, h)) = clip_axis(dest.y, dest.height, canvas.height, surface.height)?;
    Some(VisibleRegion {
        source: (sx, sy, sw, sh),
        size: Dimensions::new(w, h),
        origin: (x, y),
    })
}

/// Presentation state for one window
///
/// The presenter never holds on to the drawable surface; operations that
/// touch it borrow it for the duration of the call.
#[derive(Debug)]
pub struct CanvasPresenter {
    canvas: Option<Canvas>,
    canvas_size: Dimensions,
    window_size: Dimensions,
    policy: FitPolicy,
    filter: ScaleFilter,
    destination: DestinationRect,
    scaled: Option<ScaledCache>,
}

impl CanvasPresenter {
    /// Create a presenter for a window of the given size
    pub fn new(window_size: Dimensions, policy: FitPolicy) -> Self {
        let mut presenter = Self {
            canvas: None,
            canvas_size: Dimensions::default(),
            window_size,
            policy,
            filter: ScaleFilter::default(),
            destination: DestinationRect::degenerate(),
            scaled: None,
        };
        presenter.recompute();
        presenter
    }

    /// Use `filter` when the canvas has to be resampled
    pub fn with_filter(mut self, filter: ScaleFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the canvas
    ///
    /// The destination rectangle is recomputed only when the canvas size
    /// changed. The previous buffer is dropped here.
    pub fn set_canvas(&mut self, canvas: Canvas) {
        let size = canvas.dimensions();
        self.canvas = Some(canvas);
        self.scaled = None;

        if size != self.canvas_size {
            log::debug!("Canvas resized {} -> {}", self.canvas_size, size);
            self.canvas_size = size;
            self.recompute();
        }
    }

    /// Remove and return the current canvas
    ///
    /// The canvas size is kept, so the next submission of the same size does
    /// not trigger a recomputation.
    pub fn take_canvas(&mut self) -> Option<Canvas> {
        self.scaled = None;
        self.canvas.take()
    }

    /// Change the fit policy, always recomputing the destination
    pub fn set_fit_policy(&mut self, policy: FitPolicy) {
        log::info!("Fit policy: {} -> {}", self.policy, policy);
        self.policy = policy;
        self.recompute();
    }

    /// Change the resampling filter
    pub fn set_scale_filter(&mut self, filter: ScaleFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.scaled = None;
        }
    }

    /// Handle a window resize notification
    ///
    /// The surface is resized first. If that fails, the presenter state is
    /// left exactly as it was.
    pub fn on_window_resized<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        size: Dimensions,
    ) -> Result<()> {
        surface.resize(size)?;
        self.window_size = size;
        self.recompute();
        Ok(())
    }

    /// Draw one frame
    ///
    /// Clears to [`BACKGROUND`], blits the scaled canvas at the destination
    /// origin when there is one, then presents. Only the part of the
    /// destination that lands on the surface is ever resampled.
    pub fn render<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> Result<()> {
        surface.clear(BACKGROUND);

        if let Some(canvas) = &self.canvas {
            let dest = self.destination;
            let visible = visible_region(dest, canvas.dimensions(), surface.size());
            if let Some(region) = visible {
                let (x, y) = region.origin;
                if dest.size() == canvas.dimensions() {
                    surface.blit(canvas.as_image(), dest.x as i64, dest.y as i64);
                } else {
                    let filter = self.filter;
                    let stale = self.scaled.as_ref().is_none_or(|cache| {
                        cache.destination != dest
                            || cache.region != region
                            || cache.filter != filter
                    });
                    if stale {
                        self.scaled = Some(ScaledCache {
                            destination: dest,
                            region,
                            filter,
                            image: canvas.scaled_region(region.source, region.size, filter),
                        });
                    }
                    if let Some(cache) = &self.scaled {
                        surface.blit(&cache.image, x, y);
                    }
                }
            }
        }

        surface.present()
    }

    /// Current destination rectangle
    pub fn destination(&self) -> DestinationRect {
        self.destination
    }

    /// Active fit policy
    pub fn fit_policy(&self) -> FitPolicy {
        self.policy
    }

    /// Filter used when resampling
    pub fn scale_filter(&self) -> ScaleFilter {
        self.filter
    }

    /// Window size the destination was last computed for
    pub fn window_size(&self) -> Dimensions {
        self.window_size
    }

    /// Size of the most recently submitted canvas
    pub fn canvas_size(&self) -> Dimensions {
        self.canvas_size
    }

    /// Current canvas, if one was submitted and not taken back
    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    /// Whether a canvas is present
    pub fn has_canvas(&self) -> bool {
        self.canvas.is_some()
    }

    fn recompute(&mut self) {
        let destination = fit_rect(self.canvas_size, self.window_size, self.policy);
        if destination.is_degenerate() && !self.canvas_size.is_empty() {
            log::debug!(
                "Degenerate destination for canvas {} in window {}",
                self.canvas_size,
                self.window_size
            );
        }
        self.destination = destination;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::canvas::PixelMode;
    use crate::display::surface::MemorySurface;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Canvas {
        let data: Vec<u8> = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Canvas::from_bytes(width, height, PixelMode::Rgb, &data).unwrap()
    }

    #[test]
    fn test_new_presenter_is_empty() {
        let presenter = CanvasPresenter::new(Dimensions::new(500, 500), FitPolicy::Fill);
        assert!(!presenter.has_canvas());
        assert_eq!(presenter.destination(), DestinationRect::degenerate());
        assert_eq!(presenter.scale_filter(), ScaleFilter::Nearest);
    }

    #[test]
    fn test_set_canvas_recomputes() {
        let mut presenter = CanvasPresenter::new(Dimensions::new(500, 500), FitPolicy::LargerBorder);
        presenter.set_canvas(Canvas::blank(Dimensions::new(250, 125)));
        assert_eq!(presenter.destination(), DestinationRect::new(0, 0, 500, 250));
        assert_eq!(presenter.canvas_size(), Dimensions::new(250, 125));
    }

    #[test]
    fn test_policy_change_recomputes() {
        let mut presenter = CanvasPresenter::new(Dimensions::new(500, 500), FitPolicy::LargerBorder);
        presenter.set_canvas(Canvas::blank(Dimensions::new(250, 125)));

        presenter.set_fit_policy(FitPolicy::SmallerBorder);
        assert_eq!(presenter.destination(), DestinationRect::new(0, 0, 1000, 500));

        presenter.set_fit_policy(FitPolicy::NoStretch);
        assert_eq!(presenter.destination(), DestinationRect::new(0, 0, 250, 125));
    }

    #[test]
    fn test_resize_recomputes() {
        let mut surface = MemorySurface::new(Dimensions::new(100, 100));
        let mut presenter = CanvasPresenter::new(surface.size(), FitPolicy::Fill);
        presenter.set_canvas(Canvas::blank(Dimensions::new(10, 10)));

        presenter
            .on_window_resized(&mut surface, Dimensions::new(300, 200))
            .unwrap();

        assert_eq!(surface.size(), Dimensions::new(300, 200));
        assert_eq!(presenter.window_size(), Dimensions::new(300, 200));
        assert_eq!(presenter.destination(), DestinationRect::new(0, 0, 300, 200));
    }

    #[test]
    fn test_render_scales_into_destination() {
        let mut surface = MemorySurface::new(Dimensions::new(4, 4));
        let mut presenter = CanvasPresenter::new(surface.size(), FitPolicy::LargerBorder);
        presenter.set_canvas(solid(2, 1, [200, 100, 50]));

        presenter.render(&mut surface).unwrap();

        // 2x1 canvas fit to a 4 wide window -> 4x2 at the origin
        assert_eq!(surface.pixel(3, 1), Some([200, 100, 50, 255]));
        assert_eq!(surface.pixel(0, 2), Some([0, 0, 0, 255]));
        assert_eq!(surface.presented(), 1);
    }

    #[test]
    fn test_scaled_image_is_reused() {
        let mut surface = MemorySurface::new(Dimensions::new(8, 8));
        let mut presenter = CanvasPresenter::new(surface.size(), FitPolicy::Fill);
        presenter.set_canvas(solid(2, 2, [1, 2, 3]));

        presenter.render(&mut surface).unwrap();
        assert!(presenter.scaled.is_some());
        let first = presenter.scaled.as_ref().map(|c| c.image.as_ptr());

        presenter.render(&mut surface).unwrap();
        let second = presenter.scaled.as_ref().map(|c| c.image.as_ptr());
        assert_eq!(first, second);

        presenter.set_canvas(solid(2, 2, [4, 5, 6]));
        assert!(presenter.scaled.is_none());
    }

    #[test]
    fn test_filter_change_invalidates_cache() {
        let mut surface = MemorySurface::new(Dimensions::new(8, 8));
        let mut presenter =
            CanvasPresenter::new(surface.size(), FitPolicy::Fill).with_filter(ScaleFilter::Triangle);
        presenter.set_canvas(solid(2, 2, [1, 2, 3]));
        presenter.render(&mut surface).unwrap();

        presenter.set_scale_filter(ScaleFilter::Triangle);
        assert!(presenter.scaled.is_some());

        presenter.set_scale_filter(ScaleFilter::Nearest);
        assert!(presenter.scaled.is_none());
    }

    #[test]
    fn test_tall_canvas_only_scales_visible_region() {
        let mut surface = MemorySurface::new(Dimensions::new(1000, 1000));
        let mut presenter = CanvasPresenter::new(surface.size(), FitPolicy::SmallerBorder);
        presenter.set_canvas(Canvas::blank(Dimensions::new(1, 4000)));
        assert_eq!(presenter.destination(), DestinationRect::new(0, 0, 1000, 4_000_000));

        presenter.render(&mut surface).unwrap();

        let cache = presenter.scaled.as_ref().unwrap();
        assert_eq!(cache.image.dimensions(), (1000, 1000));
        assert_eq!(cache.region.source, (0, 0, 1, 1));
        assert_eq!(surface.presented(), 1);
    }

    #[test]
    fn test_overflowing_destination_shows_leading_pixels() {
        let mut surface = MemorySurface::new(Dimensions::new(4, 4));
        let mut presenter = CanvasPresenter::new(surface.size(), FitPolicy::SmallerBorder);
        let canvas = Canvas::from_bytes(2, 1, PixelMode::Rgb, &[255, 0, 0, 0, 0, 255]).unwrap();
        presenter.set_canvas(canvas);
        assert_eq!(presenter.destination(), DestinationRect::new(0, 0, 8, 4));

        presenter.render(&mut surface).unwrap();

        // Only the left (red) half of the 8x4 rectangle lands on the surface
        assert!(surface.frame().pixels().all(|p| p.0 == [255, 0, 0, 255]));
    }

    #[test]
    fn test_clip_axis() {
        // Fully visible
        assert_eq!(clip_axis(0, 10, 5, 20), Some(((0, 5), (0, 10))));
        // Overflowing the limit keeps the leading canvas span
        assert_eq!(clip_axis(0, 8, 2, 4), Some(((0, 1), (0, 4))));
        // Partial canvas pixels are widened to whole ones
        assert_eq!(clip_axis(0, 9, 3, 4), Some(((0, 2), (0, 4))));
        // Nothing on the surface
        assert_eq!(clip_axis(0, 8, 2, 0), None);
        assert_eq!(clip_axis(-10, 5, 2, 4), None);
    }

    #[test]
    fn test_take_canvas_keeps_size() {
        let mut presenter = CanvasPresenter::new(Dimensions::new(50, 50), FitPolicy::NoStretch);
        presenter.set_canvas(Canvas::blank(Dimensions::new(5, 6)));

        let canvas = presenter.take_canvas().unwrap();
        assert_eq!(canvas.dimensions(), Dimensions::new(5, 6));
        assert!(!presenter.has_canvas());
        assert_eq!(presenter.canvas_size(), Dimensions::new(5, 6));
        assert_eq!(presenter.destination(), DestinationRect::new(0, 0, 5, 6));
    }
}
