// Window module - Hosts the presenter inside a winit window
//
// This module provides window creation, resize forwarding and frame pacing
// using the winit and pixels crates. The pixel buffer is kept 1:1 with the
// window's physical size so the presenter does all the scaling itself.

use super::geometry::Dimensions;
use super::presenter::CanvasPresenter;
use super::source::CanvasSource;
use super::surface::{blit_frame, clear_frame, RenderSurface};
use crate::config::{ViewerConfig, WindowMode};
use crate::error::{Result, ViewerError};
use image::{Rgba, RgbaImage};
use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

/// Handle to the initialized windowing subsystem
///
/// Creating one is the only way to open a window, so nothing can touch the
/// platform before initialization succeeded.
pub struct Display {
    event_loop: EventLoop<()>,
}

impl Display {
    /// Initialize the windowing subsystem
    ///
    /// Most platforms allow this once per process.
    pub fn init() -> Result<Self> {
        let event_loop = EventLoop::new()?;
        log::debug!("Windowing subsystem initialized");
        Ok(Self { event_loop })
    }

    /// Open the window and run the poll-update-render loop until it closes
    ///
    /// # Arguments
    /// * `config` - Window and presentation settings
    /// * `source` - Supplies a new canvas each frame
    pub fn run<S: CanvasSource>(self, config: ViewerConfig, source: S) -> Result<()> {
        if config.presentation.vsync {
            self.event_loop.set_control_flow(ControlFlow::Wait);
        } else {
            self.event_loop.set_control_flow(ControlFlow::Poll);
        }

        log::info!(
            "Opening '{}' at {} ({}, {} filter, {} FPS)",
            config.window.title,
            config.window.size(),
            config.presentation.fit_policy,
            config.presentation.scale_filter,
            config.presentation.target_fps
        );

        let mut app = CanvasWindow::new(config, source);
        self.event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Build winit window attributes from the configured mode flags
pub fn window_attributes(mode: &WindowMode) -> WindowAttributes {
    let fullscreen = mode.fullscreen.then_some(Fullscreen::Borderless(None));

    Window::default_attributes()
        .with_title(mode.title.clone())
        .with_inner_size(LogicalSize::new(mode.width.max(1), mode.height.max(1)))
        .with_resizable(mode.resizable)
        .with_decorations(mode.decorations)
        .with_maximized(mode.maximized)
        .with_visible(mode.visible)
        .with_fullscreen(fullscreen)
}

/// Render surface backed by a `pixels` frame buffer
pub struct PixelsSurface {
    pixels: Pixels<'static>,
    /// Size reported by the window, possibly zero while minimized
    size: Dimensions,
    /// Size of the pixel buffer actually allocated
    buffer: Dimensions,
}

impl PixelsSurface {
    /// Create a surface matching the window's physical size
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = Dimensions::from(window.inner_size());
        let buffer = Dimensions::new(size.width.max(1), size.height.max(1));

        let texture = SurfaceTexture::new(buffer.width, buffer.height, window);
        let pixels = PixelsBuilder::new(buffer.width, buffer.height, texture)
            .enable_vsync(vsync)
            .clear_color(pixels::wgpu::Color::BLACK)
            .build()?;

        Ok(Self {
            pixels,
            size,
            buffer,
        })
    }

    fn is_drawable(&self) -> bool {
        !self.size.is_empty()
    }
}

impl RenderSurface for PixelsSurface {
    fn size(&self) -> Dimensions {
        self.size
    }

    fn resize(&mut self, size: Dimensions) -> Result<()> {
        if size.is_empty() {
            // Minimized; keep the old buffer until the window comes back
            self.size = size;
            return Ok(());
        }

        self.pixels.resize_surface(size.width, size.height)?;
        if size != self.buffer {
            self.pixels.resize_buffer(size.width, size.height)?;
            self.buffer = size;
        }
        self.size = size;
        Ok(())
    }

    fn clear(&mut self, color: Rgba<u8>) {
        if self.is_drawable() {
            clear_frame(self.pixels.frame_mut(), color);
        }
    }

    fn blit(&mut self, image: &RgbaImage, x: i64, y: i64) {
        if self.is_drawable() {
            blit_frame(self.pixels.frame_mut(), self.buffer, image, x, y);
        }
    }

    fn present(&mut self) -> Result<()> {
        if self.is_drawable() {
            self.pixels.render()?;
        }
        Ok(())
    }
}

/// Application handler driving one presenter window
pub struct CanvasWindow<S> {
    window: Option<Arc<Window>>,
    surface: Option<PixelsSurface>,
    presenter: CanvasPresenter,
    source: S,
    config: ViewerConfig,
    last_frame_time: Instant,
    error: Option<ViewerError>,
}

impl<S: CanvasSource> CanvasWindow<S> {
    /// Create the handler (the window is created when the event loop starts)
    pub fn new(config: ViewerConfig, source: S) -> Self {
        let presenter = CanvasPresenter::new(config.window.size(), config.presentation.fit_policy)
            .with_filter(config.presentation.scale_filter);

        Self {
            window: None,
            surface: None,
            presenter,
            source,
            config,
            last_frame_time: Instant::now(),
            error: None,
        }
    }

    /// Presenter driving this window
    pub fn presenter(&self) -> &CanvasPresenter {
        &self.presenter
    }

    /// Mutable presenter, e.g. to change the fit policy
    pub fn presenter_mut(&mut self) -> &mut CanvasPresenter {
        &mut self.presenter
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop.create_window(window_attributes(&self.config.window))?;
        let window = Arc::new(window);

        let mut surface = PixelsSurface::new(window.clone(), self.config.presentation.vsync)?;
        // The physical size may differ from the configured logical size
        let size = Dimensions::from(window.inner_size());
        self.presenter.on_window_resized(&mut surface, size)?;

        log::info!("Window created, drawable size {}", size);
        self.window = Some(window);
        self.surface = Some(surface);
        Ok(())
    }

    /// Pull the next canvas and draw it
    fn update_and_render(&mut self) -> Result<()> {
        if let Some(canvas) = self.source.next_canvas() {
            self.presenter.set_canvas(canvas);
        }
        if let Some(surface) = &mut self.surface {
            self.presenter.render(surface)?;
        }
        Ok(())
    }

    /// Check if enough time has passed for the next frame
    fn should_render_frame(&mut self) -> bool {
        let elapsed = self.last_frame_time.elapsed();
        if elapsed >= self.config.presentation.frame_duration() {
            self.last_frame_time = Instant::now();
            true
        } else {
            false
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        log::error!("{}", err);
        self.error = Some(err);
        event_loop.exit();
    }
}

impl<S: CanvasSource> ApplicationHandler for CanvasWindow<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let size = Dimensions::from(size);
                log::debug!("Window resized to {}", size);
                if let Some(surface) = &mut self.surface {
                    if let Err(err) = self.presenter.on_window_resized(surface, size) {
                        self.fail(event_loop, err);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if self.should_render_frame() {
                    if let Err(err) = self.update_and_render() {
                        self.fail(event_loop, err);
                        return;
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
