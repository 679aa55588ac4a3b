// Geometry - Canvas/window dimensions and the fit-rectangle computation
//
// The destination rectangle is a pure function of the canvas size, the window
// size and the active fit policy. It is recomputed from scratch every time one
// of those inputs changes.

use crate::error::ViewerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use winit::dpi::PhysicalSize;

/// Width and height of a canvas or a window, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Size of `width` by `height` pixels
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either axis is zero
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel count, without overflow
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width divided by height, or `None` for a zero height
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl From<PhysicalSize<u32>> for Dimensions {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Region of the window the canvas is drawn into
///
/// The origin is always (0, 0) and the rectangle is never clamped to the
/// window, so it may extend past the right or bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DestinationRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl DestinationRect {
    /// Rectangle with its top-left corner at `(x, y)`
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-area rectangle at the origin
    pub const fn degenerate() -> Self {
        Self::new(0, 0, 0, 0)
    }

    fn at_origin(size: Dimensions) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// True when the rectangle covers no pixels
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width and height of the rectangle
    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Top-left corner
    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// How the canvas is mapped onto the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitPolicy {
    /// Drawn at its native size
    NoStretch,
    /// Stretched to cover the whole window, aspect ratio not preserved
    #[serde(alias = "full")]
    Fill,
    /// Scaled along the canvas's shorter side, aspect ratio preserved
    SmallerBorder,
    /// Scaled along the canvas's longer side, aspect ratio preserved
    #[default]
    LargerBorder,
}

impl FitPolicy {
    /// Every policy, in cycling order
    pub const ALL: [FitPolicy; 4] = [
        FitPolicy::NoStretch,
        FitPolicy::Fill,
        FitPolicy::SmallerBorder,
        FitPolicy::LargerBorder,
    ];

    /// The policy following this one in [`FitPolicy::ALL`], wrapping around
    pub fn next(self) -> Self {
        match self {
            FitPolicy::NoStretch => FitPolicy::Fill,
            FitPolicy::Fill => FitPolicy::SmallerBorder,
            FitPolicy::SmallerBorder => FitPolicy::LargerBorder,
            FitPolicy::LargerBorder => FitPolicy::NoStretch,
        }
    }

    /// Kebab-case name, as accepted by `FromStr` and the config file
    pub fn name(self) -> &'static str {
        match self {
            FitPolicy::NoStretch => "no-stretch",
            FitPolicy::Fill => "fill",
            FitPolicy::SmallerBorder => "smaller-border",
            FitPolicy::LargerBorder => "larger-border",
        }
    }
}

impl fmt::Display for FitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FitPolicy {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "nostretch" => Ok(FitPolicy::NoStretch),
            "fill" | "full" => Ok(FitPolicy::Fill),
            "smallerborder" => Ok(FitPolicy::SmallerBorder),
            "largerborder" => Ok(FitPolicy::LargerBorder),
            _ => Err(ViewerError::InvalidPolicy(s.to_string())),
        }
    }
}

/// Compute where the canvas lands inside the window
///
/// # Arguments
/// * `canvas` - Native size of the canvas buffer
/// * `window` - Current drawable size of the window
/// * `policy` - Active fit policy
///
/// # Returns
/// The destination rectangle. A canvas with zero area always yields
/// [`DestinationRect::degenerate`].
pub fn fit_rect(canvas: Dimensions, window: Dimensions, policy: FitPolicy) -> DestinationRect {
    if canvas.is_empty() {
        return DestinationRect::degenerate();
    }

    match policy {
        FitPolicy::NoStretch => DestinationRect::at_origin(canvas),
        FitPolicy::Fill => DestinationRect::at_origin(window),
        FitPolicy::SmallerBorder => {
            if canvas.width < canvas.height {
                fit_to_width(canvas, window)
            } else if canvas.width > canvas.height {
                fit_to_height(canvas, window)
            } else {
                DestinationRect::at_origin(canvas)
            }
        }
        FitPolicy::LargerBorder => {
            if canvas.width > canvas.height {
                fit_to_width(canvas, window)
            } else if canvas.width < canvas.height {
                fit_to_height(canvas, window)
            } else {
                DestinationRect::at_origin(canvas)
            }
        }
    }
}

/// Fill the window's width, scale the height to keep the canvas aspect ratio
fn fit_to_width(canvas: Dimensions, window: Dimensions) -> DestinationRect {
    if canvas.width == 0 {
        return DestinationRect::degenerate();
    }
    let height = window.width as u64 * canvas.height as u64 / canvas.width as u64;
    DestinationRect::new(0, 0, window.width, saturate(height))
}

/// Fill the window's height, scale the width to keep the canvas aspect ratio
fn fit_to_height(canvas: Dimensions, window: Dimensions) -> DestinationRect {
    if canvas.height == 0 {
        return DestinationRect::degenerate();
    }
    let width = window.height as u64 * canvas.width as u64 / canvas.height as u64;
    DestinationRect::new(0, 0, saturate(width), window.height)
}

#[inline]
fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
