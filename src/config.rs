// Configuration management
//
// Window and presentation settings, persisted as TOML.

use crate::display::{Dimensions, FitPolicy, ScaleFilter};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default configuration file path
pub const CONFIG_FILE: &str = "canvas_view.toml";

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Window creation settings
    pub window: WindowMode,

    /// How the canvas is presented
    pub presentation: PresentationConfig,
}

/// Window title, size and mode flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowMode {
    pub title: String,

    /// Initial inner width in logical pixels
    pub width: u32,

    /// Initial inner height in logical pixels
    pub height: u32,

    pub resizable: bool,

    /// Borderless fullscreen on the current monitor
    pub fullscreen: bool,

    /// Show title bar and borders
    pub decorations: bool,

    pub maximized: bool,

    pub visible: bool,
}

/// Presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub fit_policy: FitPolicy,

    pub scale_filter: ScaleFilter,

    /// Frames per second the window loop aims for
    pub target_fps: u32,

    /// Wait for vertical sync when presenting
    pub vsync: bool,
}

impl Default for WindowMode {
    fn default() -> Self {
        WindowMode {
            title: "canvas-view".to_string(),
            width: 500,
            height: 500,
            resizable: true,
            fullscreen: false,
            decorations: true,
            maximized: false,
            visible: true,
        }
    }
}

impl WindowMode {
    /// Initial inner size of the window
    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        PresentationConfig {
            fit_policy: FitPolicy::LargerBorder,
            scale_filter: ScaleFilter::Nearest,
            target_fps: 60,
            vsync: true,
        }
    }
}

impl PresentationConfig {
    /// Time budget of one frame at the target FPS
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.target_fps.max(1) as u64)
    }
}

impl ViewerConfig {
    /// Load configuration from `path`, writing the defaults when it is missing
    ///
    /// A file that exists but fails to parse is reported and replaced by the
    /// defaults in memory only.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            if let Err(e) = config.save(path) {
                log::warn!("Could not write default config to {}: {}", path.display(), e);
            }
            return config;
        }

        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Ignoring {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Load configuration from `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
