// cli.rs - Command-line interface configuration
use canvas_view::{Dimensions, FitPolicy, ScaleFilter, ViewerConfig, CONFIG_FILE};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "canvas-view")]
#[command(about = "Show an image in a resizable window", long_about = None)]
pub struct Cli {
    /// Image to display (a fading demo canvas is shown when omitted)
    pub image: Option<PathBuf>,

    /// Fit policy: no-stretch, fill, smaller-border or larger-border
    #[arg(short, long, value_parser = parse_policy)]
    pub policy: Option<FitPolicy>,

    /// Scale filter: nearest, triangle, catmull-rom or lanczos3
    #[arg(short, long, value_parser = parse_filter)]
    pub filter: Option<ScaleFilter>,

    /// Initial window width
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height
    #[arg(long)]
    pub height: Option<u32>,

    /// Target frames per second
    #[arg(long)]
    pub fps: Option<u32>,

    /// Configuration file
    #[arg(short, long, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Size of the demo canvas as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_dimensions, default_value = "125x250")]
    pub demo_size: Dimensions,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut ViewerConfig) {
        if let Some(policy) = self.policy {
            config.presentation.fit_policy = policy;
        }
        if let Some(filter) = self.filter {
            config.presentation.scale_filter = filter;
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        if let Some(fps) = self.fps {
            config.presentation.target_fps = fps;
        }
    }
}

fn parse_policy(s: &str) -> Result<FitPolicy, String> {
    s.parse().map_err(|e: canvas_view::ViewerError| e.to_string())
}

fn parse_filter(s: &str) -> Result<ScaleFilter, String> {
    s.parse().map_err(|e: canvas_view::ViewerError| e.to_string())
}

fn parse_dimensions(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let height = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    Ok(Dimensions::new(width, height))
}
