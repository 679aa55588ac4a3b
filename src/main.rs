// Canvas viewer - Main entry point
//
// Shows an image file, or a fading demo canvas when no image is given.

mod cli;

use canvas_view::{Canvas, Display, FadeDemo, StillImage, ViewerConfig};
use clap::Parser;
use cli::Cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = ViewerConfig::load_or_default(&cli.config);
    cli.apply(&mut config);
    log::info!("Configuration loaded from '{}'", cli.config.display());

    // The windowing subsystem must exist before any canvas is shown
    let display = Display::init()?;

    match &cli.image {
        Some(path) => {
            let canvas = Canvas::open(path)?;
            log::info!("Loaded {} ({})", path.display(), canvas.dimensions());
            display.run(config, StillImage::new(canvas))?;
        }
        None => {
            log::info!("No image given, running fade demo at {}", cli.demo_size);
            display.run(config, FadeDemo::new(cli.demo_size))?;
        }
    }

    log::info!("Window closed");
    Ok(())
}
