//! # Headless Host
//!
//! Runs the loop without a terminal: a fixed number of frames with every
//! control released, painted into an HTML surface and written out as a
//! standalone page.

use std::fs;
use std::sync::Arc;

use log::{error, info, warn};

use crate::core::config::ResolvedConfig;
use crate::core::frame::HtmlMarkup;
use crate::core::game_loop::{GameLoop, LoopError, LoopStats};
use crate::core::input::SharedInput;
use crate::core::surface::DisplaySurface;
use crate::core::viewport::{Margins, PixelArea, ViewportDimensions, ViewportSizer};
use crate::service::{SimulationService, build_service};

/// An in-memory HTML display element.
#[derive(Debug, Default, Clone)]
pub struct HtmlSurface {
    width_px: u32,
    height_px: u32,
    font_size_px: u32,
    line_height_px: u32,
    content: String,
}

impl HtmlSurface {
    pub fn content(&self) -> &str {
        &self.content
    }

    /// A complete HTML page showing the surface as it stands.
    pub fn document(&self) -> String {
        format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head><meta charset=\"utf-8\"><title>Mazecast</title></head>\n\
             <body style=\"margin:0;background:#000;\">\n\
             <div id=\"game\" style=\"width:{}px;height:{}px;font-family:monospace;\
             font-size:{}px;line-height:{}px;white-space:nowrap;overflow:hidden;\
             color:#ddd;background:#000;\">{}</div>\n\
             </body>\n\
             </html>\n",
            self.width_px, self.height_px, self.font_size_px, self.line_height_px, self.content
        )
    }
}

impl DisplaySurface for HtmlSurface {
    type Markup = HtmlMarkup;

    fn set_size(&mut self, width_px: u32, height_px: u32) {
        self.width_px = width_px;
        self.height_px = height_px;
    }

    fn set_font(&mut self, size_px: u32, line_height_px: u32) {
        self.font_size_px = size_px;
        self.line_height_px = line_height_px;
    }

    fn set_content(&mut self, markup: String) {
        self.content = markup;
    }
}

/// Container that yields the default grid once `margins` are taken off.
pub fn default_container(margins: Margins) -> PixelArea {
    let ViewportDimensions { columns, rows } = ViewportDimensions::default();
    let cells = PixelArea::from_cells(columns, rows);
    PixelArea::new(
        cells.width.saturating_add(margins.horizontal_px),
        cells.height.saturating_add(margins.vertical_px),
    )
}

/// Start the loop and step it `frames` times.
///
/// Step failures are logged and counted; only an init failure is returned.
pub async fn capture(
    service: Arc<dyn SimulationService>,
    config: &ResolvedConfig,
) -> Result<(HtmlSurface, LoopStats), LoopError> {
    let sizer = ViewportSizer::new(config.margins, config.font_size_px);
    let mut game = GameLoop::new(
        service,
        HtmlSurface::default(),
        Arc::new(SharedInput::new()),
        sizer,
    );
    game.start(default_container(config.margins)).await?;

    for _ in 0..config.headless_frames {
        if let Err(e) = game.step().await {
            warn!("Frame skipped: {e}");
        }
    }

    let stats = game.stats();
    Ok((game.into_surface(), stats))
}

pub async fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            error!("Cannot reach simulation service: {e}");
            eprintln!("mazecast: {e}");
            return Ok(());
        }
    };

    match capture(service, &config).await {
        Ok((surface, stats)) => {
            fs::write(&config.headless_output, surface.document())?;
            info!(
                "Wrote {} ({} of {} frames presented)",
                config.headless_output.display(),
                stats.frames_presented,
                config.headless_frames
            );
        }
        Err(e) => eprintln!("mazecast: {e}"),
    }
    Ok(())
}
