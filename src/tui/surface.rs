//! The terminal as a display surface: a fixed-width block at the top-left of
//! the screen, one glyph cell per terminal cell.

use log::{debug, warn};
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;

use crate::core::frame::Markup;
use crate::core::surface::DisplaySurface;
use crate::core::viewport::{GLYPH_HEIGHT_PX, GLYPH_WIDTH_PX};

/// Plain-text markup. Spaces already keep their width in a terminal; control
/// characters would move the cursor, so they become `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalMarkup;

impl Markup for TerminalMarkup {
    const LINE_BREAK: &'static str = "\n";

    fn escape_into(row: &str, out: &mut String) {
        for ch in row.chars() {
            if ch.is_control() {
                out.push('?');
            } else {
                out.push(ch);
            }
        }
    }
}

pub struct TerminalSurface<B: Backend> {
    terminal: Terminal<B>,
    columns: u16,
    rows: u16,
    content: String,
}

impl<B: Backend> TerminalSurface<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            columns: 0,
            rows: 0,
            content: String::new(),
        }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Grid size in cells.
    pub fn grid(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }

    fn draw(&mut self) {
        let (columns, rows) = (self.columns, self.rows);
        let content = self.content.as_str();
        let drawn = self.terminal.draw(|f| {
            let area = Rect::new(0, 0, columns, rows).intersection(f.area());
            f.render_widget(Paragraph::new(content), area);
        });
        if let Err(e) = drawn {
            warn!("Terminal draw failed, keeping previous frame: {e}");
        }
    }
}

impl<B: Backend> DisplaySurface for TerminalSurface<B> {
    type Markup = TerminalMarkup;

    fn set_size(&mut self, width_px: u32, height_px: u32) {
        let to_cells = |px: u32, glyph: i32| u16::try_from(px / glyph as u32).unwrap_or(u16::MAX);
        self.columns = to_cells(width_px, GLYPH_WIDTH_PX);
        self.rows = to_cells(height_px, GLYPH_HEIGHT_PX);
        if !self.content.is_empty() {
            self.draw();
        }
    }

    fn set_font(&mut self, size_px: u32, line_height_px: u32) {
        // The terminal owns its font.
        debug!("Font {size_px}px / {line_height_px}px requested, ignored by terminal");
    }

    fn set_content(&mut self, markup: String) {
        self.content = markup;
        self.draw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    use crate::core::frame::FrameRenderer;
    use crate::service::Frame;

    fn surface(width: u16, height: u16) -> TerminalSurface<TestBackend> {
        TerminalSurface::new(Terminal::new(TestBackend::new(width, height)).unwrap())
    }

    fn row_text(surface: &TerminalSurface<TestBackend>, y: u16) -> String {
        let buffer = surface.terminal().backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_terminal_markup_keeps_spaces_and_masks_controls() {
        let frame = Frame::from("a <b>\tc\nd");
        let markup = FrameRenderer::markup::<TerminalMarkup>(&frame, 10);
        assert_eq!(markup, "a <b>?c\nd");
    }

    #[test]
    fn test_set_size_converts_pixels_to_cells() {
        let mut surface = surface(20, 5);
        surface.set_size(80 * 8, 30 * 16);
        assert_eq!(surface.grid(), (80, 30));
    }

    #[test]
    fn test_content_drawn_at_top_left() {
        let mut surface = surface(10, 3);
        surface.set_size(4 * 8, 2 * 16);
        surface.set_content("ab\ncd".to_string());

        assert_eq!(row_text(&surface, 0), "ab        ");
        assert_eq!(row_text(&surface, 1), "cd        ");
        assert_eq!(row_text(&surface, 2), "          ");
    }

    #[test]
    fn test_content_clipped_to_grid_and_terminal() {
        let mut surface = surface(6, 2);
        surface.set_size(4 * 8, 5 * 16);
        surface.set_content("abcdefgh\nijkl\nmnop".to_string());

        assert_eq!(row_text(&surface, 0), "abcd  ");
        assert_eq!(row_text(&surface, 1), "ijkl  ");
    }

    #[test]
    fn test_new_content_replaces_old() {
        let mut surface = surface(5, 1);
        surface.set_size(5 * 8, 16);
        surface.set_content("#####".to_string());
        surface.set_content("..".to_string());
        assert_eq!(row_text(&surface, 0), "..   ");
    }
}
