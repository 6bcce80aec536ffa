//! # Frame Rendering
//!
//! A frame comes back from the service as plain rows of text. Before it can be
//! shown, each row is escaped for the surface's display medium and the rows are
//! joined with that medium's line break. Rows past the viewport height are
//! dropped; a short frame is shown as-is, without padding.

use crate::core::surface::DisplaySurface;
use crate::service::Frame;

/// Escaping rules for one display medium.
pub trait Markup {
    /// Separator placed between rows.
    const LINE_BREAK: &'static str;

    /// Append `row` to `out`, escaping reserved characters and making spaces
    /// non-collapsing.
    fn escape_into(row: &str, out: &mut String);
}

/// HTML-style markup: `&`, `<` and `>` become entities and spaces become
/// `&nbsp;` so fixed-width columns line up.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMarkup;

impl Markup for HtmlMarkup {
    const LINE_BREAK: &'static str = "<br>";

    fn escape_into(row: &str, out: &mut String) {
        for ch in row.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                ' ' => out.push_str("&nbsp;"),
                other => out.push(other),
            }
        }
    }
}

/// Converts frames into surface markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameRenderer;

impl FrameRenderer {
    /// Build the markup for at most `max_rows` rows of `frame`.
    pub fn markup<M: Markup>(frame: &Frame, max_rows: usize) -> String {
        let mut out = String::with_capacity(frame.as_str().len() * 2);
        for (i, row) in frame.rows().take(max_rows).enumerate() {
            if i > 0 {
                out.push_str(M::LINE_BREAK);
            }
            M::escape_into(row, &mut out);
        }
        out
    }

    /// Replace the surface content with `frame`, truncated to `max_rows`.
    pub fn display<S: DisplaySurface>(surface: &mut S, frame: &Frame, max_rows: usize) {
        surface.set_content(Self::markup::<S::Markup>(frame, max_rows));
    }
}
