//! The host display surface: one addressable text region the loop paints into.

use crate::core::frame::Markup;

/// A single text region owned by the host.
///
/// Implementations never fail from the loop's point of view; a host that can
/// hit I/O errors logs them and keeps the previous content.
pub trait DisplaySurface {
    /// The escaping rules of this surface's display medium.
    type Markup: Markup;

    fn set_size(&mut self, width_px: u32, height_px: u32);

    fn set_font(&mut self, size_px: u32, line_height_px: u32);

    /// Replace the whole content at once.
    fn set_content(&mut self, markup: String);
}
