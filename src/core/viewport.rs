//! # Viewport Sizing
//!
//! Turns an available pixel area into the character grid the service renders
//! into. Every glyph cell is a fixed 8×16 px; the grid is clamped to
//! 80..=200 columns and 30..=80 rows no matter what the raw division gives.

use log::info;

use crate::core::surface::DisplaySurface;

pub const GLYPH_WIDTH_PX: i32 = 8;
pub const GLYPH_HEIGHT_PX: i32 = 16;

pub const MIN_COLUMNS: u16 = 80;
pub const MAX_COLUMNS: u16 = 200;
pub const MIN_ROWS: u16 = 30;
pub const MAX_ROWS: u16 = 80;

pub const DEFAULT_FONT_SIZE_PX: u32 = 12;

/// Character grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportDimensions {
    pub columns: u16,
    pub rows: u16,
}

impl ViewportDimensions {
    pub const fn new(columns: u16, rows: u16) -> Self {
        Self { columns, rows }
    }

    /// Pixel size of a surface that holds exactly this grid.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            u32::from(self.columns) * GLYPH_WIDTH_PX as u32,
            u32::from(self.rows) * GLYPH_HEIGHT_PX as u32,
        )
    }
}

impl Default for ViewportDimensions {
    fn default() -> Self {
        Self::new(120, 40)
    }
}

/// A pixel area reported by the host. May be zero or negative once margins
/// are taken off a tiny container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelArea {
    pub width: i32,
    pub height: i32,
}

impl PixelArea {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// The pixel area covered by a grid of character cells.
    pub fn from_cells(columns: u16, rows: u16) -> Self {
        Self::new(
            i32::from(columns) * GLYPH_WIDTH_PX,
            i32::from(rows) * GLYPH_HEIGHT_PX,
        )
    }
}

/// Space the host keeps around the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub horizontal_px: i32,
    pub vertical_px: i32,
}

impl Margins {
    pub const NONE: Margins = Margins {
        horizontal_px: 0,
        vertical_px: 0,
    };

    pub const fn new(horizontal_px: i32, vertical_px: i32) -> Self {
        Self {
            horizontal_px,
            vertical_px,
        }
    }
}

/// Fits a grid into `available_width_px` × `available_height_px`.
///
/// Pure and total: degenerate input clamps to the minimum grid.
pub fn compute_dimensions(available_width_px: i32, available_height_px: i32) -> ViewportDimensions {
    let columns = available_width_px.div_euclid(GLYPH_WIDTH_PX);
    let rows = available_height_px.div_euclid(GLYPH_HEIGHT_PX);
    ViewportDimensions {
        columns: columns.clamp(i32::from(MIN_COLUMNS), i32::from(MAX_COLUMNS)) as u16,
        rows: rows.clamp(i32::from(MIN_ROWS), i32::from(MAX_ROWS)) as u16,
    }
}

/// Recomputes the grid and resizes the surface to match, in one call.
#[derive(Debug, Clone, Copy)]
pub struct ViewportSizer {
    margins: Margins,
    font_size_px: u32,
}

impl ViewportSizer {
    pub fn new(margins: Margins, font_size_px: u32) -> Self {
        Self {
            margins,
            font_size_px,
        }
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Size `surface` for a host container of `container` pixels.
    pub fn resize<S: DisplaySurface>(&self, surface: &mut S, container: PixelArea) -> ViewportDimensions {
        let dims = compute_dimensions(
            container.width.saturating_sub(self.margins.horizontal_px),
            container.height.saturating_sub(self.margins.vertical_px),
        );
        let (width_px, height_px) = dims.pixel_size();
        surface.set_size(width_px, height_px);
        surface.set_font(self.font_size_px, GLYPH_HEIGHT_PX as u32);
        info!(
            "Viewport {}x{} chars for container {}x{} px",
            dims.columns, dims.rows, container.width, container.height
        );
        dims
    }
}

impl Default for ViewportSizer {
    fn default() -> Self {
        Self::new(Margins::NONE, DEFAULT_FONT_SIZE_PX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSurface;

    #[test]
    fn test_small_width_clamps_to_minimum_columns() {
        let dims = compute_dimensions(640, 640);
        assert_eq!(dims, ViewportDimensions::new(80, 40));
    }

    #[test]
    fn test_large_area_clamps_to_maximum() {
        let dims = compute_dimensions(4000, 2000);
        assert_eq!(dims, ViewportDimensions::new(200, 80));
    }

    #[test]
    fn test_unclamped_area_floors() {
        // 1000/8 = 125, 1000/16 = 62.5
        let dims = compute_dimensions(1000, 1000);
        assert_eq!(dims, ViewportDimensions::new(125, 62));
        let dims = compute_dimensions(1007, 1007);
        assert_eq!(dims, ViewportDimensions::new(125, 62));
    }

    #[test]
    fn test_degenerate_input_clamps_to_minimum() {
        assert_eq!(compute_dimensions(0, 0), ViewportDimensions::new(80, 30));
        assert_eq!(compute_dimensions(-500, -1), ViewportDimensions::new(80, 30));
        assert_eq!(
            compute_dimensions(i32::MIN, i32::MAX),
            ViewportDimensions::new(80, 80)
        );
    }

    #[test]
    fn test_output_always_within_bounds_and_monotonic() {
        let samples = [-100, 0, 7, 8, 500, 639, 640, 641, 1200, 1600, 1601, 3000, 99_999];
        let mut previous: Option<ViewportDimensions> = None;
        for &w in &samples {
            for &h in &samples {
                let dims = compute_dimensions(w, h);
                assert!((MIN_COLUMNS..=MAX_COLUMNS).contains(&dims.columns));
                assert!((MIN_ROWS..=MAX_ROWS).contains(&dims.rows));
            }
            let dims = compute_dimensions(w, w);
            if let Some(prev) = previous {
                assert!(dims.columns >= prev.columns);
                assert!(dims.rows >= prev.rows);
            }
            previous = Some(dims);
        }
    }

    #[test]
    fn test_sizer_subtracts_margins_and_sizes_surface() {
        let sizer = ViewportSizer::new(Margins::new(40, 100), 12);
        let mut surface = RecordingSurface::default();

        // (1000 - 40) / 8 = 120, (740 - 100) / 16 = 40
        let dims = sizer.resize(&mut surface, PixelArea::new(1000, 740));

        assert_eq!(dims, ViewportDimensions::new(120, 40));
        assert_eq!(surface.sizes, vec![(960, 640)]);
        assert_eq!(surface.fonts, vec![(12, 16)]);
    }

    #[test]
    fn test_sizer_sizes_surface_to_clamped_grid() {
        let sizer = ViewportSizer::default();
        let mut surface = RecordingSurface::default();

        let dims = sizer.resize(&mut surface, PixelArea::from_cells(10, 10));

        assert_eq!(dims, ViewportDimensions::new(80, 30));
        assert_eq!(surface.sizes, vec![(640, 480)]);
    }
}
