//! Overlay geometry.
//!
//! All frames use Cocoa coordinates (origin at the bottom left). The panel
//! frame is in screen space; the sections are relative to the panel, icons
//! relative to the grid, and the preview relative to its strip.

use crate::common::config::SwitcherSettings;
use crate::sys::geometry::{Rect, Size};

const MIN_PANEL_WIDTH: f64 = 900.0;
const MIN_PANEL_HEIGHT: f64 = 350.0;
const HORIZONTAL_PADDING: f64 = 80.0;
/// Room below the grid for the title, preview strip and page indicator.
const CHROME_HEIGHT: f64 = 200.0;
const INSET: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    pub frame: Rect,
    pub grid: Rect,
    pub title: Rect,
    pub preview: Rect,
    pub indicator: Rect,
    /// One frame per visible window, in display order.
    pub icons: Vec<Rect>,
}

impl OverlayLayout {
    pub fn compute(settings: &SwitcherSettings, visible_count: usize, screen: Rect) -> Self {
        let columns = settings.columns.max(1);
        let icon = settings.icon_size;
        let step = settings.icon_size + settings.icon_spacing;

        let grid_width = columns as f64 * icon + (columns - 1) as f64 * settings.icon_spacing;
        let rows_shown = settings.rows.min(visible_count.div_ceil(columns));
        let grid_height = rows_shown as f64 * step;

        let width = MIN_PANEL_WIDTH.max(grid_width + HORIZONTAL_PADDING);
        let height = MIN_PANEL_HEIGHT.max(grid_height + CHROME_HEIGHT);
        let inner_width = width - 2.0 * INSET;

        let grid = Rect::new(INSET, height - grid_height - 60.0, inner_width, grid_height);
        let start_x = (grid.size.width - grid_width) / 2.0;
        let icons = (0..visible_count.min(columns.saturating_mul(settings.rows)))
            .map(|i| {
                let (row, col) = (i / columns, i % columns);
                Rect::new(
                    start_x + col as f64 * step,
                    grid_height - icon - row as f64 * step,
                    icon,
                    icon,
                )
            })
            .collect();

        OverlayLayout {
            frame: screen.centered(Size::new(width, height)),
            grid,
            title: Rect::new(INSET, height - grid_height - 100.0, inner_width, 25.0),
            preview: Rect::new(INSET, 50.0, inner_width, 50.0),
            indicator: Rect::new(INSET, INSET, inner_width, 20.0),
            icons,
        }
    }

    /// Where the selected window's thumbnail goes inside the preview strip.
    pub fn preview_frame(&self, settings: &SwitcherSettings) -> Rect {
        let strip = Rect::from_parts(Default::default(), self.preview.size);
        strip.centered(Size::new(settings.preview.width, settings.preview.height))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn screen() -> Rect { Rect::new(0.0, 0.0, 1440.0, 900.0) }

    #[test]
    fn two_rows_of_icons() {
        let settings = SwitcherSettings::default();
        let layout = OverlayLayout::compute(&settings, 10, screen());

        assert_eq!(layout.frame, Rect::new(270.0, 265.0, 900.0, 370.0));
        assert_eq!(layout.grid, Rect::new(20.0, 140.0, 860.0, 170.0));
        assert_eq!(layout.title, Rect::new(20.0, 100.0, 860.0, 25.0));
        assert_eq!(layout.preview, Rect::new(20.0, 50.0, 860.0, 50.0));
        assert_eq!(layout.indicator, Rect::new(20.0, 20.0, 860.0, 20.0));
        assert_eq!(layout.icons.len(), 10);
        assert_eq!(layout.icons[0], Rect::new(97.5, 100.0, 70.0, 70.0));
        assert_eq!(layout.icons[7], Rect::new(692.5, 100.0, 70.0, 70.0));
        assert_eq!(layout.icons[9], Rect::new(182.5, 15.0, 70.0, 70.0));
    }

    #[test]
    fn small_lists_keep_the_minimum_height() {
        let layout = OverlayLayout::compute(&SwitcherSettings::default(), 1, screen());
        assert_eq!(layout.frame.size, Size::new(900.0, 350.0));
        assert_eq!(layout.grid, Rect::new(20.0, 205.0, 860.0, 85.0));
        assert_eq!(layout.icons[0].origin.y, 15.0);
    }

    #[test]
    fn full_page_uses_every_row() {
        let layout = OverlayLayout::compute(&SwitcherSettings::default(), 32, screen());
        assert_eq!(layout.frame.size, Size::new(900.0, 540.0));
        assert_eq!(layout.icons.len(), 32);
        assert_eq!(layout.icons[31], Rect::new(692.5, 15.0, 70.0, 70.0));
    }

    #[test]
    fn wide_grids_grow_the_panel() {
        let settings = SwitcherSettings {
            columns: 12,
            ..SwitcherSettings::default()
        };
        let layout = OverlayLayout::compute(&settings, 12, screen());
        // 12 * 70 + 11 * 15 + 80
        assert_eq!(layout.frame.size.width, 1085.0);
        assert_eq!(layout.icons[0].origin.x, 20.0);
    }

    #[test]
    fn tall_grids_only_lay_out_visible_windows() {
        let settings = SwitcherSettings {
            columns: 64,
            rows: usize::MAX,
            ..SwitcherSettings::default()
        };
        let layout = OverlayLayout::compute(&settings, 3, screen());
        assert_eq!(layout.icons.len(), 3);
        assert_eq!(layout.grid.size.height, 85.0);
    }

    #[test]
    fn preview_is_centered_in_its_strip() {
        let settings = SwitcherSettings::default();
        let layout = OverlayLayout::compute(&settings, 3, screen());
        assert_eq!(layout.preview_frame(&settings), Rect::new(330.0, 5.0, 200.0, 40.0));
    }
}
