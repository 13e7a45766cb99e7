//! Grid <-> pixel mapping for the battlefield canvas.
//!
//! Anchor convention: a grid coordinate maps to the CENTER of its cell, so
//! `(0, 0)` lands at `(cell/2, cell/2)`. Units with fractional positions are
//! drawn centered on that point.
use std::fmt;

use crate::config::ViewerConfig;

/// An integer map cell, the unit of every pointer command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        GridCell { x, y }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Responsive layout: cell size and the scale ratio driving panel placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub cell_size: f64,
    /// Scale ratio in `[0, 1]`; 1 means the map fits at `max_cell`.
    pub scaler: f64,
    pub map_cols: usize,
    pub map_rows: usize,
    pub max_cell: f64,
}

/// Scale ratio from the more constraining of the width and height fits.
pub fn compute_scaler(
    viewport_w: f64,
    viewport_h: f64,
    cols: usize,
    rows: usize,
    cfg: &ViewerConfig,
) -> f64 {
    let span = cfg.max_cell - cfg.min_cell;
    if cols == 0 || rows == 0 || span <= 0.0 {
        return 1.0;
    }
    let fit_w = ((viewport_w - cfg.panel_width) / cols as f64 - cfg.min_cell) / span;
    let fit_h = (viewport_h / rows as f64 - cfg.min_cell) / span;
    fit_w.min(fit_h).clamp(0.0, 1.0)
}

/// `x/2 + floor((x - x/2) * scaler)`: half of every offset is fixed, the rest scales.
pub fn scale_with(x: f64, scaler: f64) -> f64 {
    let half = x / 2.0;
    half + ((x - half) * scaler).floor()
}

impl Layout {
    /// Fit a `cols` x `rows` map plus the side panel into the viewport.
    pub fn fit(viewport_w: f64, viewport_h: f64, cols: usize, rows: usize, cfg: &ViewerConfig) -> Self {
        let scaler = compute_scaler(viewport_w, viewport_h, cols, rows, cfg);
        Layout {
            cell_size: cfg.min_cell + scaler * (cfg.max_cell - cfg.min_cell),
            scaler,
            map_cols: cols,
            map_rows: rows,
            max_cell: cfg.max_cell,
        }
    }

    /// Fixed-size layout, mostly for tests.
    pub fn with_cell_size(cell_size: f64, cols: usize, rows: usize) -> Self {
        Layout { cell_size, scaler: 1.0, map_cols: cols, map_rows: rows, max_cell: cell_size }
    }

    pub fn grid_to_pixel(&self, gx: f64, gy: f64) -> (f64, f64) {
        let half = self.cell_size / 2.0;
        (gx * self.cell_size + half, gy * self.cell_size + half)
    }

    pub fn pixel_to_grid(&self, px: f64, py: f64) -> (f64, f64) {
        (px / self.cell_size - 0.5, py / self.cell_size - 0.5)
    }

    /// Cell containing a pixel; may lie outside the map.
    pub fn pixel_to_cell(&self, px: f64, py: f64) -> GridCell {
        GridCell::new(
            (px / self.cell_size).floor() as i32,
            (py / self.cell_size).floor() as i32,
        )
    }

    pub fn scale(&self, x: f64) -> f64 {
        scale_with(x, self.scaler)
    }

    /// Sprite zoom relative to art authored for `max_cell`.
    pub fn zoom(&self) -> f64 {
        if self.max_cell <= 0.0 {
            return 1.0;
        }
        self.cell_size / self.max_cell
    }

    pub fn map_width_px(&self) -> f64 {
        self.map_cols as f64 * self.cell_size
    }

    pub fn map_height_px(&self) -> f64 {
        self.map_rows as f64 * self.cell_size
    }

    /// Left edge of the side panel text column.
    pub fn panel_left(&self) -> f64 {
        self.map_width_px() + self.scale(10.0)
    }

    pub fn is_over_map(&self, px: f64, py: f64) -> bool {
        px >= 0.0 && py >= 0.0 && px < self.map_width_px() && py < self.map_height_px()
    }
}
