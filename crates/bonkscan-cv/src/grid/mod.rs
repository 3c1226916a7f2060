//! Inventory grid layout estimation
//!
//! The hotbar/inventory sits along the bottom edge of the screen. Cell size is
//! chosen from the resolution rather than measured, so this stage is pure
//! arithmetic and never touches pixels.

use crate::region::Region;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One row of the resolution-to-cell-size table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSizeBucket {
    /// Largest screen dimension this bucket applies to (inclusive).
    pub max_dimension: f64,
    pub cell_size: f64,
}

/// Grid layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Checked in order; the last bucket also covers anything larger.
    pub buckets: Vec<CellSizeBucket>,
    /// A hint may move the cell size at most this fraction away from the bucket size.
    pub hint_tolerance: f64,
    /// Upper bound on cell size as a fraction of screen height.
    pub max_cell_height_ratio: f64,
    pub min_cell_size: f64,
    pub edge_margin: f64,
    pub bottom_margin: f64,
    pub cell_spacing: f64,
    pub max_cells: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            buckets: vec![
                CellSizeBucket { max_dimension: 1280.0, cell_size: 40.0 },
                CellSizeBucket { max_dimension: 1920.0, cell_size: 48.0 },
                CellSizeBucket { max_dimension: 2560.0, cell_size: 56.0 },
                CellSizeBucket { max_dimension: f64::MAX, cell_size: 70.0 },
            ],
            hint_tolerance: 0.25,
            max_cell_height_ratio: 0.18,
            min_cell_size: 8.0,
            edge_margin: 50.0,
            bottom_margin: 20.0,
            cell_spacing: 8.0,
            max_cells: 30,
        }
    }
}

/// Estimates where inventory cells sit for a given resolution.
#[derive(Debug, Clone, Default)]
pub struct GridLayout {
    config: GridConfig,
}

impl GridLayout {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Cell size for a screen whose larger side is `max_dimension`.
    pub fn adaptive_cell_size(&self, max_dimension: f64) -> f64 {
        self.config
            .buckets
            .iter()
            .find(|b| max_dimension <= b.max_dimension)
            .or(self.config.buckets.last())
            .map(|b| b.cell_size)
            .unwrap_or(48.0)
    }

    /// Final cell edge length in whole pixels, or `None` when no usable cell fits.
    pub fn cell_size(&self, width: f64, height: f64, hint: Option<f64>) -> Option<i32> {
        if !valid_dimension(width) || !valid_dimension(height) {
            return None;
        }

        let base = self.adaptive_cell_size(width.max(height));
        let mut size = match hint {
            Some(h) if valid_dimension(h) => {
                let tol = self.config.hint_tolerance.max(0.0);
                h.clamp(base * (1.0 - tol), base * (1.0 + tol))
            }
            _ => base,
        };
        size = size.min(height * self.config.max_cell_height_ratio).floor();

        if size < self.config.min_cell_size.max(1.0) {
            return None;
        }
        Some(size as i32)
    }

    /// Lay out the bottom row of cells, left to right.
    ///
    /// Non-finite or non-positive dimensions yield no cells; the result never
    /// exceeds `max_cells` entries.
    pub fn detect(&self, width: f64, height: f64, cell_size_hint: Option<f64>) -> Vec<Region> {
        let Some(size) = self.cell_size(width, height, cell_size_hint) else {
            return Vec::new();
        };

        let cfg = &self.config;
        let margin = cfg.edge_margin.max(0.0).floor();
        let spacing = cfg.cell_spacing.max(0.0).floor();
        let step = size as f64 + spacing;

        let y = (height - size as f64 - cfg.bottom_margin.max(0.0)).floor();
        if y < 0.0 {
            return Vec::new();
        }

        let usable = width - 2.0 * margin;
        if usable < size as f64 {
            return Vec::new();
        }

        let columns = ((usable + spacing) / step).floor() as usize;
        let count = columns.min(cfg.max_cells);

        let cells: Vec<Region> = (0..count)
            .map(|i| {
                let x = margin + i as f64 * step;
                Region::new(x as i32, y as i32, size, size).with_label(format!("cell_{i}"))
            })
            .collect();

        debug!(width, height, cell = size, cells = cells.len(), "estimated grid");
        cells
    }
}

fn valid_dimension(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Detect inventory cell positions with the default layout.
pub fn detect_grid_positions(width: f64, height: f64, cell_size_hint: Option<f64>) -> Vec<Region> {
    GridLayout::default().detect(width, height, cell_size_hint)
}
