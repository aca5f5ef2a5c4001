//! Point-in-polygon lookup through a sparse cell grid

use geo::{BoundingRect, Contains, MultiPolygon};

use super::sparse_hash::SparseHashGrid;
use super::ContainmentIndex;
use crate::core::types::GeoPoint;

/// Cell size used when the polygons give no usable extent (degrees)
const FALLBACK_CELL_DEG: f64 = 0.01;

/// Polygons bucketed by bounding box, with an exact containment test on the
/// few candidates sharing the query point's cell
#[derive(Debug, Clone)]
pub struct PolygonCellIndex {
    polygons: Vec<MultiPolygon<f64>>,
    grid: SparseHashGrid,
}

impl PolygonCellIndex {
    /// Cell size defaults to the mean bounding-box extent, so a typical
    /// polygon covers a handful of cells
    pub fn build(polygons: Vec<MultiPolygon<f64>>) -> Self {
        let extents: Vec<f64> = polygons
            .iter()
            .filter_map(|p| p.bounding_rect())
            .map(|r| r.width().max(r.height()))
            .filter(|e| e.is_finite() && *e > 0.0)
            .collect();
        let cell_size = if extents.is_empty() {
            FALLBACK_CELL_DEG
        } else {
            extents.iter().sum::<f64>() / extents.len() as f64
        };
        Self::with_cell_size(polygons, cell_size)
    }

    pub fn with_cell_size(polygons: Vec<MultiPolygon<f64>>, cell_size: f64) -> Self {
        let mut grid = SparseHashGrid::new(cell_size);
        for (idx, polygon) in polygons.iter().enumerate() {
            if let Some(rect) = polygon.bounding_rect() {
                grid.insert_rect(idx, rect);
            }
        }
        tracing::debug!(
            "Indexed {} polygons into {} cells of {:.5} deg",
            polygons.len(),
            grid.occupied_cells(),
            cell_size
        );
        Self { polygons, grid }
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

impl ContainmentIndex for PolygonCellIndex {
    fn containing(&self, point: GeoPoint) -> Vec<usize> {
        let p = point.to_point();
        let mut hits: Vec<usize> = self
            .grid
            .query_cell(p.x(), p.y())
            .iter()
            .copied()
            .filter(|&idx| self.polygons[idx].contains(&p))
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }
}
