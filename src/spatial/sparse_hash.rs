//! Sparse hash grid over lon/lat cells

use ahash::AHashMap;
use geo::Rect;

/// Sparse hash grid bucketing feature indices by the cells they cover
///
/// Only occupied cells are stored, so a city-sized extent costs nothing for
/// the empty parts of its bounding box.
#[derive(Debug, Clone)]
pub struct SparseHashGrid {
    cell_size: f64,
    cells: AHashMap<(i32, i32), Vec<usize>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Register a feature in every cell its bounding rectangle touches
    pub fn insert_rect(&mut self, feature: usize, rect: Rect<f64>) {
        let (x0, y0) = self.cell_coord(rect.min().x, rect.min().y);
        let (x1, y1) = self.cell_coord(rect.max().x, rect.max().y);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().push(feature);
            }
        }
    }

    /// Features registered in the cell containing the point
    pub fn query_cell(&self, x: f64, y: f64) -> &[usize] {
        self.cells
            .get(&self.cell_coord(x, y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    #[test]
    fn test_rect_spans_cells() {
        let mut grid = SparseHashGrid::new(1.0);
        grid.insert_rect(7, Rect::new(coord! { x: 0.5, y: 0.5 }, coord! { x: 2.5, y: 1.5 }));

        assert_eq!(grid.occupied_cells(), 6);
        assert_eq!(grid.query_cell(2.2, 1.2), &[7]);
        assert!(grid.query_cell(3.5, 0.5).is_empty());
    }

    #[test]
    fn test_negative_coordinates() {
        let mut grid = SparseHashGrid::new(0.01);
        grid.insert_rect(
            1,
            Rect::new(coord! { x: -97.1385, y: 49.8951 }, coord! { x: -97.1384, y: 49.8952 }),
        );

        assert_eq!(grid.occupied_cells(), 1);
        assert_eq!(grid.query_cell(-97.1381, 49.8959), &[1]);
        assert!(grid.query_cell(-97.1285, 49.8951).is_empty());
    }
}
