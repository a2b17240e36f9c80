//! Mapping between geographic coordinates and the discrete cell grid.

use geocoin_core::{CellCoord, GeoBounds, GeoPoint};

use crate::config::MAX_NEIGHBORHOOD_RADIUS;

/// Fixed-size square grid laid over geographic coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Board {
    tile_degrees: f64,
    neighborhood_radius: u32,
}

impl Board {
    /// Creates a board whose cells span `tile_degrees` on each axis.
    ///
    /// Callers validate `tile_degrees` beforehand; see `Config::validate`.
    #[must_use]
    pub const fn new(tile_degrees: f64, neighborhood_radius: u32) -> Self {
        Self {
            tile_degrees,
            neighborhood_radius,
        }
    }

    /// Side length of a cell measured in degrees.
    #[must_use]
    pub const fn tile_degrees(&self) -> f64 {
        self.tile_degrees
    }

    /// Default Chebyshev radius used by [`Board::cells_near`].
    #[must_use]
    pub const fn neighborhood_radius(&self) -> u32 {
        self.neighborhood_radius
    }

    /// Returns the cell containing `point`.
    ///
    /// The result always agrees with [`Board::cell_bounds`]: the returned
    /// cell's half-open bounds contain `point`, including points lying exactly
    /// on a shared edge.
    #[must_use]
    pub fn cell_for_point(&self, point: GeoPoint) -> CellCoord {
        CellCoord::new(self.index_for(point.lat), self.index_for(point.lng))
    }

    /// Returns the geographic rectangle covered by `cell`.
    #[must_use]
    pub fn cell_bounds(&self, cell: CellCoord) -> GeoBounds {
        GeoBounds::new(
            GeoPoint::new(self.edge(cell.i()), self.edge(cell.j())),
            GeoPoint::new(
                self.edge(cell.i().saturating_add(1)),
                self.edge(cell.j().saturating_add(1)),
            ),
        )
    }

    /// Cells within the board's neighbourhood radius of `point`.
    #[must_use]
    pub fn cells_near(&self, point: GeoPoint) -> Vec<CellCoord> {
        self.cells_near_with_radius(point, self.neighborhood_radius)
    }

    /// Cells whose Chebyshev distance to the cell containing `point` is at
    /// most `radius`, ordered row-major by `i` then `j`.
    ///
    /// The block is centred on the point's cell and holds `(2 * radius + 1)^2`
    /// cells. Radii above [`MAX_NEIGHBORHOOD_RADIUS`] are clamped to it.
    #[must_use]
    pub fn cells_near_with_radius(&self, point: GeoPoint, radius: u32) -> Vec<CellCoord> {
        let center = self.cell_for_point(point);
        let radius = radius.min(MAX_NEIGHBORHOOD_RADIUS);
        let side = radius as usize * 2 + 1;
        let radius = radius as i32;

        let mut cells = Vec::with_capacity(side * side);
        for di in -radius..=radius {
            for dj in -radius..=radius {
                cells.push(CellCoord::new(
                    center.i().saturating_add(di),
                    center.j().saturating_add(dj),
                ));
            }
        }
        cells
    }

    fn edge(&self, index: i32) -> f64 {
        f64::from(index) * self.tile_degrees
    }

    fn index_for(&self, degrees: f64) -> i32 {
        let mut index = (degrees / self.tile_degrees).floor() as i32;
        // Division may land a hair on the wrong side of an edge.
        if degrees < self.edge(index) {
            index = index.saturating_sub(1);
        } else if degrees >= self.edge(index.saturating_add(1)) {
            index = index.saturating_add(1);
        }
        index
    }
}
