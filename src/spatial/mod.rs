//! Spatial indexing for containment and nearest-neighbour lookups
//!
//! The joiner and the proximity engine only see the two traits below, so
//! the concrete index behind either can change without touching them.

pub mod containment;
pub mod geodesy;
pub mod nearest;
pub mod sparse_hash;
pub mod validation;

pub use containment::PolygonCellIndex;
pub use nearest::{BruteForceNearest, SphereKdTree};

use crate::core::types::GeoPoint;

/// Given a point, which features contain it
pub trait ContainmentIndex {
    /// Indices of every feature whose interior contains `point`, ascending
    fn containing(&self, point: GeoPoint) -> Vec<usize>;
}

/// Result of a nearest-feature lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub index: usize,
    /// Great-circle distance in metres
    pub distance_m: f64,
}

/// Given a point, which feature is nearest
pub trait NearestIndex {
    /// `None` only when the index holds no features. Ties go to the
    /// lowest feature index.
    fn nearest(&self, point: GeoPoint) -> Option<Nearest>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
