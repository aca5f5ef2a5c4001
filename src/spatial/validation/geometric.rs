//! Geometric validation: ring validity, self-intersection, overlaps

use super::ValidationError;
use geo::{Area, BoundingRect, Intersects, LineString, MultiPolygon, Relate};

pub struct GeometricValidator;

impl GeometricValidator {
    /// Validate every ring of a multi-polygon
    pub fn validate_multipolygon(geometry: &MultiPolygon<f64>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if geometry.0.is_empty() {
            errors.push(ValidationError::EmptyGeometry);
            return errors;
        }

        for (idx, polygon) in geometry.0.iter().enumerate() {
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                errors.extend(Self::validate_ring(idx, ring));
            }
        }

        // Area only means something once the rings themselves are sound
        if errors.is_empty() && geometry.unsigned_area() == 0.0 {
            errors.push(ValidationError::ZeroArea);
        }

        errors
    }

    fn validate_ring(polygon: usize, ring: &LineString<f64>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let coords = Self::open_ring(ring);

        if coords.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            errors.push(ValidationError::NonFiniteCoordinate { polygon });
            return errors;
        }

        if coords.len() < 3 {
            errors.push(ValidationError::InsufficientVertices {
                polygon,
                count: coords.len(),
                minimum: 3,
            });
            return errors; // Can't do further checks
        }

        if let Some((i, j)) = Self::find_self_intersection(&coords) {
            errors.push(ValidationError::SelfIntersecting {
                polygon,
                description: format!("edge {} crosses edge {}", i, j),
            });
        }

        errors
    }

    /// Ring vertices without the closing repeat of the first vertex
    fn open_ring(ring: &LineString<f64>) -> Vec<(f64, f64)> {
        let mut coords: Vec<(f64, f64)> = ring.coords().map(|c| (c.x, c.y)).collect();
        if coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }
        coords
    }

    /// First pair of non-adjacent edges that properly cross
    fn find_self_intersection(coords: &[(f64, f64)]) -> Option<(usize, usize)> {
        let n = coords.len();
        if n < 4 {
            return None; // Triangle can't self-intersect
        }

        for i in 0..n {
            let a1 = coords[i];
            let a2 = coords[(i + 1) % n];

            for j in (i + 2)..n {
                // Skip adjacent edges
                if j == (i + n - 1) % n {
                    continue;
                }

                let b1 = coords[j];
                let b2 = coords[(j + 1) % n];

                if Self::segments_intersect(a1, a2, b1, b2) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Check if two line segments intersect (proper intersection, not touching)
    fn segments_intersect(a1: (f64, f64), a2: (f64, f64), b1: (f64, f64), b2: (f64, f64)) -> bool {
        let d1 = Self::cross_product_sign(b1, b2, a1);
        let d2 = Self::cross_product_sign(b1, b2, a2);
        let d3 = Self::cross_product_sign(a1, a2, b1);
        let d4 = Self::cross_product_sign(a1, a2, b2);

        ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    }

    fn cross_product_sign(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
        (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
    }

    /// True when the interiors of two geometries overlap
    ///
    /// Neighbours share borders, so plain intersection is not enough:
    /// touching along an edge is fine, sharing interior area is not.
    pub fn interiors_overlap(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
        match (a.bounding_rect(), b.bounding_rect()) {
            (Some(ra), Some(rb)) if ra.intersects(&rb) => {}
            _ => return false,
        }
        let matrix = a.relate(b);
        matrix.is_intersects() && !matrix.is_touches()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
        ]])
    }

    #[test]
    fn test_valid_square() {
        assert!(GeometricValidator::validate_multipolygon(&square(0.0, 0.0, 1.0)).is_empty());
    }

    #[test]
    fn test_bowtie_is_self_intersecting() {
        let bowtie = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 2.0),
        ]]);
        let errors = GeometricValidator::validate_multipolygon(&bowtie);
        assert!(matches!(errors[0], ValidationError::SelfIntersecting { polygon: 0, .. }));
    }

    #[test]
    fn test_empty_and_degenerate() {
        let empty: MultiPolygon<f64> = MultiPolygon(vec![]);
        assert_eq!(
            GeometricValidator::validate_multipolygon(&empty),
            vec![ValidationError::EmptyGeometry]
        );

        let sliver = MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]]);
        assert!(matches!(
            GeometricValidator::validate_multipolygon(&sliver)[0],
            ValidationError::InsufficientVertices { count: 2, .. }
        ));

        let flat = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 2.0, y: 0.0),
        ]]);
        assert_eq!(
            GeometricValidator::validate_multipolygon(&flat),
            vec![ValidationError::ZeroArea]
        );
    }

    #[test]
    fn test_shared_border_is_not_overlap() {
        let left = square(0.0, 0.0, 1.0);
        let right = square(1.0, 0.0, 1.0);
        let shifted = square(0.5, 0.5, 1.0);
        let far = square(5.0, 5.0, 1.0);

        assert!(!GeometricValidator::interiors_overlap(&left, &right));
        assert!(GeometricValidator::interiors_overlap(&left, &shifted));
        assert!(!GeometricValidator::interiors_overlap(&left, &far));
    }
}
