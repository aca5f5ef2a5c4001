//! The sphere k-d tree must agree with an exhaustive scan

use proptest::prelude::*;

use food_desert::core::types::GeoPoint;
use food_desert::spatial::{BruteForceNearest, NearestIndex, SphereKdTree};

fn point() -> impl Strategy<Value = GeoPoint> {
    (49.7f64..50.0, -97.4f64..-96.9).prop_map(|(lat, lon)| GeoPoint::new(lat, lon))
}

proptest! {
    #[test]
    fn test_tree_matches_brute_force(
        facilities in prop::collection::vec(point(), 1..80),
        queries in prop::collection::vec(point(), 1..40),
    ) {
        let tree = SphereKdTree::build(facilities.clone());
        let brute = BruteForceNearest::new(facilities);

        for q in queries {
            let a = tree.nearest(q).unwrap();
            let b = brute.nearest(q).unwrap();
            prop_assert!((a.distance_m - b.distance_m).abs() < 1e-6);
        }
    }

    #[test]
    fn test_global_points(
        facilities in prop::collection::vec((-89.0f64..89.0, -179.9f64..179.9), 1..50),
        q in (-89.0f64..89.0, -179.9f64..179.9),
    ) {
        let facilities: Vec<GeoPoint> = facilities.into_iter().map(|(lat, lon)| GeoPoint::new(lat, lon)).collect();
        let q = GeoPoint::new(q.0, q.1);
        let a = SphereKdTree::build(facilities.clone()).nearest(q).unwrap();
        let b = BruteForceNearest::new(facilities).nearest(q).unwrap();
        prop_assert!((a.distance_m - b.distance_m).abs() < 1e-6);
    }
}
