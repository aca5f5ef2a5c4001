//! Nearest-feature search by great-circle distance

use std::cmp::Ordering;

use super::geodesy::{haversine_m, unit_vector};
use super::{Nearest, NearestIndex};
use crate::core::types::GeoPoint;

#[derive(Debug, Clone)]
struct KdNode {
    point: [f64; 3],
    index: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// k-d tree over unit-sphere vectors
///
/// Searching by chord length on the sphere gives exactly the great-circle
/// nearest feature, with no projection distortion at any latitude.
#[derive(Debug, Clone)]
pub struct SphereKdTree {
    points: Vec<GeoPoint>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

impl SphereKdTree {
    pub fn build(points: Vec<GeoPoint>) -> Self {
        let mut items: Vec<(usize, [f64; 3])> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, unit_vector(*p)))
            .collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = Self::build_node(&mut items, &mut nodes);
        Self { points, nodes, root }
    }

    fn build_node(items: &mut [(usize, [f64; 3])], nodes: &mut Vec<KdNode>) -> Option<usize> {
        if items.is_empty() {
            return None;
        }

        let axis = Self::widest_axis(items);
        items.sort_by(|a, b| a.1[axis].total_cmp(&b.1[axis]).then(a.0.cmp(&b.0)));
        let mid = items.len() / 2;
        let (index, point) = items[mid];

        let slot = nodes.len();
        nodes.push(KdNode {
            point,
            index,
            axis,
            left: None,
            right: None,
        });

        let (left_items, rest) = items.split_at_mut(mid);
        let left = Self::build_node(left_items, nodes);
        let right = Self::build_node(&mut rest[1..], nodes);
        nodes[slot].left = left;
        nodes[slot].right = right;
        Some(slot)
    }

    fn widest_axis(items: &[(usize, [f64; 3])]) -> usize {
        let mut best = (0, f64::NEG_INFINITY);
        for axis in 0..3 {
            let (lo, hi) = items.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), it| {
                (lo.min(it.1[axis]), hi.max(it.1[axis]))
            });
            if hi - lo > best.1 {
                best = (axis, hi - lo);
            }
        }
        best.0
    }

    fn search(&self, node: Option<usize>, target: &[f64; 3], best: &mut Option<(f64, usize)>) {
        let Some(slot) = node else {
            return;
        };
        let node = &self.nodes[slot];

        let d2 = squared_distance(&node.point, target);
        if is_better((d2, node.index), *best) {
            *best = Some((d2, node.index));
        }

        let diff = target[node.axis] - node.point[node.axis];
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.search(near, target, best);
        // <= keeps equally distant points on the far side in play for the
        // lowest-index tie-break
        if best.map_or(true, |(bd2, _)| diff * diff <= bd2) {
            self.search(far, target, best);
        }
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

fn is_better(candidate: (f64, usize), best: Option<(f64, usize)>) -> bool {
    match best {
        None => true,
        Some(best) => match candidate.0.total_cmp(&best.0) {
            Ordering::Less => true,
            Ordering::Equal => candidate.1 < best.1,
            Ordering::Greater => false,
        },
    }
}

impl NearestIndex for SphereKdTree {
    fn nearest(&self, point: GeoPoint) -> Option<Nearest> {
        let target = unit_vector(point);
        let mut best = None;
        self.search(self.root, &target, &mut best);
        best.map(|(_, index)| Nearest {
            index,
            distance_m: haversine_m(point, self.points[index]),
        })
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

/// Exhaustive scan; the reference the tree is checked against
#[derive(Debug, Clone)]
pub struct BruteForceNearest {
    points: Vec<GeoPoint>,
}

impl BruteForceNearest {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }
}

impl NearestIndex for BruteForceNearest {
    fn nearest(&self, point: GeoPoint) -> Option<Nearest> {
        let mut best: Option<Nearest> = None;
        for (index, candidate) in self.points.iter().enumerate() {
            let distance_m = haversine_m(point, *candidate);
            if best.map_or(true, |b| distance_m < b.distance_m) {
                best = Some(Nearest { index, distance_m });
            }
        }
        best
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
