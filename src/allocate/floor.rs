//! Floor-constrained proportional allocation
//!
//! Pure function over a weight vector and an integer target: no I/O, no
//! global state. Each round scales the still-free parcels so they carry
//! whatever the floored parcels have not consumed; any parcel that lands
//! below one resident is pinned at exactly one and the round repeats.
//! Every round pins at least one more parcel, so the loop runs at most
//! `weights.len()` rounds.

use super::AllocationError;

/// Result of one neighbourhood's allocation
#[derive(Debug, Clone, PartialEq)]
pub struct FloorAllocation {
    /// Integer residents per parcel, in input order
    pub residents: Vec<u64>,
    /// Real-valued allocation before rounding
    pub expected: Vec<f64>,
    /// Parcels pinned at the floor of one resident
    pub floored: usize,
    /// Scaling rounds run
    pub rounds: usize,
}

/// Distribute `target` across parcels in proportion to `weights`, with
/// every parcel receiving at least one
pub fn allocate_with_floor(
    weights: &[f64],
    target: u64,
    max_rounds: Option<usize>,
) -> Result<FloorAllocation, AllocationError> {
    let n = weights.len();
    if n == 0 {
        return Err(AllocationError::EmptyInput);
    }
    if let Some((index, &weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !(w.is_finite() && **w > 0.0))
    {
        return Err(AllocationError::InvalidWeight { index, weight });
    }
    if target < n as u64 {
        return Err(AllocationError::InfeasibleTarget {
            population: target,
            parcels: n,
        });
    }

    let mut expected = vec![0.0; n];
    let mut pinned = vec![false; n];
    let mut free: Vec<usize> = (0..n).collect();
    let mut floored = 0usize;
    let mut rounds = 0usize;

    while !free.is_empty() {
        rounds += 1;
        if max_rounds.is_some_and(|max| rounds > max) {
            return Err(AllocationError::NotConverged { rounds: rounds - 1 });
        }

        let remaining = (target - floored as u64) as f64;
        let weight_sum: f64 = free.iter().map(|&i| weights[i]).sum();
        let factor = remaining / weight_sum;

        let mut below = 0;
        for &i in &free {
            expected[i] = weights[i] * factor;
            if expected[i] < 1.0 {
                expected[i] = 1.0;
                pinned[i] = true;
                below += 1;
            }
        }

        tracing::debug!(round = rounds, factor, newly_floored = below, "floor round");
        if below == 0 {
            break;
        }
        floored += below;
        free.retain(|&i| !pinned[i]);
    }

    let residents = largest_remainder(&expected, target)?;

    let allocated: u64 = residents.iter().sum();
    if allocated != target {
        return Err(AllocationError::ConservationDrift {
            expected: target,
            allocated,
        });
    }
    if let Some((index, &r)) = residents.iter().enumerate().find(|(_, r)| **r < 1) {
        return Err(AllocationError::FloorViolated { index, residents: r });
    }

    Ok(FloorAllocation {
        residents,
        expected,
        floored,
        rounds,
    })
}

/// Round a real vector summing to `target` into integers summing to
/// exactly `target` (Hamilton's method)
///
/// Each value gets its floor; the shortfall goes one apiece to the largest
/// fractional parts, ties to the larger value and then the lower index.
/// Every integer is within one of its real value and the integers keep the
/// real values' order, but ratios such as residents per dwelling unit only
/// hold to that one-resident tolerance.
pub fn largest_remainder(values: &[f64], target: u64) -> Result<Vec<u64>, AllocationError> {
    let mut base: Vec<u64> = values.iter().map(|v| v.floor() as u64).collect();
    let floor_sum: u64 = base.iter().sum();

    if floor_sum > target || target - floor_sum > values.len() as u64 {
        return Err(AllocationError::ConservationDrift {
            expected: target,
            allocated: floor_sum,
        });
    }
    let shortfall = (target - floor_sum) as usize;

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = values[a] - values[a].floor();
        let rb = values[b] - values[b].floor();
        rb.total_cmp(&ra)
            .then_with(|| values[b].total_cmp(&values[a]))
            .then(a.cmp(&b))
    });
    for &i in order.iter().take(shortfall) {
        base[i] += 1;
    }
    Ok(base)
}
