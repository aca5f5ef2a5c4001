//! Property tests for the floor-constrained allocation

use std::collections::BTreeMap;

use proptest::prelude::*;

use food_desert::allocate::{allocate_with_floor, verify_allocation, ResidentAllocator, TenureClassifier, TenureExpectation};
use food_desert::core::types::{GeoPoint, NeighbourhoodId, ParcelId, Tenure};
use food_desert::data::mask::NeighbourhoodMaskRow;
use food_desert::data::{HouseholdSizeDistribution, Parcel, ParcelTable};

/// One owner code, one renter code, and one listed in neither
const CODES: [&str; 3] = [
    "RESSD - DETACHED SINGLE DWELLING",
    "RESAP - APARTMENTS",
    "RESGC - GROUP CARE",
];

fn winnipeg() -> HouseholdSizeDistribution {
    HouseholdSizeDistribution::from_fractions(
        [0.224, 0.378, 0.154, 0.152, 0.092],
        [0.503, 0.292, 0.106, 0.060, 0.039],
        1e-3,
    )
    .unwrap()
}

/// Parcels as (code index, dwelling units), whether the population is short
/// of the parcel count, and a population offset
fn neighbourhood() -> impl Strategy<Value = (Vec<(usize, u32)>, bool, u64)> {
    (
        prop::collection::vec((0usize..CODES.len(), 1u32..200), 1..12),
        any::<bool>(),
        0u64..5_000,
    )
}

proptest! {
    #[test]
    fn test_conservation_and_floor(
        weights in prop::collection::vec(0.01f64..500.0, 1..60),
        extra in 0u64..20_000,
    ) {
        let target = weights.len() as u64 + extra;
        let result = allocate_with_floor(&weights, target, None).unwrap();

        prop_assert_eq!(result.residents.len(), weights.len());
        prop_assert_eq!(result.residents.iter().sum::<u64>(), target);
        prop_assert!(result.residents.iter().all(|&r| r >= 1));
        prop_assert!(result.rounds <= weights.len());
    }

    #[test]
    fn test_saturation_is_monotone_within_tenure(
        units in prop::collection::vec(1u32..200, 2..40),
        extra in 0u64..5_000,
    ) {
        let dist = winnipeg();
        let parcels: Vec<(Tenure, u32)> = units.iter().map(|&u| (Tenure::Owner, u)).collect();
        let expectation = TenureExpectation::for_parcels(parcels.iter().copied(), &dist);
        let weights: Vec<f64> = parcels
            .iter()
            .map(|(t, u)| expectation.parcel_raw(*t, *u))
            .collect();

        let target = units.len() as u64 + extra;
        let result = allocate_with_floor(&weights, target, None).unwrap();

        for (r, e) in result.residents.iter().zip(&result.expected) {
            prop_assert!((*r as f64 - e).abs() <= 1.0 + 1e-9);
        }

        for i in 0..units.len() {
            for j in 0..units.len() {
                if units[i] < units[j] {
                    // More dwelling units never means fewer residents
                    prop_assert!(result.expected[i] <= result.expected[j] + 1e-9);
                    prop_assert!(result.residents[i] <= result.residents[j]);

                    // and never more residents per unit: exactly on the real
                    // allocation, within one resident per parcel once rounded
                    let per_i = result.expected[i] / units[i] as f64;
                    let per_j = result.expected[j] / units[j] as f64;
                    prop_assert!(per_i + 1e-9 >= per_j);

                    let (ri, rj) = (result.residents[i] as f64, result.residents[j] as f64);
                    prop_assert!((ri + 1.0) / units[i] as f64 + 1e-9 >= (rj - 1.0) / units[j] as f64);
                }
            }
        }
    }

    #[test]
    fn test_infeasible_never_allocates(
        weights in prop::collection::vec(0.1f64..10.0, 2..30),
    ) {
        let target = weights.len() as u64 - 1;
        prop_assert!(allocate_with_floor(&weights, target, None).is_err());
    }

    #[test]
    fn test_allocator_conserves_every_neighbourhood(
        hoods in prop::collection::vec(neighbourhood(), 1..6),
    ) {
        let dist = winnipeg();
        let mut parcels = ParcelTable::new();
        let mut mask = Vec::new();
        // id -> (population, parcels)
        let mut layer = BTreeMap::new();

        for (n, (members, short, offset)) in hoods.iter().enumerate() {
            let count = members.len() as u64;
            let population = if *short { offset % count } else { count + offset };
            let id = NeighbourhoodId(n as u32 + 1);
            layer.insert(id, (population, count));

            for (k, &(code, dwelling_units)) in members.iter().enumerate() {
                let parcel_id = ParcelId::new(format!("{}-{}", n, k));
                parcels.insert(Parcel {
                    id: parcel_id.clone(),
                    centroid: GeoPoint::new(49.9, -97.1),
                    dwelling_units,
                    property_use_code: CODES[code].to_string(),
                });
                mask.push(NeighbourhoodMaskRow {
                    parcel_id,
                    neighbourhood_id: id,
                    neighbourhood_name: format!("N{}", n),
                    population,
                });
            }
        }

        let outcome = ResidentAllocator::new(&dist, TenureClassifier::default())
            .allocate(&mask, &parcels)
            .unwrap();

        let mut totals: BTreeMap<NeighbourhoodId, (u64, u64)> = BTreeMap::new();
        for row in &outcome.rows {
            prop_assert!(row.residents >= 1);
            let code = &parcels.get(&row.parcel_id).unwrap().property_use_code;
            let tenure = if code == CODES[0] { Tenure::Owner } else { Tenure::Renter };
            prop_assert_eq!(row.tenure, tenure);

            let entry = totals.entry(row.neighbourhood_id).or_default();
            entry.0 += row.residents;
            entry.1 += 1;
        }

        let mut targets = BTreeMap::new();
        let mut infeasible = 0;
        for (id, &(population, count)) in &layer {
            if population >= count {
                prop_assert_eq!(totals.get(id), Some(&(population, count)));
                targets.insert(*id, population);
            } else {
                prop_assert!(!totals.contains_key(id));
                infeasible += 1;
            }
        }

        prop_assert_eq!(outcome.neighbourhoods_allocated, targets.len());
        prop_assert_eq!(
            outcome.issues.count_of("zero_population") + outcome.issues.count_of("insufficient_population"),
            infeasible
        );
        prop_assert!(verify_allocation(&outcome.rows, &targets).is_ok());
    }
}
