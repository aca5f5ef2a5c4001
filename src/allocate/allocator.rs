//! Per-neighbourhood allocation driver and post-run invariant check

use ahash::AHashSet;
use std::collections::BTreeMap;

use super::{allocate_with_floor, TenureClassifier, TenureExpectation};
use crate::core::error::{PipelineError, Result};
use crate::core::issues::{DataQualityIssue, IssueLog};
use crate::core::types::{NeighbourhoodId, SizeClass, Tenure};
use crate::data::mask::{NeighbourhoodMaskRow, ResidentMaskRow};
use crate::data::{HouseholdSizeDistribution, ParcelTable};

/// One residential parcel queued for allocation
#[derive(Debug, Clone)]
struct Member {
    row: usize,
    tenure: Tenure,
    dwelling_units: u32,
}

#[derive(Debug, Clone)]
struct NeighbourhoodGroup {
    population: u64,
    members: Vec<Member>,
}

/// Residents mask plus what was left out of it
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub rows: Vec<ResidentMaskRow>,
    pub issues: IssueLog,
    pub neighbourhoods_allocated: usize,
    pub parcels_floored: usize,
}

impl AllocationOutcome {
    pub fn total_residents(&self) -> u64 {
        self.rows.iter().map(|r| r.residents).sum()
    }
}

pub struct ResidentAllocator<'a> {
    distribution: &'a HouseholdSizeDistribution,
    classifier: TenureClassifier,
    max_rounds: Option<usize>,
}

impl<'a> ResidentAllocator<'a> {
    pub fn new(distribution: &'a HouseholdSizeDistribution, classifier: TenureClassifier) -> Self {
        Self {
            distribution,
            classifier,
            max_rounds: None,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: Option<usize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Allocate every neighbourhood in the joiner mask
    ///
    /// Infeasible neighbourhoods (population 0, or fewer residents than
    /// parcels) are reported and left out. Any failure of the allocation
    /// itself, or of the conservation and floor check on the finished
    /// mask, is fatal.
    pub fn allocate(&self, mask: &[NeighbourhoodMaskRow], parcels: &ParcelTable) -> Result<AllocationOutcome> {
        let mut issues = IssueLog::new("allocate");
        let groups = self.group(mask, parcels, &mut issues)?;

        let mut rows = Vec::new();
        let mut targets = BTreeMap::new();
        let mut parcels_floored = 0;

        for (id, group) in &groups {
            let dwelling_units: u64 = group.members.iter().map(|m| m.dwelling_units as u64).sum();

            if group.population == 0 {
                issues.record(DataQualityIssue::ZeroPopulation {
                    neighbourhood_id: *id,
                    parcels: group.members.len(),
                    dwelling_units,
                });
                continue;
            }
            if group.population < group.members.len() as u64 {
                issues.record(DataQualityIssue::InsufficientPopulation {
                    neighbourhood_id: *id,
                    population: group.population,
                    parcels: group.members.len(),
                });
                continue;
            }

            let expectation = TenureExpectation::for_parcels(
                group.members.iter().map(|m| (m.tenure, m.dwelling_units)),
                self.distribution,
            );
            let weights: Vec<f64> = group
                .members
                .iter()
                .map(|m| expectation.parcel_raw(m.tenure, m.dwelling_units))
                .collect();

            let allocation = allocate_with_floor(&weights, group.population, self.max_rounds)
                .map_err(|source| PipelineError::Allocation {
                    neighbourhood: *id,
                    source,
                })?;

            tracing::debug!(
                neighbourhood = %id,
                population = group.population,
                parcels = group.members.len(),
                owner_units = expectation.dwelling_units(Tenure::Owner),
                renter_units = expectation.dwelling_units(Tenure::Renter),
                raw_expected = expectation.total(),
                floored = allocation.floored,
                rounds = allocation.rounds,
                "Allocated neighbourhood"
            );
            for tenure in Tenure::ALL {
                let by_class: Vec<f64> = SizeClass::all().map(|c| expectation.persons(tenure, c)).collect();
                tracing::debug!(neighbourhood = %id, %tenure, "Expected persons by household size {:?}", by_class);
            }

            parcels_floored += allocation.floored;
            targets.insert(*id, group.population);
            for (member, residents) in group.members.iter().zip(allocation.residents) {
                let source = &mask[member.row];
                rows.push(ResidentMaskRow {
                    parcel_id: source.parcel_id.clone(),
                    neighbourhood_id: *id,
                    tenure: member.tenure,
                    dwelling_units: member.dwelling_units,
                    residents,
                });
            }
        }

        verify_allocation(&rows, &targets)?;

        let outcome = AllocationOutcome {
            neighbourhoods_allocated: targets.len(),
            rows,
            issues,
            parcels_floored,
        };
        tracing::info!(
            "Allocated {} residents to {} parcels in {} neighbourhoods ({} floored)",
            outcome.total_residents(),
            outcome.rows.len(),
            outcome.neighbourhoods_allocated,
            outcome.parcels_floored
        );
        Ok(outcome)
    }

    fn group(
        &self,
        mask: &[NeighbourhoodMaskRow],
        parcels: &ParcelTable,
        issues: &mut IssueLog,
    ) -> Result<BTreeMap<NeighbourhoodId, NeighbourhoodGroup>> {
        let mut groups: BTreeMap<NeighbourhoodId, NeighbourhoodGroup> = BTreeMap::new();
        let mut seen = AHashSet::new();

        for (row, entry) in mask.iter().enumerate() {
            if !seen.insert(&entry.parcel_id) {
                issues.record(DataQualityIssue::DuplicateParcel {
                    parcel_id: entry.parcel_id.clone(),
                    // header is line 1
                    line: row as u64 + 2,
                });
                continue;
            }
            let Some(parcel) = parcels.get(&entry.parcel_id) else {
                issues.record(DataQualityIssue::UnknownParcel {
                    parcel_id: entry.parcel_id.clone(),
                });
                continue;
            };
            if !parcel.is_residential() {
                tracing::debug!("Skipping non-residential parcel {}", parcel.id);
                continue;
            }

            let group = groups
                .entry(entry.neighbourhood_id)
                .or_insert_with(|| NeighbourhoodGroup {
                    population: entry.population,
                    members: Vec::new(),
                });
            if group.population != entry.population {
                return Err(PipelineError::InvariantViolation {
                    neighbourhood: entry.neighbourhood_id,
                    detail: format!(
                        "mask carries two populations ({} and {})",
                        group.population, entry.population
                    ),
                });
            }
            group.members.push(Member {
                row,
                tenure: self.classifier.classify(&parcel.property_use_code),
                dwelling_units: parcel.dwelling_units,
            });
        }
        Ok(groups)
    }
}

/// Check conservation and the floor over a finished residents mask
///
/// `targets` holds the census population of every neighbourhood that was
/// allocated; each must be matched exactly and no row may be below one.
pub fn verify_allocation(rows: &[ResidentMaskRow], targets: &BTreeMap<NeighbourhoodId, u64>) -> Result<()> {
    let mut totals: BTreeMap<NeighbourhoodId, u64> = BTreeMap::new();
    for row in rows {
        if row.residents < 1 {
            return Err(PipelineError::InvariantViolation {
                neighbourhood: row.neighbourhood_id,
                detail: format!("parcel {} has no residents", row.parcel_id),
            });
        }
        *totals.entry(row.neighbourhood_id).or_default() += row.residents;
    }

    for (id, &target) in targets {
        let allocated = totals.remove(id).unwrap_or(0);
        if allocated != target {
            return Err(PipelineError::InvariantViolation {
                neighbourhood: *id,
                detail: format!("allocated {} residents, census population {}", allocated, target),
            });
        }
    }
    if let Some((id, allocated)) = totals.into_iter().next() {
        return Err(PipelineError::InvariantViolation {
            neighbourhood: id,
            detail: format!("{} residents allocated without a census target", allocated),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GeoPoint, ParcelId};
    use crate::data::household::tests::winnipeg;
    use crate::data::Parcel;

    fn parcel(id: &str, units: u32, code: &str) -> Parcel {
        Parcel {
            id: ParcelId::new(id),
            centroid: GeoPoint::new(49.9, -97.1),
            dwelling_units: units,
            property_use_code: code.into(),
        }
    }

    fn mask_row(id: &str, neighbourhood: u32, population: u64) -> NeighbourhoodMaskRow {
        NeighbourhoodMaskRow {
            parcel_id: ParcelId::new(id),
            neighbourhood_id: NeighbourhoodId(neighbourhood),
            neighbourhood_name: format!("N{}", neighbourhood),
            population,
        }
    }

    const HOUSE: &str = "RESSD - DETACHED SINGLE DWELLING";
    const APARTMENT: &str = "RESAP - APARTMENTS";

    #[test]
    fn test_conserves_each_neighbourhood() {
        let dist = winnipeg();
        let table: ParcelTable = vec![
            parcel("a", 1, HOUSE),
            parcel("b", 1, HOUSE),
            parcel("c", 98, APARTMENT),
            parcel("d", 2, HOUSE),
            parcel("e", 12, APARTMENT),
        ]
        .into_iter()
        .collect();
        let mask = vec![
            mask_row("a", 1, 1000),
            mask_row("b", 1, 1000),
            mask_row("c", 1, 1000),
            mask_row("d", 2, 40),
            mask_row("e", 2, 40),
        ];

        let allocator = ResidentAllocator::new(&dist, TenureClassifier::default());
        let outcome = allocator.allocate(&mask, &table).unwrap();

        assert!(outcome.issues.is_empty());
        assert_eq!(outcome.neighbourhoods_allocated, 2);
        assert_eq!(outcome.total_residents(), 1040);

        let n1: u64 = outcome
            .rows
            .iter()
            .filter(|r| r.neighbourhood_id == NeighbourhoodId(1))
            .map(|r| r.residents)
            .sum();
        assert_eq!(n1, 1000);
        assert!(outcome.rows.iter().all(|r| r.residents >= 1));

        let c = outcome.rows.iter().find(|r| r.parcel_id.as_str() == "c").unwrap();
        assert_eq!(c.tenure, Tenure::Renter);
    }

    #[test]
    fn test_zero_population_reported_and_excluded() {
        let dist = winnipeg();
        let table: ParcelTable = vec![parcel("a", 3, HOUSE), parcel("b", 1, HOUSE)]
            .into_iter()
            .collect();
        let mask = vec![mask_row("a", 5, 0), mask_row("b", 6, 9)];

        let outcome = ResidentAllocator::new(&dist, TenureClassifier::default())
            .allocate(&mask, &table)
            .unwrap();

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].residents, 9);
        assert_eq!(
            outcome.issues.issues,
            vec![DataQualityIssue::ZeroPopulation {
                neighbourhood_id: NeighbourhoodId(5),
                parcels: 1,
                dwelling_units: 3,
            }]
        );
    }

    #[test]
    fn test_population_below_parcel_count_reported() {
        let dist = winnipeg();
        let table: ParcelTable = vec![parcel("a", 1, HOUSE), parcel("b", 1, HOUSE)]
            .into_iter()
            .collect();
        let mask = vec![mask_row("a", 1, 1), mask_row("b", 1, 1)];

        let outcome = ResidentAllocator::new(&dist, TenureClassifier::default())
            .allocate(&mask, &table)
            .unwrap();
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.issues.count_of("insufficient_population"), 1);
    }

    #[test]
    fn test_unknown_parcel_reported() {
        let dist = winnipeg();
        let table: ParcelTable = vec![parcel("a", 1, HOUSE)].into_iter().collect();
        let mask = vec![mask_row("a", 1, 3), mask_row("ghost", 1, 3)];

        let outcome = ResidentAllocator::new(&dist, TenureClassifier::default())
            .allocate(&mask, &table)
            .unwrap();
        assert_eq!(outcome.rows[0].residents, 3);
        assert_eq!(outcome.issues.count_of("unknown_parcel"), 1);
    }

    #[test]
    fn test_verify_catches_drift() {
        let rows = vec![ResidentMaskRow {
            parcel_id: ParcelId::new("a"),
            neighbourhood_id: NeighbourhoodId(1),
            tenure: Tenure::Owner,
            dwelling_units: 1,
            residents: 4,
        }];
        let mut targets = BTreeMap::new();
        targets.insert(NeighbourhoodId(1), 5);

        let err = verify_allocation(&rows, &targets).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvariantViolation { neighbourhood: NeighbourhoodId(1), .. }
        ));
        targets.insert(NeighbourhoodId(1), 4);
        assert!(verify_allocation(&rows, &targets).is_ok());
    }
}
