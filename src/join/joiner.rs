use ahash::AHashSet;

use crate::core::issues::{DataQualityIssue, IssueLog};
use crate::data::mask::NeighbourhoodMaskRow;
use crate::data::{Neighbourhood, ParcelTable};
use crate::spatial::validation::LayerValidator;
use crate::spatial::{ContainmentIndex, PolygonCellIndex};

/// Neighbourhood mask plus everything that could not be placed
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub rows: Vec<NeighbourhoodMaskRow>,
    pub issues: IssueLog,
}

/// Validate the neighbourhood layer, index it, and join every residential
/// parcel by centroid
pub fn join_parcels(parcels: &ParcelTable, neighbourhoods: &[Neighbourhood]) -> JoinOutcome {
    let mut issues = IssueLog::new("join");

    let report = LayerValidator::validate(neighbourhoods);
    report.record_issues(&mut issues);
    if !report.is_partition() {
        tracing::warn!(
            "Neighbourhood layer is not a partition ({} overlapping pairs); parcels in the overlaps are left unassigned",
            report.overlaps.len()
        );
    }

    let accepted: Vec<&Neighbourhood> = report.accepted.iter().map(|&i| &neighbourhoods[i]).collect();
    let index = PolygonCellIndex::build(accepted.iter().map(|n| n.boundary.clone()).collect());

    let mut outcome = join_with_index(parcels, &accepted, &index);
    issues.extend(outcome.issues);
    outcome.issues = issues;
    outcome
}

/// Join against any containment index whose feature `i` is
/// `neighbourhoods[i]`
///
/// Exactly one containing neighbourhood puts the parcel in the mask; none
/// or several put it in the issue log instead.
pub fn join_with_index<I: ContainmentIndex>(
    parcels: &ParcelTable,
    neighbourhoods: &[&Neighbourhood],
    index: &I,
) -> JoinOutcome {
    let mut issues = IssueLog::new("join");
    let mut rows = Vec::new();
    let mut populated = AHashSet::new();

    for parcel in parcels.residential() {
        let hits = index.containing(parcel.centroid);
        match hits.as_slice() {
            [] => issues.record(DataQualityIssue::UnresolvedParcel {
                parcel_id: parcel.id.clone(),
            }),
            [only] => {
                let n = neighbourhoods[*only];
                populated.insert(n.id);
                rows.push(NeighbourhoodMaskRow {
                    parcel_id: parcel.id.clone(),
                    neighbourhood_id: n.id,
                    neighbourhood_name: n.name.clone(),
                    population: n.population,
                });
            }
            many => issues.record(DataQualityIssue::AmbiguousParcel {
                parcel_id: parcel.id.clone(),
                neighbourhoods: many.iter().map(|&i| neighbourhoods[i].id).collect(),
            }),
        }
    }

    for n in neighbourhoods {
        if n.population > 0 && !populated.contains(&n.id) {
            issues.record(DataQualityIssue::NoResidentialParcels {
                neighbourhood_id: n.id,
                population: n.population,
            });
        }
    }

    tracing::info!(
        "Joined {} residential parcels to {} neighbourhoods ({} unresolved, {} ambiguous)",
        rows.len(),
        populated.len(),
        issues.count_of("unresolved_parcel"),
        issues.count_of("ambiguous_parcel")
    );
    JoinOutcome { rows, issues }
}
