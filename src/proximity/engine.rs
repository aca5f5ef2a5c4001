use ahash::AHashSet;

use crate::core::issues::{DataQualityIssue, IssueLog};
use crate::core::types::{GeoPoint, ParcelId};
use crate::data::mask::{DistanceStatus, ProximityMaskRow, ResidentMaskRow};
use crate::data::{Facility, ParcelTable, Provenance};
use crate::spatial::{NearestIndex, SphereKdTree};

#[derive(Debug, Clone)]
pub struct ProximityOutcome {
    pub rows: Vec<ProximityMaskRow>,
    pub issues: IssueLog,
}

impl ProximityOutcome {
    pub fn resolved(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.status == DistanceStatus::Resolved)
            .count()
    }
}

/// Nearest audited facility for every parcel in the residents mask
///
/// Automated-source facilities are never measured against, even if the
/// caller passes them in. With no facility left, every parcel still gets a
/// row, marked undefined.
pub fn nearest_facilities(
    residents: &[ResidentMaskRow],
    parcels: &ParcelTable,
    facilities: &[Facility],
) -> ProximityOutcome {
    let mut issues = IssueLog::new("proximity");

    let (audited, automated): (Vec<&Facility>, Vec<&Facility>) = facilities
        .iter()
        .partition(|f| f.provenance == Provenance::Audited);
    if !automated.is_empty() {
        issues.record(DataQualityIssue::DeprecatedFacilities {
            count: automated.len(),
        });
    }

    let index = SphereKdTree::build(audited.iter().map(|f| f.location).collect());
    let mut outcome = nearest_with_index(residents, parcels, &audited, &index);
    issues.extend(outcome.issues);
    outcome.issues = issues;
    outcome
}

/// Measure against any nearest index whose feature `i` is `facilities[i]`
pub fn nearest_with_index<I: NearestIndex>(
    residents: &[ResidentMaskRow],
    parcels: &ParcelTable,
    facilities: &[&Facility],
    index: &I,
) -> ProximityOutcome {
    let mut issues = IssueLog::new("proximity");
    let mut seen: AHashSet<&ParcelId> = AHashSet::new();

    let mut points: Vec<(ParcelId, GeoPoint)> = Vec::with_capacity(residents.len());
    for row in residents {
        if !seen.insert(&row.parcel_id) {
            continue;
        }
        match parcels.get(&row.parcel_id) {
            Some(parcel) => points.push((row.parcel_id.clone(), parcel.centroid)),
            None => issues.record(DataQualityIssue::UnknownParcel {
                parcel_id: row.parcel_id.clone(),
            }),
        }
    }

    if index.is_empty() {
        issues.record(DataQualityIssue::EmptyFacilitySet {
            parcels: points.len(),
        });
        let rows = points
            .into_iter()
            .map(|(id, _)| ProximityMaskRow::undefined(id))
            .collect();
        return ProximityOutcome { rows, issues };
    }

    let rows: Vec<ProximityMaskRow> = points
        .into_iter()
        .map(|(parcel_id, point)| match index.nearest(point) {
            Some(hit) => {
                let facility = facilities[hit.index];
                ProximityMaskRow {
                    parcel_id,
                    facility_id: Some(facility.id.clone()),
                    facility_name: Some(facility.name.clone()),
                    distance_m: Some(hit.distance_m),
                    status: DistanceStatus::Resolved,
                }
            }
            None => ProximityMaskRow::undefined(parcel_id),
        })
        .collect();

    if !rows.is_empty() {
        let distances: Vec<f64> = rows.iter().filter_map(|r| r.distance_m).collect();
        let mean = distances.iter().sum::<f64>() / distances.len().max(1) as f64;
        let max = distances.iter().copied().fold(0.0, f64::max);
        tracing::info!(
            "Measured {} parcels against {} facilities (mean {:.0} m, max {:.0} m)",
            rows.len(),
            index.len(),
            mean,
            max
        );
    }
    ProximityOutcome { rows, issues }
}
