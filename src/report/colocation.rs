use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::issues::{DataQualityIssue, IssueLog};
use crate::core::types::{NeighbourhoodId, ParcelId};
use crate::data::mask::ResidentMaskRow;
use crate::data::ParcelTable;

/// Residential parcels sharing one centroid, such as the units of a condo
/// building, collapsed to a single point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColocatedParcel {
    /// First member in mask order
    pub parcel_id: ParcelId,
    pub neighbourhood_id: NeighbourhoodId,
    pub latitude: f64,
    pub longitude: f64,
    pub parcel_count: usize,
    pub dwelling_units: u64,
    pub residents: u64,
    /// Semicolon-separated member parcel ids
    pub members: String,
}

/// Group the residents mask by identical centroid
///
/// Groups never span neighbourhoods. Resident totals are unchanged.
pub fn aggregate_colocated(
    residents: &[ResidentMaskRow],
    parcels: &ParcelTable,
    issues: &mut IssueLog,
) -> Vec<ColocatedParcel> {
    let mut slots: AHashMap<(NeighbourhoodId, u64, u64), usize> = AHashMap::new();
    let mut groups: Vec<(ColocatedParcel, Vec<&str>)> = Vec::new();

    for row in residents {
        let Some(parcel) = parcels.get(&row.parcel_id) else {
            issues.record(DataQualityIssue::UnknownParcel {
                parcel_id: row.parcel_id.clone(),
            });
            continue;
        };
        let c = parcel.centroid;
        let key = (row.neighbourhood_id, c.lat.to_bits(), c.lon.to_bits());

        match slots.get(&key) {
            Some(&slot) => {
                let (group, members) = &mut groups[slot];
                group.parcel_count += 1;
                group.dwelling_units += row.dwelling_units as u64;
                group.residents += row.residents;
                members.push(row.parcel_id.as_str());
            }
            None => {
                slots.insert(key, groups.len());
                groups.push((
                    ColocatedParcel {
                        parcel_id: row.parcel_id.clone(),
                        neighbourhood_id: row.neighbourhood_id,
                        latitude: c.lat,
                        longitude: c.lon,
                        parcel_count: 1,
                        dwelling_units: row.dwelling_units as u64,
                        residents: row.residents,
                        members: String::new(),
                    },
                    vec![row.parcel_id.as_str()],
                ));
            }
        }
    }

    let shared = groups.iter().filter(|(g, _)| g.parcel_count > 1).count();
    tracing::info!(
        "Collapsed {} parcels to {} points ({} shared)",
        residents.len(),
        groups.len(),
        shared
    );

    groups
        .into_iter()
        .map(|(mut group, members)| {
            group.members = members.join(";");
            group
        })
        .collect()
}
