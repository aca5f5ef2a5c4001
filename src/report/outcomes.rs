use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{FacilityId, NeighbourhoodId, ParcelId};
use crate::data::mask::{ProximityMaskRow, ResidentMaskRow};

/// One residential parcel with everything the pipeline derived for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelOutcomeRow {
    pub parcel_id: ParcelId,
    pub neighbourhood_id: NeighbourhoodId,
    pub residents: u64,
    pub facility_id: Option<FacilityId>,
    pub distance_m: Option<f64>,
    /// Empty when the distance is undefined
    pub food_desert: Option<bool>,
}

/// Join the residents and proximity masks on parcel id
///
/// Parcels missing from the proximity mask keep an undefined distance.
pub fn join_outcomes(
    residents: &[ResidentMaskRow],
    proximity: &[ProximityMaskRow],
    threshold_m: f64,
) -> Vec<ParcelOutcomeRow> {
    let by_parcel: AHashMap<&ParcelId, &ProximityMaskRow> =
        proximity.iter().map(|row| (&row.parcel_id, row)).collect();

    residents
        .iter()
        .map(|row| {
            let hit = by_parcel.get(&row.parcel_id);
            let distance_m = hit.and_then(|p| p.distance_m);
            ParcelOutcomeRow {
                parcel_id: row.parcel_id.clone(),
                neighbourhood_id: row.neighbourhood_id,
                residents: row.residents,
                facility_id: hit.and_then(|p| p.facility_id.clone()),
                distance_m,
                food_desert: distance_m.map(|d| d > threshold_m),
            }
        })
        .collect()
}
