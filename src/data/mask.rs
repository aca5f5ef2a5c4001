//! Inter-stage masks
//!
//! A mask is a compact parcel-keyed CSV holding only what one stage derived.
//! Each is the sole contract between two stages, so it must reload on its
//! own without the run that produced it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::Result;
use crate::core::types::{FacilityId, NeighbourhoodId, ParcelId, Tenure};

/// Spatial Joiner output: parcel to enclosing neighbourhood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourhoodMaskRow {
    pub parcel_id: ParcelId,
    pub neighbourhood_id: NeighbourhoodId,
    pub neighbourhood_name: String,
    pub population: u64,
}

/// Resident Allocator output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentMaskRow {
    pub parcel_id: ParcelId,
    pub neighbourhood_id: NeighbourhoodId,
    pub tenure: Tenure,
    pub dwelling_units: u32,
    pub residents: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceStatus {
    Resolved,
    /// No facility to measure against
    Undefined,
}

/// Proximity Engine output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityMaskRow {
    pub parcel_id: ParcelId,
    pub facility_id: Option<FacilityId>,
    pub facility_name: Option<String>,
    pub distance_m: Option<f64>,
    pub status: DistanceStatus,
}

impl ProximityMaskRow {
    pub fn undefined(parcel_id: ParcelId) -> Self {
        Self {
            parcel_id,
            facility_id: None,
            facility_name: None,
            distance_m: None,
            status: DistanceStatus::Undefined,
        }
    }
}

/// Write a mask atomically: rows go to a sibling temp file that is renamed
/// into place only once fully flushed
pub fn write_mask<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;
    tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn read_mask<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    tracing::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
