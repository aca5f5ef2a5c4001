//! Grocery facility points

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::core::error::Result;
use crate::core::issues::{DataQualityIssue, IssueLog};
use crate::core::types::{FacilityId, GeoPoint};

/// Where a facility record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Manually curated and geocode-reviewed
    Audited,
    /// Deprecated scraped source, kept in the file for reference only
    Automated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub location: GeoPoint,
    pub provenance: Provenance,
}

#[derive(Debug, Deserialize)]
struct FacilityRecord {
    facility_id: String,
    #[serde(default)]
    name: String,
    latitude: f64,
    longitude: f64,
    provenance: Provenance,
}

pub fn load_facilities_from_reader<R: Read>(reader: R, issues: &mut IssueLog) -> Result<Vec<Facility>> {
    let rows: Vec<(u64, FacilityRecord)> = super::read_rows(reader, "facilities", issues)?;

    let mut facilities = Vec::with_capacity(rows.len());
    for (_, row) in rows {
        let location = GeoPoint::new(row.latitude, row.longitude);
        let id = FacilityId::new(row.facility_id);
        if !location.is_valid() {
            issues.record(DataQualityIssue::RejectedFacility {
                facility_id: id,
                reason: format!("invalid coordinate ({}, {})", row.latitude, row.longitude),
            });
            continue;
        }
        facilities.push(Facility {
            id,
            name: row.name,
            location,
            provenance: row.provenance,
        });
    }
    Ok(facilities)
}

pub fn load_facilities(path: &Path, issues: &mut IssueLog) -> Result<Vec<Facility>> {
    let file = std::fs::File::open(path)?;
    let facilities = load_facilities_from_reader(file, issues)?;
    tracing::info!("Loaded {} facility records", facilities.len());
    Ok(facilities)
}
