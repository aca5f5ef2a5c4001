//! Assessment parcels

use ahash::AHashMap;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::core::error::Result;
use crate::core::issues::{DataQualityIssue, IssueLog};
use crate::core::types::{GeoPoint, ParcelId};

/// One physical land unit from the assessment roll
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    pub id: ParcelId,
    pub centroid: GeoPoint,
    pub dwelling_units: u32,
    pub property_use_code: String,
}

impl Parcel {
    /// Only parcels with at least one dwelling unit ever receive residents
    pub fn is_residential(&self) -> bool {
        self.dwelling_units > 0
    }
}

#[derive(Debug, Deserialize)]
struct ParcelRecord {
    parcel_id: String,
    latitude: f64,
    longitude: f64,
    /// Blank in the roll for vacant land
    dwelling_units: Option<u32>,
    #[serde(default)]
    property_use_code: String,
}

/// Parcel table indexed by parcel id
#[derive(Debug, Clone, Default)]
pub struct ParcelTable {
    parcels: Vec<Parcel>,
    by_id: AHashMap<ParcelId, usize>,
}

impl ParcelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parcel; returns false (and keeps the first) on duplicate id
    pub fn insert(&mut self, parcel: Parcel) -> bool {
        if self.by_id.contains_key(&parcel.id) {
            return false;
        }
        self.by_id.insert(parcel.id.clone(), self.parcels.len());
        self.parcels.push(parcel);
        true
    }

    pub fn get(&self, id: &ParcelId) -> Option<&Parcel> {
        self.by_id.get(id).map(|&idx| &self.parcels[idx])
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    pub fn residential(&self) -> impl Iterator<Item = &Parcel> {
        self.parcels.iter().filter(|p| p.is_residential())
    }

    pub fn from_reader<R: Read>(reader: R, issues: &mut IssueLog) -> Result<Self> {
        let rows: Vec<(u64, ParcelRecord)> = super::read_rows(reader, "parcels", issues)?;
        let mut table = Self::new();

        for (line, row) in rows {
            let id = ParcelId::new(row.parcel_id);
            let centroid = GeoPoint::new(row.latitude, row.longitude);
            if !centroid.is_valid() {
                issues.record(DataQualityIssue::InvalidCoordinate {
                    parcel_id: id,
                    lat: row.latitude,
                    lon: row.longitude,
                });
                continue;
            }

            let parcel = Parcel {
                id: id.clone(),
                centroid,
                dwelling_units: row.dwelling_units.unwrap_or(0),
                property_use_code: row.property_use_code,
            };
            if !table.insert(parcel) {
                issues.record(DataQualityIssue::DuplicateParcel { parcel_id: id, line });
            }
        }

        tracing::info!(
            "Loaded {} parcels ({} residential)",
            table.len(),
            table.residential().count()
        );
        Ok(table)
    }

    pub fn load(path: &Path, issues: &mut IssueLog) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, issues)
    }
}

impl FromIterator<Parcel> for ParcelTable {
    fn from_iter<I: IntoIterator<Item = Parcel>>(iter: I) -> Self {
        let mut table = Self::new();
        for parcel in iter {
            table.insert(parcel);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
parcel_id,latitude,longitude,dwelling_units,property_use_code
01001,49.90,-97.10,1,RESSD - DETACHED SINGLE DWELLING
01002,49.91,-97.11,,COMMERCIAL
01003,49.92,-97.12,48,RESAP - APARTMENTS
01001,49.93,-97.13,2,RESDU - DUPLEX
01004,123.0,-97.12,3,RESAP - APARTMENTS
";

    #[test]
    fn test_load_parcels() {
        let mut issues = IssueLog::new("join");
        let table = ParcelTable::from_reader(CSV.as_bytes(), &mut issues).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.residential().count(), 2);

        let first = table.get(&ParcelId::new("01001")).unwrap();
        assert_eq!(first.dwelling_units, 1);
        assert_eq!(first.centroid, GeoPoint::new(49.90, -97.10));

        // Blank dwelling units means non-residential, not an error
        let vacant = table.get(&ParcelId::new("01002")).unwrap();
        assert!(!vacant.is_residential());
    }

    #[test]
    fn test_duplicates_and_bad_coordinates_reported() {
        let mut issues = IssueLog::new("join");
        ParcelTable::from_reader(CSV.as_bytes(), &mut issues).unwrap();

        assert_eq!(issues.count_of("duplicate_parcel"), 1);
        assert_eq!(issues.count_of("invalid_coordinate"), 1);
        assert!(issues.issues.contains(&DataQualityIssue::DuplicateParcel {
            parcel_id: ParcelId::new("01001"),
            line: 5,
        }));
    }
}
