//! Data-quality issues and the run-level issue log
//!
//! Record-level problems never abort a stage. Each one is recorded here
//! with enough context (parcel, neighbourhood or facility id, file line)
//! for someone to go and fix the source data, and the affected record is
//! left out of the stage's output mask.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::Result;
use crate::core::types::{FacilityId, NeighbourhoodId, ParcelId};

/// A single non-fatal data-quality problem
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityIssue {
    /// Parcel centroid falls inside no neighbourhood
    UnresolvedParcel { parcel_id: ParcelId },
    /// Parcel centroid falls inside more than one neighbourhood
    AmbiguousParcel {
        parcel_id: ParcelId,
        neighbourhoods: Vec<NeighbourhoodId>,
    },
    /// Neighbourhood geometry rejected; the neighbourhood is excluded
    MalformedGeometry {
        neighbourhood_id: NeighbourhoodId,
        reason: String,
    },
    /// Two neighbourhood interiors overlap
    OverlappingNeighbourhoods {
        first: NeighbourhoodId,
        second: NeighbourhoodId,
    },
    /// Input row could not be parsed
    MalformedRecord {
        table: String,
        line: u64,
        reason: String,
    },
    InvalidCoordinate { parcel_id: ParcelId, lat: f64, lon: f64 },
    DuplicateParcel { parcel_id: ParcelId, line: u64 },
    /// Population 0 with residential parcels present
    ZeroPopulation {
        neighbourhood_id: NeighbourhoodId,
        parcels: usize,
        dwelling_units: u64,
    },
    /// Fewer residents than residential parcels, so the floor of one
    /// resident per parcel cannot hold
    InsufficientPopulation {
        neighbourhood_id: NeighbourhoodId,
        population: u64,
        parcels: usize,
    },
    /// Census population with no residential parcel to carry it
    NoResidentialParcels {
        neighbourhood_id: NeighbourhoodId,
        population: u64,
    },
    /// Mask references a parcel missing from the parcel table
    UnknownParcel { parcel_id: ParcelId },
    /// No facility to measure against; every distance is undefined
    EmptyFacilitySet { parcels: usize },
    /// Automated-source facilities present in the input and ignored
    DeprecatedFacilities { count: usize },
    RejectedFacility { facility_id: FacilityId, reason: String },
}

impl DataQualityIssue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnresolvedParcel { .. } => "unresolved_parcel",
            Self::AmbiguousParcel { .. } => "ambiguous_parcel",
            Self::MalformedGeometry { .. } => "malformed_geometry",
            Self::OverlappingNeighbourhoods { .. } => "overlapping_neighbourhoods",
            Self::MalformedRecord { .. } => "malformed_record",
            Self::InvalidCoordinate { .. } => "invalid_coordinate",
            Self::DuplicateParcel { .. } => "duplicate_parcel",
            Self::ZeroPopulation { .. } => "zero_population",
            Self::InsufficientPopulation { .. } => "insufficient_population",
            Self::NoResidentialParcels { .. } => "no_residential_parcels",
            Self::UnknownParcel { .. } => "unknown_parcel",
            Self::EmptyFacilitySet { .. } => "empty_facility_set",
            Self::DeprecatedFacilities { .. } => "deprecated_facilities",
            Self::RejectedFacility { .. } => "rejected_facility",
        }
    }
}

/// Issues collected over one stage run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IssueLog {
    pub stage: String,
    pub issues: Vec<DataQualityIssue>,
}

impl IssueLog {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            issues: Vec::new(),
        }
    }

    /// Record an issue and emit it as a warning
    pub fn record(&mut self, issue: DataQualityIssue) {
        tracing::warn!(stage = %self.stage, kind = issue.kind(), "{:?}", issue);
        self.issues.push(issue);
    }

    pub fn extend(&mut self, other: IssueLog) {
        self.issues.extend(other.issues);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn count_of(&self, kind: &str) -> usize {
        self.issues.iter().filter(|i| i.kind() == kind).count()
    }

    /// Per-kind counts, sorted by kind
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for issue in &self.issues {
            match counts.iter_mut().find(|(k, _)| *k == issue.kind()) {
                Some((_, n)) => *n += 1,
                None => counts.push((issue.kind(), 1)),
            }
        }
        counts.sort();
        counts
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self)?)?;
        Ok(())
    }

    pub fn summary(&self) -> String {
        if self.issues.is_empty() {
            return format!("{}: no data-quality issues", self.stage);
        }
        let parts: Vec<String> = self
            .counts()
            .into_iter()
            .map(|(kind, n)| format!("{} {}", n, kind))
            .collect();
        format!(
            "{}: {} data-quality issues ({})",
            self.stage,
            self.issues.len(),
            parts.join(", ")
        )
    }
}
