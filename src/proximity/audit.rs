//! Geocode review of facility coordinates
//!
//! Only audited facilities take part in distance measurement. Each one is
//! put to a reviewer, which may accept the coordinate, supply a corrected
//! one to be reviewed again, or reject the facility outright.

use ahash::AHashMap;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::core::error::{PipelineError, Result};
use crate::core::issues::{DataQualityIssue, IssueLog};
use crate::core::types::{FacilityId, GeoPoint};
use crate::data::{Facility, Provenance};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReviewDecision {
    Accept,
    /// Replace the coordinate and review again
    Retry(GeoPoint),
    Reject,
}

pub trait GeocodeReview {
    fn review(&mut self, facility: &Facility) -> ReviewDecision;
}

/// Takes every coordinate as given
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl GeocodeReview for AcceptAll {
    fn review(&mut self, _facility: &Facility) -> ReviewDecision {
        ReviewDecision::Accept
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LedgerDecision {
    Accept,
    Reject,
    Relocate,
}

#[derive(Debug, Deserialize)]
struct LedgerRecord {
    facility_id: String,
    decision: LedgerDecision,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LedgerEntry {
    Accept,
    Reject,
    Relocate(GeoPoint),
}

/// Review decisions recorded offline, one row per facility
///
/// Facilities without a row are accepted. A `relocate` row answers with
/// its coordinate until the facility sits there, then accepts.
#[derive(Debug, Clone, Default)]
pub struct ReviewLedger {
    entries: AHashMap<FacilityId, LedgerEntry>,
}

impl ReviewLedger {
    pub fn from_reader<R: Read>(reader: R, issues: &mut IssueLog) -> Result<Self> {
        let rows: Vec<(u64, LedgerRecord)> = crate::data::read_rows(reader, "review_ledger", issues)?;

        let mut entries = AHashMap::with_capacity(rows.len());
        for (line, row) in rows {
            let entry = match row.decision {
                LedgerDecision::Accept => LedgerEntry::Accept,
                LedgerDecision::Reject => LedgerEntry::Reject,
                LedgerDecision::Relocate => match (row.latitude, row.longitude) {
                    (Some(lat), Some(lon)) if GeoPoint::new(lat, lon).is_valid() => {
                        LedgerEntry::Relocate(GeoPoint::new(lat, lon))
                    }
                    _ => {
                        return Err(PipelineError::ReferenceTable(format!(
                            "review ledger line {}: relocate for '{}' needs a valid latitude and longitude",
                            line, row.facility_id
                        )))
                    }
                },
            };
            if entries.insert(FacilityId::new(row.facility_id.clone()), entry).is_some() {
                return Err(PipelineError::ReferenceTable(format!(
                    "review ledger line {}: facility '{}' listed twice",
                    line, row.facility_id
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path, issues: &mut IssueLog) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let ledger = Self::from_reader(file, issues)?;
        tracing::info!("Loaded {} geocode review decisions", ledger.len());
        Ok(ledger)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GeocodeReview for ReviewLedger {
    fn review(&mut self, facility: &Facility) -> ReviewDecision {
        match self.entries.get(&facility.id) {
            None | Some(LedgerEntry::Accept) => ReviewDecision::Accept,
            Some(LedgerEntry::Reject) => ReviewDecision::Reject,
            Some(LedgerEntry::Relocate(point)) if *point == facility.location => ReviewDecision::Accept,
            Some(LedgerEntry::Relocate(point)) => ReviewDecision::Retry(*point),
        }
    }
}

/// Reduce a facility list to the accepted, audited set
pub fn audit_facilities<R: GeocodeReview>(
    facilities: Vec<Facility>,
    reviewer: &mut R,
    max_attempts: u32,
    issues: &mut IssueLog,
) -> Vec<Facility> {
    let total = facilities.len();
    let (audited, automated): (Vec<Facility>, Vec<Facility>) = facilities
        .into_iter()
        .partition(|f| f.provenance == Provenance::Audited);
    if !automated.is_empty() {
        issues.record(DataQualityIssue::DeprecatedFacilities {
            count: automated.len(),
        });
    }

    let mut accepted = Vec::with_capacity(audited.len());
    for mut facility in audited {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match reviewer.review(&facility) {
                ReviewDecision::Accept => {
                    accepted.push(facility);
                    break;
                }
                ReviewDecision::Reject => {
                    issues.record(DataQualityIssue::RejectedFacility {
                        facility_id: facility.id.clone(),
                        reason: "rejected on review".into(),
                    });
                    break;
                }
                ReviewDecision::Retry(_) if attempts >= max_attempts => {
                    issues.record(DataQualityIssue::RejectedFacility {
                        facility_id: facility.id.clone(),
                        reason: format!("no accepted coordinate after {} reviews", attempts),
                    });
                    break;
                }
                ReviewDecision::Retry(point) if !point.is_valid() => {
                    issues.record(DataQualityIssue::RejectedFacility {
                        facility_id: facility.id.clone(),
                        reason: format!("corrected coordinate ({}, {}) is invalid", point.lat, point.lon),
                    });
                    break;
                }
                ReviewDecision::Retry(point) => {
                    tracing::debug!(
                        "Facility {} moved from ({:.5}, {:.5}) to ({:.5}, {:.5})",
                        facility.id,
                        facility.location.lat,
                        facility.location.lon,
                        point.lat,
                        point.lon
                    );
                    facility.location = point;
                }
            }
        }
    }

    tracing::info!("Accepted {} of {} facilities after review", accepted.len(), total);
    accepted
}
