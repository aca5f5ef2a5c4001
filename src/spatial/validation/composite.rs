//! Layer-wide validation of the neighbourhood polygons

use super::{GeometricValidator, ValidationError};
use crate::core::issues::{DataQualityIssue, IssueLog};
use crate::core::types::NeighbourhoodId;
use crate::data::Neighbourhood;

/// Result of validating a neighbourhood layer
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Indices (into the input slice) of neighbourhoods fit to join against
    pub accepted: Vec<usize>,
    pub rejected: Vec<(NeighbourhoodId, Vec<ValidationError>)>,
    /// Pairs whose interiors overlap; the layer is not a planar partition
    pub overlaps: Vec<(NeighbourhoodId, NeighbourhoodId)>,
}

impl ValidationReport {
    pub fn is_partition(&self) -> bool {
        self.overlaps.is_empty()
    }

    /// Copy every problem into the stage issue log
    pub fn record_issues(&self, issues: &mut IssueLog) {
        for (id, errors) in &self.rejected {
            let reason = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            issues.record(DataQualityIssue::MalformedGeometry {
                neighbourhood_id: *id,
                reason,
            });
        }
        for (first, second) in &self.overlaps {
            issues.record(DataQualityIssue::OverlappingNeighbourhoods {
                first: *first,
                second: *second,
            });
        }
    }
}

pub struct LayerValidator;

impl LayerValidator {
    /// Reject malformed neighbourhoods, then check the survivors form a
    /// partition
    ///
    /// Overlapping pairs are reported but both members stay accepted: the
    /// joiner flags any parcel that actually lands in both.
    pub fn validate(neighbourhoods: &[Neighbourhood]) -> ValidationReport {
        let mut report = ValidationReport::default();

        for (idx, n) in neighbourhoods.iter().enumerate() {
            let errors = GeometricValidator::validate_multipolygon(&n.boundary);
            if errors.is_empty() {
                report.accepted.push(idx);
            } else {
                report.rejected.push((n.id, errors));
            }
        }

        for (pos, &i) in report.accepted.iter().enumerate() {
            for &j in &report.accepted[pos + 1..] {
                let (a, b) = (&neighbourhoods[i], &neighbourhoods[j]);
                if GeometricValidator::interiors_overlap(&a.boundary, &b.boundary) {
                    report.overlaps.push((a.id, b.id));
                }
            }
        }

        tracing::info!(
            "Neighbourhood layer: {} accepted, {} rejected, {} overlapping pairs",
            report.accepted.len(),
            report.rejected.len(),
            report.overlaps.len()
        );
        report
    }
}
