//! Per-neighbourhood food-desert summary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::ParcelOutcomeRow;
use crate::core::error::Result;
use crate::core::types::NeighbourhoodId;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighbourhoodSummary {
    pub neighbourhood_id: NeighbourhoodId,
    pub parcels: usize,
    pub residents: u64,
    /// Residents in parcels with a defined distance
    pub measured_residents: u64,
    pub desert_parcels: usize,
    pub desert_residents: u64,
    /// Share of residents with a defined distance who live in a food desert
    pub desert_share: Option<f64>,
    pub mean_distance_m: Option<f64>,
    pub max_distance_m: Option<f64>,
    /// Parcels with no facility to measure against
    pub undefined_parcels: usize,
}

/// Complete run summary
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FoodDesertSummary {
    pub threshold_m: f64,
    pub neighbourhoods: Vec<NeighbourhoodSummary>,
    pub total_parcels: usize,
    pub total_residents: u64,
    pub measured_residents: u64,
    pub desert_residents: u64,
    pub undefined_parcels: usize,
}

#[derive(Default)]
struct Accumulator {
    summary: NeighbourhoodSummary,
    distance_sum: f64,
    measured_parcels: usize,
}

impl FoodDesertSummary {
    pub fn from_outcomes(rows: &[ParcelOutcomeRow], threshold_m: f64) -> Self {
        let mut acc: BTreeMap<NeighbourhoodId, Accumulator> = BTreeMap::new();

        for row in rows {
            let a = acc.entry(row.neighbourhood_id).or_default();
            a.summary.neighbourhood_id = row.neighbourhood_id;
            a.summary.parcels += 1;
            a.summary.residents += row.residents;

            let Some(d) = row.distance_m else {
                a.summary.undefined_parcels += 1;
                continue;
            };
            a.measured_parcels += 1;
            a.summary.measured_residents += row.residents;
            a.distance_sum += d;
            a.summary.max_distance_m = Some(a.summary.max_distance_m.map_or(d, |m: f64| m.max(d)));
            if row.food_desert == Some(true) {
                a.summary.desert_parcels += 1;
                a.summary.desert_residents += row.residents;
            }
        }

        let neighbourhoods: Vec<NeighbourhoodSummary> = acc
            .into_values()
            .map(|a| {
                let mut s = a.summary;
                if a.measured_parcels > 0 {
                    s.mean_distance_m = Some(a.distance_sum / a.measured_parcels as f64);
                }
                if s.measured_residents > 0 {
                    s.desert_share = Some(s.desert_residents as f64 / s.measured_residents as f64);
                }
                s
            })
            .collect();

        Self {
            threshold_m,
            total_parcels: neighbourhoods.iter().map(|n| n.parcels).sum(),
            total_residents: neighbourhoods.iter().map(|n| n.residents).sum(),
            measured_residents: neighbourhoods.iter().map(|n| n.measured_residents).sum(),
            desert_residents: neighbourhoods.iter().map(|n| n.desert_residents).sum(),
            undefined_parcels: neighbourhoods.iter().map(|n| n.undefined_parcels).sum(),
            neighbourhoods,
        }
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
        let share = if self.measured_residents > 0 {
            format!("{:.1}%", 100.0 * self.desert_residents as f64 / self.measured_residents as f64)
        } else {
            "n/a".to_string()
        };
        format!(
            "{} residents in {} parcels across {} neighbourhoods\n{} ({} of measured) live more than {:.0} m from a grocery store, {} parcels unmeasured",
            self.total_residents,
            self.total_parcels,
            self.neighbourhoods.len(),
            self.desert_residents,
            share,
            self.threshold_m,
            self.undefined_parcels,
        )
    }
}
