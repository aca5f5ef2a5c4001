//! Property-use code to tenure audit
//!
//! Lists every residential property-use code with the tenure the allocator
//! gives it, so the owner/renter split can be checked against the
//! assessment roll.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::allocate::TenureClassifier;
use crate::core::error::Result;
use crate::core::types::Tenure;
use crate::data::ParcelTable;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodeClassification {
    pub property_use_code: String,
    pub tenure: Tenure,
    /// Code is in neither configured list
    pub defaulted: bool,
    /// e.g. "RENTER (default)"
    pub label: String,
    pub parcels: usize,
    pub dwelling_units: u64,
    /// Share of all residential dwelling units, in percent
    pub unit_share_pct: f64,
    pub mean_dwelling_units: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TenureTotals {
    pub parcels: usize,
    pub dwelling_units: u64,
    pub unit_share_pct: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Largest dwelling-unit count first
    pub codes: Vec<CodeClassification>,
    pub owner: TenureTotals,
    /// Includes defaulted codes when the default is renter
    pub renter: TenureTotals,
    pub total_parcels: usize,
    pub total_dwelling_units: u64,
}

fn share_pct(units: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * units as f64 / total as f64
    }
}

impl ClassificationReport {
    pub fn build(parcels: &ParcelTable, classifier: &TenureClassifier) -> Self {
        let mut by_code: AHashMap<&str, (usize, u64)> = AHashMap::new();
        for parcel in parcels.residential() {
            let entry = by_code.entry(parcel.property_use_code.trim()).or_default();
            entry.0 += 1;
            entry.1 += parcel.dwelling_units as u64;
        }

        let total_parcels: usize = by_code.values().map(|(p, _)| p).sum();
        let total_dwelling_units: u64 = by_code.values().map(|(_, u)| u).sum();

        let mut codes: Vec<CodeClassification> = by_code
            .into_iter()
            .map(|(code, (parcels, dwelling_units))| {
                let tenure = classifier.classify(code);
                let defaulted = !classifier.is_listed(code);
                let label = if defaulted {
                    format!("{} (default)", tenure.label().to_uppercase())
                } else {
                    tenure.label().to_uppercase()
                };
                CodeClassification {
                    property_use_code: code.to_string(),
                    tenure,
                    defaulted,
                    label,
                    parcels,
                    dwelling_units,
                    unit_share_pct: share_pct(dwelling_units, total_dwelling_units),
                    mean_dwelling_units: dwelling_units as f64 / parcels as f64,
                }
            })
            .collect();
        codes.sort_by(|a, b| {
            b.dwelling_units
                .cmp(&a.dwelling_units)
                .then_with(|| a.property_use_code.cmp(&b.property_use_code))
        });

        let totals = |tenure: Tenure| {
            let mut t = TenureTotals::default();
            for c in codes.iter().filter(|c| c.tenure == tenure) {
                t.parcels += c.parcels;
                t.dwelling_units += c.dwelling_units;
            }
            t.unit_share_pct = share_pct(t.dwelling_units, total_dwelling_units);
            t
        };
        let owner = totals(Tenure::Owner);
        let renter = totals(Tenure::Renter);

        tracing::info!(
            "Classified {} property-use codes: owner {:.1}% of units, renter {:.1}%",
            codes.len(),
            owner.unit_share_pct,
            renter.unit_share_pct
        );

        Self {
            codes,
            owner,
            renter,
            total_parcels,
            total_dwelling_units,
        }
    }

    pub fn defaulted(&self) -> impl Iterator<Item = &CodeClassification> {
        self.codes.iter().filter(|c| c.defaulted)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self)?)?;
        Ok(())
    }
}
