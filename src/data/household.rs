//! Household size distribution by tenure
//!
//! Reference table of the share of households of each size (1..5+ persons)
//! among owner-occupied and renter-occupied dwellings. Integrity problems
//! here poison every allocation, so all of them are fatal at load time.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::core::error::{PipelineError, Result};
use crate::core::types::{SizeClass, Tenure};

#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdSizeDistribution {
    owner: [f64; SizeClass::COUNT],
    renter: [f64; SizeClass::COUNT],
}

#[derive(Debug, Deserialize)]
struct DistributionRecord {
    tenure: Tenure,
    household_size: u8,
    fraction: f64,
}

impl HouseholdSizeDistribution {
    /// Build from per-class fractions, checking each bucket sums to 1
    pub fn from_fractions(
        owner: [f64; SizeClass::COUNT],
        renter: [f64; SizeClass::COUNT],
        tolerance: f64,
    ) -> Result<Self> {
        for (tenure, fractions) in [(Tenure::Owner, &owner), (Tenure::Renter, &renter)] {
            if let Some(bad) = fractions.iter().find(|f| !f.is_finite() || **f < 0.0 || **f > 1.0) {
                return Err(PipelineError::ReferenceTable(format!(
                    "{} fraction {} outside [0, 1]",
                    tenure, bad
                )));
            }
            let sum: f64 = fractions.iter().sum();
            if (sum - 1.0).abs() > tolerance {
                return Err(PipelineError::ReferenceTable(format!(
                    "{} fractions sum to {:.6}, expected 1 (tolerance {})",
                    tenure, sum, tolerance
                )));
            }
        }
        Ok(Self { owner, renter })
    }

    pub fn from_reader<R: Read>(reader: R, tolerance: f64) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut owner = [None; SizeClass::COUNT];
        let mut renter = [None; SizeClass::COUNT];

        for record in reader.deserialize::<DistributionRecord>() {
            let record = record.map_err(|e| {
                PipelineError::ReferenceTable(format!("household size table: {}", e))
            })?;
            let class = SizeClass::new(record.household_size).ok_or_else(|| {
                PipelineError::ReferenceTable(format!(
                    "household size {} is not a size class (1-5)",
                    record.household_size
                ))
            })?;
            let bucket = match record.tenure {
                Tenure::Owner => &mut owner,
                Tenure::Renter => &mut renter,
            };
            if bucket[class.index()].replace(record.fraction).is_some() {
                return Err(PipelineError::ReferenceTable(format!(
                    "{} household size {} listed twice",
                    record.tenure, record.household_size
                )));
            }
        }

        let owner = complete_bucket(Tenure::Owner, owner)?;
        let renter = complete_bucket(Tenure::Renter, renter)?;
        Self::from_fractions(owner, renter, tolerance)
    }

    pub fn load(path: &Path, tolerance: f64) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let dist = Self::from_reader(file, tolerance)?;
        tracing::info!(
            "Household sizes: owner mean {:.3}, renter mean {:.3}",
            dist.mean_household_size(Tenure::Owner),
            dist.mean_household_size(Tenure::Renter)
        );
        Ok(dist)
    }

    pub fn fractions(&self, tenure: Tenure) -> &[f64; SizeClass::COUNT] {
        match tenure {
            Tenure::Owner => &self.owner,
            Tenure::Renter => &self.renter,
        }
    }

    pub fn fraction(&self, tenure: Tenure, class: SizeClass) -> f64 {
        self.fractions(tenure)[class.index()]
    }

    /// Expected persons per size class housed in `dwelling_units` units
    pub fn expected_persons(&self, tenure: Tenure, dwelling_units: f64) -> [f64; SizeClass::COUNT] {
        let mut out = [0.0; SizeClass::COUNT];
        for class in SizeClass::all() {
            out[class.index()] = self.fraction(tenure, class) * dwelling_units * class.persons();
        }
        out
    }

    /// Expected persons per dwelling unit
    pub fn mean_household_size(&self, tenure: Tenure) -> f64 {
        self.expected_persons(tenure, 1.0).iter().sum()
    }
}

fn complete_bucket(
    tenure: Tenure,
    bucket: [Option<f64>; SizeClass::COUNT],
) -> Result<[f64; SizeClass::COUNT]> {
    if bucket.iter().all(Option::is_none) {
        return Err(PipelineError::ReferenceTable(format!(
            "tenure bucket '{}' missing from household size table",
            tenure
        )));
    }
    let mut out = [0.0; SizeClass::COUNT];
    for (i, value) in bucket.iter().enumerate() {
        out[i] = value.ok_or_else(|| {
            PipelineError::ReferenceTable(format!(
                "{} household size {} missing",
                tenure,
                i + 1
            ))
        })?;
    }
    Ok(out)
}
