//! Pipeline configuration with documented defaults
//!
//! Loaded from a TOML file; every section and field is optional and falls
//! back to the defaults below, which describe the Winnipeg data layout.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::{PipelineError, Result};
use crate::core::types::Tenure;

/// Top-level configuration for a pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub tenure: TenureConfig,
    pub allocation: AllocationConfig,
    pub proximity: ProximityConfig,
}

/// Where inputs live and where masks and outputs go
///
/// Every input path defaults to a fixed name under `data_root`; set it
/// explicitly to point elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_root: PathBuf,
    pub parcels: Option<PathBuf>,
    pub neighbourhoods: Option<PathBuf>,
    pub household_sizes: Option<PathBuf>,
    pub facilities: Option<PathBuf>,
    /// Offline geocode review decisions; all audited facilities are
    /// accepted as-is when absent
    pub review_ledger: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            parcels: None,
            neighbourhoods: None,
            household_sizes: None,
            facilities: None,
            review_ledger: None,
        }
    }
}

impl PathsConfig {
    pub fn raw_dir(&self) -> PathBuf {
        self.data_root.join("raw")
    }

    pub fn reference_dir(&self) -> PathBuf {
        self.data_root.join("reference")
    }

    pub fn interim_dir(&self) -> PathBuf {
        self.data_root.join("interim")
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.data_root.join("outputs")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.outputs_dir().join("reports")
    }

    pub fn parcels(&self) -> PathBuf {
        self.parcels
            .clone()
            .unwrap_or_else(|| self.raw_dir().join("parcels.csv"))
    }

    pub fn neighbourhoods(&self) -> PathBuf {
        self.neighbourhoods
            .clone()
            .unwrap_or_else(|| self.reference_dir().join("neighbourhoods.json"))
    }

    pub fn household_sizes(&self) -> PathBuf {
        self.household_sizes
            .clone()
            .unwrap_or_else(|| self.reference_dir().join("household_sizes.csv"))
    }

    pub fn facilities(&self) -> PathBuf {
        self.facilities
            .clone()
            .unwrap_or_else(|| self.reference_dir().join("facilities.csv"))
    }

    pub fn neighbourhood_mask(&self) -> PathBuf {
        self.interim_dir().join("parcel_neighbourhood_mask.csv")
    }

    pub fn residents_mask(&self) -> PathBuf {
        self.interim_dir().join("parcel_residents_mask.csv")
    }

    pub fn proximity_mask(&self) -> PathBuf {
        self.interim_dir().join("parcel_nearest_facility_mask.csv")
    }

    pub fn outcomes(&self) -> PathBuf {
        self.outputs_dir().join("parcel_outcomes.csv")
    }

    pub fn colocated(&self) -> PathBuf {
        self.outputs_dir().join("colocated_parcels.csv")
    }

    pub fn issue_report(&self, stage: &str) -> PathBuf {
        self.reports_dir().join(format!("{}_issues.json", stage))
    }

    pub fn classification_report(&self) -> PathBuf {
        self.reports_dir().join("parcel_classification.json")
    }

    pub fn food_desert_summary(&self) -> PathBuf {
        self.reports_dir().join("food_desert_summary.json")
    }
}

/// Property-use code to tenure mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TenureConfig {
    /// Codes treated as owner-occupied
    pub owner_codes: Vec<String>,

    /// Codes treated as renter-occupied
    pub renter_codes: Vec<String>,

    /// Tenure for any code in neither list
    ///
    /// Renter by default: unlisted residential codes in the assessment
    /// roll are mostly mixed-use and institutional buildings.
    pub default: Tenure,
}

impl Default for TenureConfig {
    fn default() -> Self {
        Self {
            owner_codes: [
                "RESSD - DETACHED SINGLE DWELLING",
                "RESSS - SIDE BY SIDE",
                "CNRES - CONDO RESIDENTIAL",
                "RESRH - ROW HOUSING",
                "RESMA - MULTIPLE ATTACHED UNITS",
                "RESDU - DUPLEX",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            renter_codes: [
                "RESAP - APARTMENTS",
                "CNAPT - CONDO APARTMENT",
                "RESAM - APARTMENTS MULTIPLE USE",
                "RESMC - MULTIFAMILY CONVERSION",
                "CMMRH - COMMERCIAL ROW HOUSE",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            default: Tenure::Renter,
        }
    }
}

/// Resident allocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Allowed deviation of a tenure bucket's fractions from 1.0
    ///
    /// Published household tables round each percentage to one decimal,
    /// so five classes can drift by a few tenths of a percent.
    pub fraction_tolerance: f64,

    /// Hard cap on floor-rebalancing rounds per neighbourhood
    ///
    /// `None` means bounded only by the parcel count, which the loop can
    /// never exceed.
    pub max_floor_iterations: Option<usize>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            fraction_tolerance: 1e-3,
            max_floor_iterations: None,
        }
    }
}

/// Nearest-facility settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Distance beyond which a parcel counts as a food-desert parcel (metres)
    pub food_desert_threshold_m: f64,

    /// Geocode review rounds per facility before it is rejected
    pub max_review_attempts: u32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            food_desert_threshold_m: 1000.0,
            max_review_attempts: 3,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, or use defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(code) = self
            .tenure
            .owner_codes
            .iter()
            .find(|c| self.tenure.renter_codes.contains(c))
        {
            return Err(PipelineError::Config(format!(
                "property use code '{}' is listed as both owner and renter",
                code
            )));
        }

        let tol = self.allocation.fraction_tolerance;
        if !(tol > 0.0 && tol <= 0.1) {
            return Err(PipelineError::Config(format!(
                "fraction_tolerance ({}) must be in (0, 0.1]",
                tol
            )));
        }

        if self.allocation.max_floor_iterations == Some(0) {
            return Err(PipelineError::Config(
                "max_floor_iterations must be at least 1".into(),
            ));
        }

        let threshold = self.proximity.food_desert_threshold_m;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(PipelineError::Config(format!(
                "food_desert_threshold_m ({}) must be positive",
                threshold
            )));
        }

        if self.proximity.max_review_attempts == 0 {
            return Err(PipelineError::Config(
                "max_review_attempts must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
