//! Property-use code to tenure classification

use ahash::AHashSet;

use crate::core::config::TenureConfig;
use crate::core::types::Tenure;

#[derive(Debug, Clone)]
pub struct TenureClassifier {
    owner: AHashSet<String>,
    renter: AHashSet<String>,
    default: Tenure,
}

impl TenureClassifier {
    pub fn from_config(config: &TenureConfig) -> Self {
        Self {
            owner: config.owner_codes.iter().map(|c| c.trim().to_string()).collect(),
            renter: config.renter_codes.iter().map(|c| c.trim().to_string()).collect(),
            default: config.default,
        }
    }

    pub fn classify(&self, property_use_code: &str) -> Tenure {
        let code = property_use_code.trim();
        if self.owner.contains(code) {
            Tenure::Owner
        } else if self.renter.contains(code) {
            Tenure::Renter
        } else {
            self.default
        }
    }

    /// False when `classify` falls back to the default tenure
    pub fn is_listed(&self, property_use_code: &str) -> bool {
        let code = property_use_code.trim();
        self.owner.contains(code) || self.renter.contains(code)
    }
}

impl Default for TenureClassifier {
    fn default() -> Self {
        Self::from_config(&TenureConfig::default())
    }
}
