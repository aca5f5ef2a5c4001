//! Raw expected population from household size mixes

use crate::core::types::{SizeClass, Tenure};
use crate::data::HouseholdSizeDistribution;

fn bucket(tenure: Tenure) -> usize {
    match tenure {
        Tenure::Owner => 0,
        Tenure::Renter => 1,
    }
}

/// Expected persons in one neighbourhood, broken down by tenure bucket and
/// household size class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenureExpectation {
    dwelling_units: [u64; 2],
    persons: [[f64; SizeClass::COUNT]; 2],
}

impl TenureExpectation {
    /// Apply each bucket's size mix to that bucket's total dwelling units
    pub fn for_parcels<I>(parcels: I, distribution: &HouseholdSizeDistribution) -> Self
    where
        I: IntoIterator<Item = (Tenure, u32)>,
    {
        let mut expectation = Self::default();
        for (tenure, units) in parcels {
            expectation.dwelling_units[bucket(tenure)] += units as u64;
        }
        for tenure in Tenure::ALL {
            let units = expectation.dwelling_units[bucket(tenure)] as f64;
            expectation.persons[bucket(tenure)] = distribution.expected_persons(tenure, units);
        }
        expectation
    }

    pub fn dwelling_units(&self, tenure: Tenure) -> u64 {
        self.dwelling_units[bucket(tenure)]
    }

    pub fn persons(&self, tenure: Tenure, class: SizeClass) -> f64 {
        self.persons[bucket(tenure)][class.index()]
    }

    pub fn bucket_total(&self, tenure: Tenure) -> f64 {
        self.persons[bucket(tenure)].iter().sum()
    }

    pub fn total(&self) -> f64 {
        Tenure::ALL.iter().map(|t| self.bucket_total(*t)).sum()
    }

    /// A parcel's raw expected population: its dwelling-unit share of its
    /// tenure bucket's expected persons
    pub fn parcel_raw(&self, tenure: Tenure, dwelling_units: u32) -> f64 {
        let bucket_units = self.dwelling_units(tenure);
        if bucket_units == 0 {
            return 0.0;
        }
        self.bucket_total(tenure) * dwelling_units as f64 / bucket_units as f64
    }
}
