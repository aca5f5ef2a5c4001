//! Resident Allocator
//!
//! Dasymetric disaggregation of neighbourhood census population down to
//! residential parcels:
//! 1. classify each parcel's tenure from its property-use code
//! 2. expected persons per tenure bucket and household size class, shared
//!    out to parcels by dwelling units
//! 3. scale to the census total, flooring every parcel at one resident and
//!    rescaling the rest until no parcel is below the floor
//! 4. largest-remainder rounding so integer totals match exactly

pub mod allocator;
pub mod expectation;
pub mod floor;
pub mod tenure;

pub use allocator::{verify_allocation, AllocationOutcome, ResidentAllocator};
pub use expectation::TenureExpectation;
pub use floor::{allocate_with_floor, FloorAllocation};
pub use tenure::TenureClassifier;

use thiserror::Error;

/// Failures of the pure floor-constrained allocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("no parcels to allocate to")]
    EmptyInput,

    #[error("weight {weight} at parcel {index} is not a positive finite number")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("population {population} cannot give {parcels} parcels one resident each")]
    InfeasibleTarget { population: u64, parcels: usize },

    #[error("floor rebalancing did not settle within {rounds} rounds")]
    NotConverged { rounds: usize },

    #[error("allocated {allocated} residents, expected {expected}")]
    ConservationDrift { expected: u64, allocated: u64 },

    #[error("parcel {index} allocated {residents} residents, below the floor of 1")]
    FloorViolated { index: usize, residents: u64 },
}
