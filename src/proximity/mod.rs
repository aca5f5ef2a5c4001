//! Proximity Engine: great-circle distance from each residential parcel to
//! the nearest audited grocery facility

pub mod audit;
mod engine;

pub use audit::{audit_facilities, AcceptAll, GeocodeReview, ReviewDecision, ReviewLedger};
pub use engine::{nearest_facilities, nearest_with_index, ProximityOutcome};
