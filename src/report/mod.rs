//! Final outputs built from the stage masks

mod classification;
mod colocation;
mod outcomes;
mod summary;

pub use classification::{ClassificationReport, CodeClassification, TenureTotals};
pub use colocation::{aggregate_colocated, ColocatedParcel};
pub use outcomes::{join_outcomes, ParcelOutcomeRow};
pub use summary::{FoodDesertSummary, NeighbourhoodSummary};
