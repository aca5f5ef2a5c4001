//! Food Desert - dasymetric resident allocation and grocery access
//!
//! Parcels are joined to census neighbourhoods, each neighbourhood's
//! population is spread over its residential parcels by dwelling units and
//! household size mix, and every parcel is measured to its nearest audited
//! grocery store.

pub mod allocate;
pub mod core;
pub mod data;
pub mod join;
pub mod pipeline;
pub mod proximity;
pub mod report;
pub mod spatial;
