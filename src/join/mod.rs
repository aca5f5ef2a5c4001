//! Spatial Joiner: residential parcels to their enclosing neighbourhood

mod joiner;

pub use joiner::{join_parcels, join_with_index, JoinOutcome};
