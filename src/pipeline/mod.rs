//! Stage orchestration
//!
//! Each stage reads its inputs from the configured paths, writes exactly
//! one mask (or the final outputs) plus an issue report, and hands nothing
//! else to the next stage. Any stage can be rerun on its own as long as
//! the masks it reads are on disk.

mod stages;

pub use stages::{run_all, stage_allocate, stage_join, stage_proximity, stage_report, StageReport};
