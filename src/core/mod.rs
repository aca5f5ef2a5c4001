pub mod config;
pub mod error;
pub mod issues;
pub mod types;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use issues::{DataQualityIssue, IssueLog};
