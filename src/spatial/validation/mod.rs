//! Geometry validation for the neighbourhood layer

mod composite;
mod geometric;

pub use composite::{LayerValidator, ValidationReport};
pub use geometric::GeometricValidator;

use std::fmt;

/// Validation error types
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyGeometry,
    InsufficientVertices { polygon: usize, count: usize, minimum: usize },
    NonFiniteCoordinate { polygon: usize },
    SelfIntersecting { polygon: usize, description: String },
    ZeroArea,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGeometry => write!(f, "empty geometry"),
            Self::InsufficientVertices {
                polygon,
                count,
                minimum,
            } => write!(
                f,
                "polygon {} ring has {} distinct vertices, need {}",
                polygon, count, minimum
            ),
            Self::NonFiniteCoordinate { polygon } => {
                write!(f, "polygon {} has a non-finite coordinate", polygon)
            }
            Self::SelfIntersecting {
                polygon,
                description,
            } => write!(f, "polygon {} self-intersects: {}", polygon, description),
            Self::ZeroArea => write!(f, "geometry has zero area"),
        }
    }
}
