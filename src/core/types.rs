//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Assessment roll number of a parcel
///
/// Kept as a string: roll numbers carry leading zeros that a numeric
/// type would lose.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(pub String);

impl ParcelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParcelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Neighbourhood identifier from the city's neighbourhood layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighbourhoodId(pub u32);

impl fmt::Display for NeighbourhoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Grocery facility identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub String);

impl FacilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic coordinate in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both components are finite and inside the lat/lon domain
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// geo uses x = longitude, y = latitude
    pub fn to_point(self) -> geo_types::Point<f64> {
        geo_types::Point::new(self.lon, self.lat)
    }
}

impl From<geo_types::Point<f64>> for GeoPoint {
    fn from(p: geo_types::Point<f64>) -> Self {
        Self { lat: p.y(), lon: p.x() }
    }
}

/// Occupancy tenure of a residential parcel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tenure {
    Owner,
    Renter,
}

impl Tenure {
    pub const ALL: [Tenure; 2] = [Tenure::Owner, Tenure::Renter];

    pub fn label(&self) -> &'static str {
        match self {
            Tenure::Owner => "owner",
            Tenure::Renter => "renter",
        }
    }
}

impl fmt::Display for Tenure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Household size class, 1 through 5 where 5 means "five or more"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SizeClass(u8);

impl SizeClass {
    pub const COUNT: usize = 5;

    pub fn new(persons: u8) -> Option<Self> {
        (1..=Self::COUNT as u8).contains(&persons).then_some(Self(persons))
    }

    pub fn all() -> impl Iterator<Item = SizeClass> {
        (1..=Self::COUNT as u8).map(SizeClass)
    }

    /// Persons counted for the class; the open-ended top class counts as 5
    pub fn persons(&self) -> f64 {
        self.0 as f64
    }

    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(49.9, -97.1).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn test_point_axis_order() {
        let p = GeoPoint::new(49.9, -97.1).to_point();
        assert_eq!(p.x(), -97.1);
        assert_eq!(p.y(), 49.9);
        assert_eq!(GeoPoint::from(p), GeoPoint::new(49.9, -97.1));
    }

    #[test]
    fn test_size_class_bounds() {
        assert!(SizeClass::new(0).is_none());
        assert!(SizeClass::new(6).is_none());
        assert_eq!(SizeClass::all().count(), 5);
        assert_eq!(SizeClass::new(5).map(|c| c.index()), Some(4));
    }
}
