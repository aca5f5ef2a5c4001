//! Neighbourhood polygons with their census population

use ahash::AHashSet;
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::core::error::{PipelineError, Result};
use crate::core::types::NeighbourhoodId;

/// Administrative neighbourhood; read-only ground truth
#[derive(Debug, Clone)]
pub struct Neighbourhood {
    pub id: NeighbourhoodId,
    pub name: String,
    pub boundary: MultiPolygon<f64>,
    /// Authoritative census population
    pub population: u64,
}

/// On-disk shape: boundary is polygons -> rings -> [lon, lat], first ring
/// of each polygon exterior, the rest holes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighbourhoodRecord {
    pub id: u32,
    pub name: String,
    pub population: u64,
    pub boundary: Vec<Vec<Vec<[f64; 2]>>>,
}

impl From<NeighbourhoodRecord> for Neighbourhood {
    fn from(record: NeighbourhoodRecord) -> Self {
        let polygons = record
            .boundary
            .into_iter()
            .filter_map(|rings| {
                let mut rings = rings.into_iter().map(to_line_string);
                let exterior = rings.next()?;
                Some(Polygon::new(exterior, rings.collect()))
            })
            .collect();

        Self {
            id: NeighbourhoodId(record.id),
            name: record.name,
            boundary: MultiPolygon(polygons),
            population: record.population,
        }
    }
}

fn to_line_string(ring: Vec<[f64; 2]>) -> LineString<f64> {
    LineString(ring.into_iter().map(|[x, y]| Coord { x, y }).collect())
}

pub fn load_neighbourhoods_from_reader<R: Read>(reader: R) -> Result<Vec<Neighbourhood>> {
    let records: Vec<NeighbourhoodRecord> = serde_json::from_reader(reader)?;

    let mut seen = AHashSet::new();
    for record in &records {
        if !seen.insert(record.id) {
            return Err(PipelineError::ReferenceTable(format!(
                "neighbourhood id {} appears more than once",
                record.id
            )));
        }
    }

    let neighbourhoods: Vec<Neighbourhood> = records.into_iter().map(Neighbourhood::from).collect();
    tracing::info!(
        "Loaded {} neighbourhoods (census population {})",
        neighbourhoods.len(),
        neighbourhoods.iter().map(|n| n.population).sum::<u64>()
    );
    Ok(neighbourhoods)
}

pub fn load_neighbourhoods(path: &Path) -> Result<Vec<Neighbourhood>> {
    let file = std::fs::File::open(path)?;
    load_neighbourhoods_from_reader(std::io::BufReader::new(file))
}
