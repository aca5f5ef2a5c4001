//! End-to-end pipeline runs over a small synthetic city
//!
//! Two adjoining square neighbourhoods share an edge; a third has census
//! population but no parcels. Neighbourhood 1 has dwelling units [1, 1, 98]
//! with population 1000, neighbourhood 2 the same units with population 10.

use std::fs;
use std::path::Path;

use food_desert::core::config::PipelineConfig;
use food_desert::core::types::{NeighbourhoodId, ParcelId};
use food_desert::data::mask::{read_mask, DistanceStatus, NeighbourhoodMaskRow, ProximityMaskRow, ResidentMaskRow};
use food_desert::pipeline;
use food_desert::report::{ColocatedParcel, ParcelOutcomeRow};

const PARCELS: &str = "\
parcel_id,latitude,longitude,dwelling_units,property_use_code
a,49.82,-97.18,1,RESSD - DETACHED SINGLE DWELLING
b,49.83,-97.17,1,RESSD - DETACHED SINGLE DWELLING
c,49.85,-97.15,98,RESSD - DETACHED SINGLE DWELLING
vacant,49.84,-97.16,,VACANT LAND
outside,50.50,-96.50,2,RESSD - DETACHED SINGLE DWELLING
d,49.82,-97.08,1,RESSD - DETACHED SINGLE DWELLING
e,49.83,-97.07,1,RESSD - DETACHED SINGLE DWELLING
f,49.85,-97.05,98,RESSD - DETACHED SINGLE DWELLING
";

const NEIGHBOURHOODS: &str = r#"[
  {"id": 1, "name": "West", "population": 1000,
   "boundary": [[[[-97.2, 49.8], [-97.1, 49.8], [-97.1, 49.9], [-97.2, 49.9], [-97.2, 49.8]]]]},
  {"id": 2, "name": "East", "population": 10,
   "boundary": [[[[-97.1, 49.8], [-97.0, 49.8], [-97.0, 49.9], [-97.1, 49.9], [-97.1, 49.8]]]]},
  {"id": 3, "name": "Rail Yards", "population": 50,
   "boundary": [[[[-96.9, 49.8], [-96.8, 49.8], [-96.8, 49.9], [-96.9, 49.9], [-96.9, 49.8]]]]}
]"#;

const HOUSEHOLD_SIZES: &str = "\
tenure,household_size,fraction
owner,1,0.224
owner,2,0.378
owner,3,0.154
owner,4,0.152
owner,5,0.092
renter,1,0.503
renter,2,0.292
renter,3,0.106
renter,4,0.060
renter,5,0.039
";

const FACILITIES: &str = "\
facility_id,name,latitude,longitude,provenance
g1,Corner Grocer,49.85,-97.15,audited
g2,Scraped Listing,49.85,-97.05,automated
";

fn seed(root: &Path, facilities: &str) -> PipelineConfig {
    fs::create_dir_all(root.join("raw")).unwrap();
    fs::create_dir_all(root.join("reference")).unwrap();
    fs::write(root.join("raw/parcels.csv"), PARCELS).unwrap();
    fs::write(root.join("reference/neighbourhoods.json"), NEIGHBOURHOODS).unwrap();
    fs::write(root.join("reference/household_sizes.csv"), HOUSEHOLD_SIZES).unwrap();
    fs::write(root.join("reference/facilities.csv"), facilities).unwrap();

    let mut config = PipelineConfig::default();
    config.paths.data_root = root.to_path_buf();
    config
}

fn residents_of(rows: &[ResidentMaskRow], id: &str) -> u64 {
    rows.iter()
        .find(|r| r.parcel_id == ParcelId::new(id))
        .map(|r| r.residents)
        .unwrap()
}

#[test]
fn test_full_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = seed(dir.path(), FACILITIES);

    let (reports, summary) = pipeline::run_all(&config).unwrap();
    assert_eq!(reports.len(), 4);

    // Join: vacant land is not residential, "outside" falls in no polygon
    let join = &reports[0];
    assert_eq!(join.rows, 6);
    assert_eq!(join.issues.count_of("unresolved_parcel"), 1);
    assert_eq!(join.issues.count_of("no_residential_parcels"), 1);
    let mask: Vec<NeighbourhoodMaskRow> = read_mask(&config.paths.neighbourhood_mask()).unwrap();
    assert_eq!(mask.len(), 6);

    // Allocate: proportional in the large neighbourhood, floored in the small
    let residents: Vec<ResidentMaskRow> = read_mask(&config.paths.residents_mask()).unwrap();
    assert_eq!(residents_of(&residents, "a"), 10);
    assert_eq!(residents_of(&residents, "b"), 10);
    assert_eq!(residents_of(&residents, "c"), 980);
    assert_eq!(residents_of(&residents, "d"), 1);
    assert_eq!(residents_of(&residents, "e"), 1);
    assert_eq!(residents_of(&residents, "f"), 8);
    for (hood, population) in [(1, 1000), (2, 10)] {
        let total: u64 = residents
            .iter()
            .filter(|r| r.neighbourhood_id == NeighbourhoodId(hood))
            .map(|r| r.residents)
            .sum();
        assert_eq!(total, population);
    }

    // Proximity: the automated listing is ignored
    assert_eq!(reports[2].issues.count_of("deprecated_facilities"), 1);
    let proximity: Vec<ProximityMaskRow> = read_mask(&config.paths.proximity_mask()).unwrap();
    assert!(proximity.iter().all(|r| r.status == DistanceStatus::Resolved));
    let c = proximity.iter().find(|r| r.parcel_id == ParcelId::new("c")).unwrap();
    assert_eq!(c.distance_m, Some(0.0));

    // Report
    let outcomes: Vec<ParcelOutcomeRow> = read_mask(&config.paths.outcomes()).unwrap();
    assert_eq!(outcomes.len(), 6);
    let deserts: Vec<&str> = outcomes
        .iter()
        .filter(|r| r.food_desert == Some(true))
        .map(|r| r.parcel_id.as_str())
        .collect();
    assert_eq!(deserts, vec!["a", "b", "d", "e", "f"]);
    assert_eq!(summary.total_residents, 1010);
    assert_eq!(summary.desert_residents, 30);

    let colocated: Vec<ColocatedParcel> = read_mask(&config.paths.colocated()).unwrap();
    assert_eq!(colocated.len(), 6);

    for stage in ["join", "allocate", "proximity", "report"] {
        assert!(config.paths.issue_report(stage).exists(), "missing {} report", stage);
    }
    assert!(config.paths.food_desert_summary().exists());
    assert!(config.paths.classification_report().exists());
}

#[test]
fn test_empty_facility_set_leaves_distances_undefined() {
    let dir = tempfile::tempdir().unwrap();
    let config = seed(dir.path(), "facility_id,name,latitude,longitude,provenance\n");

    let (reports, summary) = pipeline::run_all(&config).unwrap();

    assert_eq!(reports[2].issues.count_of("empty_facility_set"), 1);
    let proximity: Vec<ProximityMaskRow> = read_mask(&config.paths.proximity_mask()).unwrap();
    assert_eq!(proximity.len(), 6);
    assert!(proximity
        .iter()
        .all(|r| r.status == DistanceStatus::Undefined && r.distance_m.is_none()));

    assert_eq!(summary.undefined_parcels, 6);
    assert_eq!(summary.desert_residents, 0);
}

#[test]
fn test_stages_rerun_from_masks() {
    let dir = tempfile::tempdir().unwrap();
    let config = seed(dir.path(), FACILITIES);

    pipeline::stage_join(&config).unwrap();
    pipeline::stage_allocate(&config).unwrap();
    let first = fs::read_to_string(config.paths.residents_mask()).unwrap();

    // Allocation reads only the join mask and reference tables, so a rerun
    // is byte-identical
    pipeline::stage_allocate(&config).unwrap();
    let second = fs::read_to_string(config.paths.residents_mask()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_mask_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = seed(dir.path(), FACILITIES);
    assert!(pipeline::stage_allocate(&config).is_err());
}

#[test]
fn test_review_ledger_moves_facility() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = seed(dir.path(), FACILITIES);

    let ledger = dir.path().join("reference/review_ledger.csv");
    fs::write(&ledger, "facility_id,decision,latitude,longitude\ng1,relocate,49.82,-97.08\n").unwrap();
    config.paths.review_ledger = Some(ledger);

    pipeline::run_all(&config).unwrap();
    let proximity: Vec<ProximityMaskRow> = read_mask(&config.paths.proximity_mask()).unwrap();
    let d = proximity.iter().find(|r| r.parcel_id == ParcelId::new("d")).unwrap();
    assert_eq!(d.distance_m, Some(0.0));
}
