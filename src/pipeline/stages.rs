use std::path::Path;

use crate::allocate::{ResidentAllocator, TenureClassifier};
use crate::core::config::PipelineConfig;
use crate::core::error::Result;
use crate::core::issues::IssueLog;
use crate::data::mask::{read_mask, write_mask, NeighbourhoodMaskRow, ProximityMaskRow, ResidentMaskRow};
use crate::data::{facility, neighbourhood, HouseholdSizeDistribution, ParcelTable};
use crate::join::join_parcels;
use crate::proximity::{audit_facilities, nearest_facilities, AcceptAll, ReviewLedger};
use crate::report::{aggregate_colocated, join_outcomes, ClassificationReport, FoodDesertSummary};

/// What one stage produced
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: &'static str,
    pub rows: usize,
    pub issues: IssueLog,
}

impl StageReport {
    pub fn summary(&self) -> String {
        let mut out = format!("{}: {} rows, {} issues", self.stage, self.rows, self.issues.len());
        for (kind, n) in self.issues.counts() {
            out.push_str(&format!("\n  {}: {}", kind, n));
        }
        out
    }
}

fn finish(config: &PipelineConfig, stage: &'static str, rows: usize, issues: IssueLog) -> Result<StageReport> {
    issues.write_json(&config.paths.issue_report(stage))?;
    tracing::info!("Stage {} done: {} rows, {} issues", stage, rows, issues.len());
    Ok(StageReport { stage, rows, issues })
}

/// Reload the parcel table for a later stage. Row problems were already
/// reported by the join stage, so they only go to the debug log here.
fn reload_parcels(path: &Path) -> Result<ParcelTable> {
    let mut scratch = IssueLog::new("reload");
    let parcels = ParcelTable::load(path, &mut scratch)?;
    if !scratch.is_empty() {
        tracing::debug!("Skipped {} parcel rows on reload", scratch.len());
    }
    Ok(parcels)
}

/// Assign each parcel to the neighbourhood containing its centroid
pub fn stage_join(config: &PipelineConfig) -> Result<StageReport> {
    let paths = &config.paths;
    let mut issues = IssueLog::new("join");

    let parcels = ParcelTable::load(&paths.parcels(), &mut issues)?;
    let neighbourhoods = neighbourhood::load_neighbourhoods(&paths.neighbourhoods())?;

    let outcome = join_parcels(&parcels, &neighbourhoods);
    issues.extend(outcome.issues);
    write_mask(&paths.neighbourhood_mask(), &outcome.rows)?;

    finish(config, "join", outcome.rows.len(), issues)
}

/// Split each neighbourhood's population over its residential parcels
pub fn stage_allocate(config: &PipelineConfig) -> Result<StageReport> {
    let paths = &config.paths;

    let mask: Vec<NeighbourhoodMaskRow> = read_mask(&paths.neighbourhood_mask())?;
    let parcels = reload_parcels(&paths.parcels())?;
    let distribution =
        HouseholdSizeDistribution::load(&paths.household_sizes(), config.allocation.fraction_tolerance)?;

    let classifier = TenureClassifier::from_config(&config.tenure);
    ClassificationReport::build(&parcels, &classifier).write_json(&paths.classification_report())?;

    let allocator = ResidentAllocator::new(&distribution, classifier)
        .with_max_rounds(config.allocation.max_floor_iterations);
    let outcome = allocator.allocate(&mask, &parcels)?;
    write_mask(&paths.residents_mask(), &outcome.rows)?;

    finish(config, "allocate", outcome.rows.len(), outcome.issues)
}

/// Distance from each residential parcel to its nearest audited facility
pub fn stage_proximity(config: &PipelineConfig) -> Result<StageReport> {
    let paths = &config.paths;
    let mut issues = IssueLog::new("proximity");

    let residents: Vec<ResidentMaskRow> = read_mask(&paths.residents_mask())?;
    let parcels = reload_parcels(&paths.parcels())?;
    let facilities = facility::load_facilities(&paths.facilities(), &mut issues)?;

    let attempts = config.proximity.max_review_attempts;
    let accepted = match &paths.review_ledger {
        Some(path) => {
            let mut ledger = ReviewLedger::load(path, &mut issues)?;
            audit_facilities(facilities, &mut ledger, attempts, &mut issues)
        }
        None => audit_facilities(facilities, &mut AcceptAll, attempts, &mut issues),
    };

    let outcome = nearest_facilities(&residents, &parcels, &accepted);
    issues.extend(outcome.issues);
    write_mask(&paths.proximity_mask(), &outcome.rows)?;

    finish(config, "proximity", outcome.rows.len(), issues)
}

/// Final per-parcel outcomes, co-located parcel groups and the summary
pub fn stage_report(config: &PipelineConfig) -> Result<(StageReport, FoodDesertSummary)> {
    let paths = &config.paths;
    let threshold_m = config.proximity.food_desert_threshold_m;
    let mut issues = IssueLog::new("report");

    let residents: Vec<ResidentMaskRow> = read_mask(&paths.residents_mask())?;
    let proximity: Vec<ProximityMaskRow> = read_mask(&paths.proximity_mask())?;
    let parcels = reload_parcels(&paths.parcels())?;

    let outcomes = join_outcomes(&residents, &proximity, threshold_m);
    write_mask(&paths.outcomes(), &outcomes)?;

    let colocated = aggregate_colocated(&residents, &parcels, &mut issues);
    write_mask(&paths.colocated(), &colocated)?;

    let summary = FoodDesertSummary::from_outcomes(&outcomes, threshold_m);
    summary.write_json(&paths.food_desert_summary())?;

    let report = finish(config, "report", outcomes.len(), issues)?;
    Ok((report, summary))
}

/// Run every stage in order
pub fn run_all(config: &PipelineConfig) -> Result<(Vec<StageReport>, FoodDesertSummary)> {
    let mut reports = vec![stage_join(config)?, stage_allocate(config)?, stage_proximity(config)?];
    let (report, summary) = stage_report(config)?;
    reports.push(report);
    Ok((reports, summary))
}
