//! Input tables and inter-stage masks
//!
//! Every loader here is tolerant at record level: a row that fails to parse
//! becomes a `MalformedRecord` issue and is skipped. Structural problems
//! (missing file, missing header, reference-table integrity) are fatal.

pub mod facility;
pub mod household;
pub mod mask;
pub mod neighbourhood;
pub mod parcel;

pub use facility::{Facility, Provenance};
pub use household::HouseholdSizeDistribution;
pub use neighbourhood::Neighbourhood;
pub use parcel::{Parcel, ParcelTable};

use serde::de::DeserializeOwned;
use std::io::Read;

use crate::core::error::Result;
use crate::core::issues::{DataQualityIssue, IssueLog};

/// Deserialize every row of a headed CSV, keeping the 1-based file line
/// of each row that parsed and recording the ones that did not
pub(crate) fn read_rows<T, R>(reader: R, table: &str, issues: &mut IssueLog) -> Result<Vec<(u64, T)>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                issues.record(DataQualityIssue::MalformedRecord {
                    table: table.to_string(),
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        match record.deserialize::<T>(Some(&headers)) {
            Ok(row) => rows.push((line, row)),
            Err(e) => issues.record(DataQualityIssue::MalformedRecord {
                table: table.to_string(),
                line,
                reason: e.to_string(),
            }),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        name: String,
        count: u32,
    }

    #[test]
    fn test_bad_rows_are_recorded_not_fatal() {
        let csv = "name,count\na,1\nb,lots\nc,3\n";
        let mut issues = IssueLog::new("test");
        let rows: Vec<(u64, Row)> = read_rows(csv.as_bytes(), "rows", &mut issues).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1.name, "a");
        assert_eq!(rows[1].0, 4);
        assert_eq!(rows[1].1.count, 3);
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues.issues[0],
            DataQualityIssue::MalformedRecord { table, line: 3, .. } if table == "rows"
        ));
    }
}
