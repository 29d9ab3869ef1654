//! Master chronology consistency repair.
//!
//! `Event_ID` embeds the event year at characters 2–5 (`E19081023` → 1908).
//! When that disagrees with the year of `Exact_Date`, the identifier is
//! trusted and only the date's year component is rewritten.

use std::path::Path;

use chronicle_types::{DateChange, FixReport};
use tracing::{debug, info};

use crate::date::{with_year, year_part};
use crate::error::Result;
use crate::table::MasterTable;

/// How many individual changes the report keeps.
const SAMPLE_LIMIT: usize = 10;
/// Summary characters kept per logged change.
const SUMMARY_CHARS: usize = 30;

/// Year encoded in an event identifier, if it is four ASCII digits.
fn id_year(event_id: &str) -> Option<String> {
    let year: String = event_id.chars().skip(1).take(4).collect();
    (year.chars().count() == 4 && year.chars().all(|c| c.is_ascii_digit())).then_some(year)
}

fn truncate_summary(summary: &str) -> String {
    let head: String = summary.chars().take(SUMMARY_CHARS).collect();
    format!("{head}...")
}

/// Repair every row in place. Never drops or reorders rows.
pub fn fix_dates(table: &mut MasterTable) -> FixReport {
    let mut changes = Vec::new();

    for index in 0..table.len() {
        let Some(record) = table.record(index) else {
            continue;
        };
        let Some(year) = id_year(record.event_id) else {
            continue;
        };
        if year == year_part(record.exact_date) {
            continue;
        }

        let new_date = with_year(record.exact_date, &year);
        let change = DateChange {
            id: record.event_id.to_string(),
            old: record.exact_date.to_string(),
            new: new_date.clone(),
            summary: truncate_summary(record.summary_text),
        };
        debug!("{}: {} -> {}", change.id, change.old, change.new);
        table.set_exact_date(index, &new_date);
        changes.push(change);
    }

    let total_fixed = changes.len();
    changes.truncate(SAMPLE_LIMIT);
    FixReport {
        status: "success".to_string(),
        total_processed: table.len(),
        total_fixed,
        sample_changes: changes,
    }
}

/// Read the master table, repair it and write it back over the same file.
pub fn fix_file(path: &Path) -> Result<FixReport> {
    let mut table = MasterTable::read(path)?;
    let report = fix_dates(&mut table);
    table.write(path)?;
    info!(
        "Fixed {} of {} rows in {}",
        report.total_fixed,
        report.total_processed,
        path.display()
    );
    Ok(report)
}
