//! Merging sub-national sources into the global tables
//!
//! The sub-national feed is shaped per administrative sub-unit, with extra
//! identifying columns and without a recovered metric. Synthetic regions
//! (e.g. a single state tracked as its own comparison unit) are produced by
//! summing the matching sub-unit rows per date column and reshaping the
//! result to the global table's exact schema before appending it.

use log::debug;

use crate::error::{Error, Result};
use crate::table::{RawRow, RawTable, SubRegionRow, SubRegionTable, parse_count};

/// Aggregate matching sub-national rows and append them to a global table
///
/// Rows whose parent sub-region equals `parent_filter` are summed per date
/// column; cells that do not parse as numbers contribute nothing to the
/// sum. The aggregated row is reshaped to the global schema (no sub-region,
/// region set to `synthetic_label`, coordinates zeroed) and appended after
/// the existing rows, so the returned table's column schema is identical to
/// `global`'s.
///
/// # Arguments
/// * `global` - The global per-metric table to extend
/// * `sub` - The sub-national table for the same metric
/// * `synthetic_label` - Region name for the synthesized row
/// * `parent_filter` - Parent sub-region name to aggregate over
pub fn merge_sub_national(
    global: &RawTable,
    sub: &SubRegionTable,
    synthetic_label: &str,
    parent_filter: &str,
) -> Result<RawTable> {
    let matching: Vec<&SubRegionRow> = sub
        .rows
        .iter()
        .filter(|r| r.province_state == parent_filter)
        .collect();

    debug!(
        "Aggregating {} sub-national rows for '{synthetic_label}' (filter '{parent_filter}')",
        matching.len()
    );

    // Sum per date column, in the global table's column order. The global
    // schema is authoritative: every global date column must exist in the
    // sub-national table, extra sub-national columns are dropped.
    let mut values = Vec::with_capacity(global.date_labels.len());
    for label in &global.date_labels {
        let col = sub
            .date_labels
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| {
                Error::SchemaMismatch(format!(
                    "Date column '{label}' missing from sub-national table"
                ))
            })?;
        let sum: f64 = matching
            .iter()
            .filter_map(|row| row.cells.get(col).and_then(|cell| parse_count(cell)))
            .sum();
        values.push(sum);
    }

    let mut merged = global.clone();
    merged.push_row(RawRow {
        sub_region: String::new(),
        region: synthetic_label.to_string(),
        lat: 0.0,
        long: 0.0,
        values,
    })?;

    Ok(merged)
}
