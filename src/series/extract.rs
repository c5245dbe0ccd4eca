//! Region series extraction
//!
//! Selects one region's rows from the three unified metric tables and
//! pivots the date columns into a single date-indexed series with one
//! column per metric.

use chrono::NaiveDate;
use log::warn;

use crate::error::{Error, Result};
use crate::series::RegionSeries;
use crate::table::RawTable;

/// Select a region's values from one unified metric table
///
/// Returns `None` when no row matches. If more than one row matches, the
/// first is used; duplicates are a feed anomaly the caller cannot act on.
fn select_metric(table: &RawTable, region: &str, sub_region: &str, metric: &str) -> Option<Vec<f64>> {
    let rows = table.select(region, sub_region);
    match rows.len() {
        0 => None,
        n => {
            if n > 1 {
                warn!("{n} {metric} rows match region '{region}' / '{sub_region}', using the first");
            }
            Some(rows[0].values.clone())
        }
    }
}

/// Extract one region's three-metric cumulative series
///
/// Row selection requires both the region and the sub-region column to
/// match exactly; an empty sub-region filter selects the national aggregate
/// row. Confirmed and deaths are mandatory (`RegionNotFound` if absent).
/// A missing recovered row is a known gap for synthetic regions and is
/// substituted with the deaths series, a deliberate approximation carried
/// over from the source data rather than an error.
///
/// # Arguments
/// * `confirmed`, `deaths`, `recovered` - The unified per-metric tables
/// * `dates` - Parsed calendar dates for the shared date columns
/// * `region` - Region name to select
/// * `sub_region` - Sub-region filter; empty for the national row
/// * `log_substitutions` - Whether to log the recovered-series fallback
pub fn extract(
    confirmed: &RawTable,
    deaths: &RawTable,
    recovered: &RawTable,
    dates: &[NaiveDate],
    region: &str,
    sub_region: &str,
    log_substitutions: bool,
) -> Result<RegionSeries> {
    let confirmed_values = select_metric(confirmed, region, sub_region, "confirmed")
        .ok_or_else(|| Error::RegionNotFound(format!("{region} (confirmed)")))?;
    let deaths_values = select_metric(deaths, region, sub_region, "deaths")
        .ok_or_else(|| Error::RegionNotFound(format!("{region} (deaths)")))?;

    // Some regions (notably sub-nationally aggregated ones) have no
    // recovered source at all; the deaths series stands in for it.
    let recovered_values = match select_metric(recovered, region, sub_region, "recovered") {
        Some(values) => values,
        None => {
            if log_substitutions {
                warn!("No recovered data for region '{region}', substituting deaths");
            }
            deaths_values.clone()
        }
    };

    Ok(RegionSeries {
        dates: dates.to_vec(),
        confirmed: confirmed_values,
        deaths: deaths_values,
        recovered: recovered_values,
    })
}
