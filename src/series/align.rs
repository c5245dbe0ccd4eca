//! Onset alignment
//!
//! Re-indexes a normalized series to "days since local epidemic onset" so
//! regions whose outbreaks started weeks apart can be plotted on one axis.
//! The anchor is data-dependent: the last date whose normalized death rate
//! is still at or below a near-zero threshold.

use crate::error::{Error, Result};
use crate::series::{AlignedSeries, NormalizedSeries};

/// Align a normalized series on its onset date
///
/// The onset date is the chronologically latest date with normalized
/// deaths at or below `threshold`. Rows from that date onward are kept and
/// re-indexed as a dense 0-based day offset, so day 0 is the last
/// pre-outbreak day rather than the first day above the threshold. That
/// inclusive boundary is intentional and matches the original alignment
/// output.
///
/// # Errors
/// `NoOnsetFound` when the series never crosses the threshold in either
/// direction: deaths above the threshold from the first observation (no
/// pre-outbreak day exists), or deaths never rising above it (no outbreak
/// to anchor on). Callers decide whether to drop such regions from
/// comparison views.
pub fn align(series: &NormalizedSeries, threshold: f64, region: &str) -> Result<AlignedSeries> {
    let onset = series
        .deaths
        .iter()
        .rposition(|&d| d <= threshold)
        .ok_or_else(|| Error::NoOnsetFound(region.to_string()))?;
    if onset + 1 == series.len() {
        // Deaths never rose above the threshold
        return Err(Error::NoOnsetFound(region.to_string()));
    }

    Ok(AlignedSeries {
        days: (0..series.len() - onset).collect(),
        dates: series.dates[onset..].to_vec(),
        confirmed: series.confirmed[onset..].to_vec(),
        deaths: series.deaths[onset..].to_vec(),
        recovered: series.recovered[onset..].to_vec(),
    })
}
