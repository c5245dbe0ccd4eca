//! Population normalization
//!
//! A pure elementwise transform from cumulative counts to percentage of
//! population, so regions of different sizes become comparable.

use crate::series::{NormalizedSeries, RegionSeries};

/// Rescale every metric to a percentage of the region's population
///
/// Elementwise `value / population * 100`. Population validity (strictly
/// positive) is enforced when the catalog is built, not here.
#[must_use]
pub fn normalize(series: &RegionSeries, population: u64) -> NormalizedSeries {
    let scale = |values: &[f64]| -> Vec<f64> {
        values.iter().map(|v| v / population as f64 * 100.0).collect()
    };

    NormalizedSeries {
        dates: series.dates.clone(),
        confirmed: scale(&series.confirmed),
        deaths: scale(&series.deaths),
        recovered: scale(&series.recovered),
    }
}
