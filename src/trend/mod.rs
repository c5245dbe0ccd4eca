//! Short-horizon trend estimation
//!
//! Estimates the acceleration of an epidemic metric: the daily rate of
//! change of new daily counts, obtained from an ordinary least-squares
//! line fitted over a short trailing window of first differences and
//! expressed per capita.

pub mod cache;

use chrono::{Duration, NaiveDate};
use itertools::Itertools;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::series::RegionSeries;

/// Per-capita daily acceleration of confirmed cases and deaths
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendEstimate {
    /// Slope of daily new confirmed cases, as a fraction of population
    pub confirmed_gradient: f64,
    /// Slope of daily new deaths, as a fraction of population
    pub deaths_gradient: f64,
}

/// Fit a degree-1 polynomial over `ys` with x = 0..n-1
///
/// Returns `(slope, intercept)`. Requires at least two points; the caller
/// enforces that.
#[must_use]
pub fn linear_fit(ys: &[f64]) -> (f64, f64) {
    let n = ys.len() as f64;
    let sum_x: f64 = (n - 1.0) * n / 2.0;
    let sum_x2: f64 = (0..ys.len()).map(|x| (x * x) as f64).sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = ys.iter().enumerate().map(|(x, y)| x as f64 * y).sum();

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

/// Windowed daily increments of one cumulative metric
///
/// The first observation has no increment. Only increments dated strictly
/// after `as_of - window_days` are kept.
fn windowed_increments(
    dates: &[NaiveDate],
    values: &[f64],
    as_of: NaiveDate,
    window_days: i64,
) -> Vec<f64> {
    let cutoff = as_of - Duration::days(window_days);
    dates
        .iter()
        .zip(values.iter())
        .tuple_windows()
        .filter(|(_, (date, _))| **date > cutoff)
        .map(|((_, prev), (_, curr))| curr - prev)
        .collect()
}

/// Slope of the windowed daily increments, per capita
fn metric_gradient(
    dates: &[NaiveDate],
    values: &[f64],
    population: u64,
    as_of: NaiveDate,
    window_days: i64,
    metric: &str,
) -> Result<f64> {
    let increments = windowed_increments(dates, values, as_of, window_days);
    if increments.len() < 2 {
        return Err(Error::InsufficientWindow(format!(
            "{metric}: {} increment(s) in the {window_days}-day window ending {as_of}",
            increments.len()
        )));
    }
    if increments.iter().any(|v| !v.is_finite()) {
        return Err(Error::InsufficientWindow(format!(
            "{metric}: non-finite increment in the window ending {as_of}"
        )));
    }

    let (slope, _) = linear_fit(&increments);
    Ok(slope / population as f64)
}

/// Estimate the per-capita acceleration of confirmed cases and deaths
///
/// For each metric, the cumulative series is first-differenced into daily
/// new counts, restricted to the trailing window ending at `as_of`, and
/// fitted with an ordinary least-squares line; the slope divided by
/// population is the acceleration.
///
/// # Errors
/// `InsufficientWindow` when fewer than two increments fall inside the
/// window, or any increment is non-finite: a slope is undefined there and
/// must not be silently reported as zero.
pub fn estimate(
    series: &RegionSeries,
    population: u64,
    as_of: NaiveDate,
    window_days: i64,
) -> Result<TrendEstimate> {
    let confirmed_gradient = metric_gradient(
        &series.dates,
        &series.confirmed,
        population,
        as_of,
        window_days,
        "confirmed",
    )?;
    let deaths_gradient = metric_gradient(
        &series.dates,
        &series.deaths,
        population,
        as_of,
        window_days,
        "deaths",
    )?;

    Ok(TrendEstimate {
        confirmed_gradient,
        deaths_gradient,
    })
}
