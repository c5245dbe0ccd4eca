//! Per-region series types
//!
//! One typed struct per pipeline stage: the raw cumulative series extracted
//! from the unified tables, its population-normalized counterpart, and the
//! onset-aligned view used for cross-region comparison.

pub mod align;
pub mod extract;
pub mod normalize;

use chrono::NaiveDate;

/// Cumulative counts for one region, indexed by observation date
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSeries {
    /// Observation dates, chronologically ordered
    pub dates: Vec<NaiveDate>,
    /// Cumulative confirmed cases
    pub confirmed: Vec<f64>,
    /// Cumulative deaths
    pub deaths: Vec<f64>,
    /// Cumulative recoveries
    pub recovered: Vec<f64>,
}

impl RegionSeries {
    /// Number of observation dates
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series holds no observations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Latest cumulative confirmed count, if any observations exist
    #[must_use]
    pub fn latest_confirmed(&self) -> Option<f64> {
        self.confirmed.last().copied()
    }

    /// Latest cumulative death count, if any observations exist
    #[must_use]
    pub fn latest_deaths(&self) -> Option<f64> {
        self.deaths.last().copied()
    }
}

/// A region series rescaled to percentage of population
///
/// Same shape and date index as the [`RegionSeries`] it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    /// Observation dates, chronologically ordered
    pub dates: Vec<NaiveDate>,
    /// Confirmed cases as a percentage of population
    pub confirmed: Vec<f64>,
    /// Deaths as a percentage of population
    pub deaths: Vec<f64>,
    /// Recoveries as a percentage of population
    pub recovered: Vec<f64>,
}

impl NormalizedSeries {
    /// Number of observation dates
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series holds no observations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// A normalized series re-indexed to days since local epidemic onset
///
/// Day 0 is the last date whose normalized deaths were still at or below
/// the onset threshold; the calendar date is kept as ordinary data for
/// tooltips and debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    /// Dense 0-based day offsets since onset
    pub days: Vec<usize>,
    /// Original observation dates for the kept rows
    pub dates: Vec<NaiveDate>,
    /// Confirmed cases as a percentage of population
    pub confirmed: Vec<f64>,
    /// Deaths as a percentage of population
    pub deaths: Vec<f64>,
    /// Recoveries as a percentage of population
    pub recovered: Vec<f64>,
}

impl AlignedSeries {
    /// Number of days since onset covered by the series
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the series holds no observations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
