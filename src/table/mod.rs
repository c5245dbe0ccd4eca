//! Typed long-form tables for raw epidemic sources
//!
//! Each pipeline stage works on an explicit typed table rather than a
//! generic dataframe: the global per-metric table ([`RawTable`]) and the
//! differently-shaped sub-national table ([`SubRegionTable`]). Cell-level
//! parsing of the sub-national sources is an explicit parse-or-skip
//! function, so sparse or placeholder cells are excluded from aggregation
//! instead of failing it.

pub mod merge;

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// One row of a global per-metric table
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// Sub-region name; empty for the national aggregate row
    pub sub_region: String,
    /// Region (country) name
    pub region: String,
    /// Latitude of the row's representative point
    pub lat: f64,
    /// Longitude of the row's representative point
    pub long: f64,
    /// Cumulative counts, one per date column
    pub values: Vec<f64>,
}

/// Long-form global table for exactly one metric
///
/// One row per (region, optional sub-region), one column per observation
/// date. Counts are cumulative.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Date column labels, chronologically ordered
    pub date_labels: Vec<String>,
    /// Data rows
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Create an empty table over the given date columns
    #[must_use]
    pub fn new(date_labels: Vec<String>) -> Self {
        Self {
            date_labels,
            rows: Vec::new(),
        }
    }

    /// Append a row, enforcing that its width matches the date columns
    pub fn push_row(&mut self, row: RawRow) -> Result<()> {
        if row.values.len() != self.date_labels.len() {
            return Err(Error::SchemaMismatch(format!(
                "Row for '{}' has {} values but the table has {} date columns",
                row.region,
                row.values.len(),
                self.date_labels.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Rows matching a region and sub-region filter exactly
    ///
    /// An empty `sub_region` selects the national aggregate row, not a
    /// wildcard.
    pub fn select(&self, region: &str, sub_region: &str) -> Vec<&RawRow> {
        self.rows
            .iter()
            .filter(|r| r.region == region && r.sub_region == sub_region)
            .collect()
    }
}

/// One row of a sub-national table, keyed by administrative sub-unit
#[derive(Debug, Clone, PartialEq)]
pub struct SubRegionRow {
    /// Unique unit identifier
    pub uid: String,
    /// Two-letter country code
    pub iso2: String,
    /// Three-letter country code
    pub iso3: String,
    /// Numeric country code
    pub code3: String,
    /// Administrative unit code
    pub fips: String,
    /// Sub-unit (county/district) name
    pub admin2: String,
    /// Parent sub-region (state/province) name
    pub province_state: String,
    /// Country name
    pub country_region: String,
    /// Latitude of the unit
    pub lat: f64,
    /// Longitude of the unit
    pub long: f64,
    /// Raw cumulative-count cells, one per date column; parsed per-cell
    pub cells: Vec<String>,
}

/// Sub-national table for one metric, one row per administrative sub-unit
#[derive(Debug, Clone, PartialEq)]
pub struct SubRegionTable {
    /// Date column labels, chronologically ordered
    pub date_labels: Vec<String>,
    /// Data rows
    pub rows: Vec<SubRegionRow>,
}

impl SubRegionTable {
    /// Create an empty table over the given date columns
    #[must_use]
    pub fn new(date_labels: Vec<String>) -> Self {
        Self {
            date_labels,
            rows: Vec::new(),
        }
    }
}

/// Parse a single count cell, skipping anything non-numeric
///
/// This is the explicit form of the "unparseable cells contribute nothing"
/// aggregation policy: blank, placeholder, or malformed cells yield `None`
/// and are excluded from sums rather than raising an error.
#[must_use]
pub fn parse_count(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a date column label, trying each configured format in order
pub fn parse_date_label(label: &str, formats: &[String]) -> Result<NaiveDate> {
    for format in formats {
        if let Ok(date) = NaiveDate::parse_from_str(label, format) {
            return Ok(date);
        }
    }
    Err(Error::InvalidDate(label.to_string()))
}

/// Parse every date label of a table's schema into calendar dates
pub fn parse_date_labels(labels: &[String], formats: &[String]) -> Result<Vec<NaiveDate>> {
    labels
        .iter()
        .map(|label| parse_date_label(label, formats))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_parse_count_accepts_numbers() {
        assert_eq!(parse_count("42"), Some(42.0));
        assert_eq!(parse_count(" 3.5 "), Some(3.5));
        assert_eq!(parse_count("0"), Some(0.0));
    }

    #[test]
    fn test_parse_count_skips_non_numeric() {
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("  "), None);
        assert_eq!(parse_count("n/a"), None);
        assert_eq!(parse_count("NaN"), None);
        assert_eq!(parse_count("inf"), None);
    }

    #[test]
    fn test_parse_date_label_formats() {
        let formats = EngineConfig::default().date_formats;
        assert_eq!(
            parse_date_label("1/22/20", &formats).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 22).unwrap()
        );
        assert_eq!(
            parse_date_label("2020-03-01", &formats).unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
        );
        assert!(parse_date_label("not-a-date", &formats).is_err());
    }

    #[test]
    fn test_push_row_width_mismatch() {
        let mut table = RawTable::new(vec!["1/22/20".to_string(), "1/23/20".to_string()]);
        let row = RawRow {
            sub_region: String::new(),
            region: "Norway".to_string(),
            lat: 0.0,
            long: 0.0,
            values: vec![1.0],
        };
        assert!(matches!(
            table.push_row(row),
            Err(crate::error::Error::SchemaMismatch(_))
        ));
    }
}
