//! Configuration for the epidemic engine.

/// Configuration for snapshot loading and derived-series computation
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Onset threshold on normalized deaths, in percentage-of-population
    /// units. The last date at or below this value anchors day zero.
    pub onset_threshold: f64,
    /// Length of the trailing window for trend estimation, in days
    pub trend_window_days: i64,
    /// List of date formats to try when parsing date column labels
    pub date_formats: Vec<String>,
    /// Log substituted series (e.g. deaths standing in for recovered)
    pub log_substitutions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            onset_threshold: 0.0001,
            trend_window_days: 8,
            date_formats: vec![
                "%m/%d/%y".to_string(), // Feed convention: 1/22/20
                "%Y-%m-%d".to_string(), // ISO format: 2020-01-22
                "%m/%d/%Y".to_string(), // US with full year: 01/22/2020
            ],
            log_substitutions: true,
        }
    }
}
