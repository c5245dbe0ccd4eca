//! Error handling for the epidemic engine.

/// Errors that can occur while loading sources or querying an engine snapshot
///
/// The enum is `Clone` because per-region load outcomes are retained inside
/// the snapshot and handed back to callers on demand.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Input tables disagree on their date-column schema
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A catalog entry carries a non-positive population
    #[error("Invalid population for region '{region}': {population}")]
    InvalidPopulation {
        /// Name of the misconfigured region
        region: String,
        /// The offending population figure
        population: u64,
    },

    /// A requested region is absent from the catalog or the source tables
    #[error("Region not found: {0}")]
    RegionNotFound(String),

    /// A region's normalized deaths never satisfied the onset threshold rule
    #[error("No onset found for region '{0}': deaths never at or below threshold")]
    NoOnsetFound(String),

    /// A trend window holds too few (or non-finite) points to fit a slope
    #[error("Insufficient window for trend fit: {0}")]
    InsufficientWindow(String),

    /// A date column label could not be parsed with any configured format
    #[error("Unparseable date label: '{0}'")]
    InvalidDate(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;
