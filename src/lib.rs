//! A Rust library for aligning and comparing epidemic time series across
//! regions, with population normalization and short-window trend
//! (acceleration) estimation.

pub mod catalog;
pub mod config;
pub mod error;
pub mod series;
pub mod snapshot;
pub mod table;
pub mod trend;

// Re-export the most common types for easier use
// Core types
pub use catalog::{RegionCatalog, RegionSpec};
pub use config::EngineConfig;
pub use error::{Error, Result};

// Tables and series
pub use series::{AlignedSeries, NormalizedSeries, RegionSeries};
pub use table::{RawRow, RawTable, SubRegionRow, SubRegionTable};

// Snapshot surface
pub use snapshot::{Engine, EngineSnapshot, LoadedRegion, RawSources, RegionData, SummaryRow};

// Trend estimation
pub use trend::{TrendEstimate, estimate, linear_fit};
