//! Memoization of trend estimates
//!
//! Raw series do not change within a snapshot's lifetime, so a trend for a
//! given region and as-of date is computed once. The as-of date doubles as
//! the freshness bucket: asking on a later day is a different key, so a
//! warm cache can never serve yesterday's trend for today's question.

use std::sync::{PoisonError, RwLock};

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::trend::TrendEstimate;

/// Cache of trend estimates keyed by region and as-of date
///
/// Cleared explicitly via [`TrendCache::clear`], and dropped wholesale when
/// the owning snapshot is replaced.
#[derive(Debug, Default)]
pub struct TrendCache {
    entries: RwLock<FxHashMap<(String, NaiveDate), TrendEstimate>>,
}

impl TrendCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached estimate
    #[must_use]
    pub fn get(&self, region: &str, as_of: NaiveDate) -> Option<TrendEstimate> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(region.to_string(), as_of))
            .copied()
    }

    /// Store an estimate
    pub fn insert(&self, region: &str, as_of: NaiveDate, estimate: TrendEstimate) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((region.to_string(), as_of), estimate);
    }

    /// Drop every cached estimate
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached estimates
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no estimates
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
