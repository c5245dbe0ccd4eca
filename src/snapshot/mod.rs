//! Engine snapshots
//!
//! A snapshot is the immutable result of one full ingest: the unified
//! tables merged, and every catalog region eagerly extracted, normalized,
//! and aligned. Queries read from the snapshot; reloading builds a whole
//! new snapshot and swaps it in, so readers never observe a half-rebuilt
//! table set. The only interior mutability is the trend memo, which lives
//! inside the snapshot and is dropped with it.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{NaiveDate, Utc};
use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::catalog::{RegionCatalog, RegionSpec};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::series::align::align;
use crate::series::extract::extract;
use crate::series::normalize::normalize;
use crate::series::{AlignedSeries, NormalizedSeries, RegionSeries};
use crate::table::merge::merge_sub_national;
use crate::table::{RawTable, SubRegionTable, parse_date_labels};
use crate::trend::cache::TrendCache;
use crate::trend::{TrendEstimate, estimate};

/// The five already-parsed input tables the engine consumes
#[derive(Debug, Clone)]
pub struct RawSources {
    /// Global cumulative confirmed cases
    pub confirmed: RawTable,
    /// Global cumulative deaths
    pub deaths: RawTable,
    /// Global cumulative recoveries
    pub recovered: RawTable,
    /// Sub-national cumulative confirmed cases
    pub sub_confirmed: SubRegionTable,
    /// Sub-national cumulative deaths (no recovered counterpart exists)
    pub sub_deaths: SubRegionTable,
}

/// Fully derived data for one successfully extracted region
#[derive(Debug, Clone)]
pub struct RegionData {
    /// Cumulative counts, date-indexed
    pub series: RegionSeries,
    /// Counts as a percentage of population
    pub normalized: NormalizedSeries,
    /// Onset-aligned view, or why alignment is unavailable
    pub aligned: Result<AlignedSeries>,
}

/// One catalog region's load outcome within a snapshot
#[derive(Debug, Clone)]
pub struct LoadedRegion {
    /// The catalog entry the region was loaded from
    pub spec: RegionSpec,
    /// Derived data, or the error that made the region unusable
    pub outcome: Result<RegionData>,
}

/// One row of the comparison summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Region name
    pub region: String,
    /// Latest cumulative confirmed count
    pub confirmed_total: u64,
    /// Daily acceleration of confirmed cases, in absolute counts
    pub confirmed_acceleration: i64,
    /// Latest cumulative death count
    pub deaths_total: u64,
    /// Daily acceleration of deaths, in absolute counts
    pub deaths_acceleration: i64,
}

/// Immutable result of one full source ingest
#[derive(Debug)]
pub struct EngineSnapshot {
    config: EngineConfig,
    order: Vec<String>,
    regions: FxHashMap<String, LoadedRegion>,
    trend_cache: TrendCache,
}

impl EngineSnapshot {
    /// Build a snapshot by eagerly running the full pipeline per region
    ///
    /// The three global tables must agree on their date columns and every
    /// date label must parse (both fatal). Synthetic regions are merged
    /// into working copies of the confirmed and deaths tables first. Each
    /// catalog region is then extracted, normalized, and aligned; a
    /// failure for one region is logged and stored but never aborts the
    /// load of the others.
    pub fn load_all(
        sources: &RawSources,
        catalog: &RegionCatalog,
        config: &EngineConfig,
    ) -> Result<Self> {
        if sources.confirmed.date_labels != sources.deaths.date_labels
            || sources.confirmed.date_labels != sources.recovered.date_labels
        {
            return Err(Error::SchemaMismatch(
                "Global metric tables disagree on date columns".to_string(),
            ));
        }
        let dates = parse_date_labels(&sources.confirmed.date_labels, &config.date_formats)?;

        // Merge synthetic regions into working copies of the global
        // tables. Recovered has no sub-national source; the extractor's
        // deaths fallback covers those regions.
        let mut confirmed = sources.confirmed.clone();
        let mut deaths = sources.deaths.clone();
        let mut merge_failures: FxHashMap<String, Error> = FxHashMap::default();
        for spec in catalog.iter().filter(|s| s.from_sub_national) {
            let parent_filter = if spec.sub_region.is_empty() {
                spec.name.as_str()
            } else {
                spec.sub_region.as_str()
            };
            let merged = merge_sub_national(&confirmed, &sources.sub_confirmed, &spec.name, parent_filter)
                .and_then(|c| {
                    merge_sub_national(&deaths, &sources.sub_deaths, &spec.name, parent_filter)
                        .map(|d| (c, d))
                });
            match merged {
                Ok((c, d)) => {
                    confirmed = c;
                    deaths = d;
                }
                Err(e) => {
                    warn!("Merging sub-national data for '{}' failed: {e}", spec.name);
                    merge_failures.insert(spec.name.clone(), e);
                }
            }
        }

        let mut regions = FxHashMap::default();
        for spec in catalog.iter() {
            let outcome = match merge_failures.remove(&spec.name) {
                Some(e) => Err(e),
                None => Self::load_region(
                    spec, &confirmed, &deaths, &sources.recovered, &dates, config,
                ),
            };
            if let Err(e) = &outcome {
                warn!("Region '{}' is unusable: {e}", spec.name);
            }
            regions.insert(
                spec.name.clone(),
                LoadedRegion {
                    spec: spec.clone(),
                    outcome,
                },
            );
        }

        let usable = regions.values().filter(|r| r.outcome.is_ok()).count();
        info!(
            "Loaded snapshot: {usable}/{} regions usable over {} dates",
            regions.len(),
            dates.len()
        );

        Ok(Self {
            config: config.clone(),
            order: catalog.names(),
            regions,
            trend_cache: TrendCache::new(),
        })
    }

    /// Run extract, normalize, and align for a single region
    fn load_region(
        spec: &RegionSpec,
        confirmed: &RawTable,
        deaths: &RawTable,
        recovered: &RawTable,
        dates: &[NaiveDate],
        config: &EngineConfig,
    ) -> Result<RegionData> {
        // Synthetic rows are injected with an empty sub-region, so the
        // spec's sub-region only filters rows for regions read directly
        // from the global tables.
        let sub_region = if spec.from_sub_national {
            ""
        } else {
            spec.sub_region.as_str()
        };
        let series = extract(
            confirmed,
            deaths,
            recovered,
            dates,
            &spec.name,
            sub_region,
            config.log_substitutions,
        )?;
        let normalized = normalize(&series, spec.population);
        let aligned = align(&normalized, config.onset_threshold, &spec.name);
        if let Err(e) = &aligned {
            warn!("Region '{}' excluded from alignment views: {e}", spec.name);
        }
        Ok(RegionData {
            series,
            normalized,
            aligned,
        })
    }

    /// Region names in catalog order
    #[must_use]
    pub fn region_names(&self) -> &[String] {
        &self.order
    }

    /// Look up one region's load outcome
    #[must_use]
    pub fn region(&self, name: &str) -> Option<&LoadedRegion> {
        self.regions.get(name)
    }

    /// Derived data for a region, or the error that made it unusable
    fn region_data(&self, name: &str) -> Result<&RegionData> {
        let loaded = self
            .regions
            .get(name)
            .ok_or_else(|| Error::RegionNotFound(name.to_string()))?;
        match &loaded.outcome {
            Ok(data) => Ok(data),
            Err(e) => Err(e.clone()),
        }
    }

    /// Aligned series for the requested regions, in request order
    ///
    /// A name absent from the catalog fails the whole call with
    /// `RegionNotFound`. A known region whose alignment is unavailable
    /// (e.g. `NoOnsetFound`) occupies its slot with that error, so callers
    /// can flag it while still plotting the rest.
    pub fn aligned_series(&self, names: &[&str]) -> Result<Vec<(String, Result<AlignedSeries>)>> {
        names
            .iter()
            .map(|&name| {
                let loaded = self
                    .regions
                    .get(name)
                    .ok_or_else(|| Error::RegionNotFound(name.to_string()))?;
                let result = loaded
                    .outcome
                    .as_ref()
                    .map_err(Clone::clone)
                    .and_then(|data| data.aligned.clone());
                Ok((name.to_string(), result))
            })
            .collect()
    }

    /// Trend estimate for one region, memoized per (region, as-of date)
    pub fn trend(&self, name: &str, as_of: NaiveDate) -> Result<TrendEstimate> {
        if let Some(cached) = self.trend_cache.get(name, as_of) {
            return Ok(cached);
        }
        let data = self.region_data(name)?;
        let loaded = &self.regions[name];
        let trend = estimate(
            &data.series,
            loaded.spec.population,
            as_of,
            self.config.trend_window_days,
        )?;
        self.trend_cache.insert(name, as_of, trend);
        Ok(trend)
    }

    /// Drop every memoized trend estimate
    ///
    /// Snapshot replacement does this implicitly; this is the explicit
    /// form for callers that keep a snapshot but want fresh fits.
    pub fn invalidate_trends(&self) {
        self.trend_cache.clear();
    }

    /// Summary rows for the requested regions, in request order
    ///
    /// Accelerations are the per-capita gradients multiplied back by
    /// population, truncated to whole daily counts. A region whose trend
    /// window is too short reports zero acceleration rather than failing
    /// the row; its totals are still meaningful.
    pub fn summary(&self, names: &[&str], as_of: NaiveDate) -> Result<Vec<SummaryRow>> {
        names
            .iter()
            .map(|&name| {
                let data = self.region_data(name)?;
                let population = self.regions[name].spec.population as f64;
                let (confirmed_acceleration, deaths_acceleration) = match self.trend(name, as_of) {
                    Ok(trend) => (
                        (trend.confirmed_gradient * population) as i64,
                        (trend.deaths_gradient * population) as i64,
                    ),
                    Err(e) => {
                        warn!("Trend unavailable for '{name}': {e}");
                        (0, 0)
                    }
                };
                Ok(SummaryRow {
                    region: name.to_string(),
                    confirmed_total: data.series.latest_confirmed().unwrap_or(0.0).round() as u64,
                    confirmed_acceleration,
                    deaths_total: data.series.latest_deaths().unwrap_or(0.0).round() as u64,
                    deaths_acceleration,
                })
            })
            .collect()
    }

    /// Summary rows as of today (UTC wall clock)
    pub fn summary_now(&self, names: &[&str]) -> Result<Vec<SummaryRow>> {
        self.summary(names, Utc::now().date_naive())
    }
}

/// Reloadable handle over the current snapshot
///
/// Serving layers share one `Engine`; `reload` builds a complete new
/// snapshot before swapping the reference, so concurrent readers keep the
/// old snapshot until the replacement is whole.
#[derive(Debug)]
pub struct Engine {
    snapshot: RwLock<Arc<EngineSnapshot>>,
}

impl Engine {
    /// Create an engine over an already-built snapshot
    #[must_use]
    pub fn new(snapshot: EngineSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Build the initial snapshot and wrap it in an engine
    pub fn load(
        sources: &RawSources,
        catalog: &RegionCatalog,
        config: &EngineConfig,
    ) -> Result<Self> {
        Ok(Self::new(EngineSnapshot::load_all(sources, catalog, config)?))
    }

    /// The current snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<EngineSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebuild from fresh sources and atomically swap the snapshot in
    ///
    /// The trend memo lives inside the snapshot, so the swap invalidates
    /// it together with the tables. On error the previous snapshot stays
    /// in place untouched.
    pub fn reload(
        &self,
        sources: &RawSources,
        catalog: &RegionCatalog,
        config: &EngineConfig,
    ) -> Result<()> {
        let fresh = EngineSnapshot::load_all(sources, catalog, config)?;
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(fresh);
        Ok(())
    }
}
