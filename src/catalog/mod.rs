//! Region catalog for the epidemic engine
//!
//! The catalog is the static registry of trackable regions, each with a
//! population figure and an optional sub-region filter. It is the single
//! source of truth for the metadata consumed by normalization and series
//! extraction, and is immutable once validated.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single trackable region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Unique region name, matched against the region column of the sources
    pub name: String,
    /// Population used for per-capita normalization
    pub population: u64,
    /// Sub-region filter; empty selects the national aggregate row
    #[serde(default)]
    pub sub_region: String,
    /// Whether this region is synthesized from the sub-national tables
    #[serde(default)]
    pub from_sub_national: bool,
}

impl RegionSpec {
    /// Create a national-level region spec
    #[must_use]
    pub fn new(name: &str, population: u64) -> Self {
        Self {
            name: name.to_string(),
            population,
            sub_region: String::new(),
            from_sub_national: false,
        }
    }

    /// Restrict the region to a single sub-region row of the global tables
    #[must_use]
    pub fn with_sub_region(mut self, sub_region: &str) -> Self {
        self.sub_region = sub_region.to_string();
        self
    }

    /// Mark the region as aggregated out of the sub-national tables
    #[must_use]
    pub fn from_sub_national(mut self) -> Self {
        self.from_sub_national = true;
        self
    }
}

/// Ordered, validated registry of region specs
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    specs: Vec<RegionSpec>,
    index: FxHashMap<String, usize>,
}

impl RegionCatalog {
    /// Build a catalog from a list of specs
    ///
    /// Validates every population up front; a non-positive population is a
    /// configuration error rejected here rather than at normalization time.
    pub fn new(specs: Vec<RegionSpec>) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (i, spec) in specs.iter().enumerate() {
            if spec.population == 0 {
                return Err(Error::InvalidPopulation {
                    region: spec.name.clone(),
                    population: spec.population,
                });
            }
            index.insert(spec.name.clone(), i);
        }
        Ok(Self { specs, index })
    }

    /// Build a catalog from a JSON array of region specs
    pub fn from_json(json: &str) -> Result<Self> {
        let specs: Vec<RegionSpec> = serde_json::from_str(json)
            .map_err(|e| Error::SchemaMismatch(format!("Invalid catalog JSON: {e}")))?;
        Self::new(specs)
    }

    /// Look up a region spec by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegionSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    /// Iterate over the specs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &RegionSpec> {
        self.specs.iter()
    }

    /// Region names in catalog order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.name.clone()).collect()
    }

    /// Number of regions in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for RegionCatalog {
    /// The catalog used by the original deployment: sixteen regions with
    /// their census populations, China restricted to Hubei, and New York
    /// aggregated from the sub-national tables.
    fn default() -> Self {
        let specs = vec![
            RegionSpec::new("United Kingdom", 66_440_000),
            RegionSpec::new("France", 66_990_000),
            RegionSpec::new("Germany", 82_790_000),
            RegionSpec::new("Spain", 46_660_000),
            RegionSpec::new("Italy", 60_480_000),
            RegionSpec::new("Poland", 37_980_000),
            RegionSpec::new("Norway", 5_368_000),
            RegionSpec::new("Sweden", 10_120_000),
            // Hubei only, matching the population figure
            RegionSpec::new("China", 59_020_000).with_sub_region("Hubei"),
            RegionSpec::new("Korea, South", 51_470_000),
            RegionSpec::new("US", 327_200_000),
            RegionSpec::new("New York", 8_623_000).from_sub_national(),
            RegionSpec::new("India", 1_339_000_000),
            RegionSpec::new("Mexico", 129_200_000),
            RegionSpec::new("Iran", 81_160_000),
            RegionSpec::new("Netherlands", 17_280_000),
        ];
        // Populations above are all positive, so validation cannot fail
        Self::new(specs).expect("default catalog is valid")
    }
}
