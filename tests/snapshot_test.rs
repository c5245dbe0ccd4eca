use chrono::{Duration, NaiveDate};
use epicompare::{
    Engine, EngineConfig, EngineSnapshot, Error, RawRow, RawTable, RawSources, RegionCatalog,
    RegionSpec, SubRegionRow, SubRegionTable,
};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 22).unwrap()
}

fn date_labels(n: usize) -> Vec<String> {
    (0..n)
        .map(|d| (start_date() + Duration::days(d as i64)).format("%m/%d/%y").to_string())
        .collect()
}

fn global_row(region: &str, values: &[f64]) -> RawRow {
    RawRow {
        sub_region: String::new(),
        region: region.to_string(),
        lat: 0.0,
        long: 0.0,
        values: values.to_vec(),
    }
}

fn unit_row(admin2: &str, state: &str, values: &[f64]) -> SubRegionRow {
    SubRegionRow {
        uid: format!("84036{admin2}"),
        iso2: "US".to_string(),
        iso3: "USA".to_string(),
        code3: "840".to_string(),
        fips: "36".to_string(),
        admin2: admin2.to_string(),
        province_state: state.to_string(),
        country_region: "US".to_string(),
        lat: 0.0,
        long: 0.0,
        cells: values.iter().map(|v| format!("{v}")).collect(),
    }
}

/// Two global regions plus a synthetic state:
/// - "A" crosses the onset threshold on day 3 (population 2,000,000, so
///   2 deaths normalize to exactly 0.0001%)
/// - "B" never rises above the threshold
/// - "X" is aggregated from three sub-national units
fn test_sources() -> RawSources {
    let labels = date_labels(6);

    let mut confirmed = RawTable::new(labels.clone());
    confirmed
        .push_row(global_row("A", &[10.0, 30.0, 60.0, 100.0, 150.0, 210.0]))
        .unwrap();
    confirmed
        .push_row(global_row("B", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
        .unwrap();

    let mut deaths = RawTable::new(labels.clone());
    deaths
        .push_row(global_row("A", &[0.0, 1.0, 2.0, 4.0, 10.0, 30.0]))
        .unwrap();
    deaths
        .push_row(global_row("B", &[0.0, 0.0, 1.0, 1.0, 1.0, 1.0]))
        .unwrap();

    let mut recovered = RawTable::new(labels.clone());
    recovered
        .push_row(global_row("A", &[0.0, 0.0, 5.0, 12.0, 30.0, 60.0]))
        .unwrap();
    recovered
        .push_row(global_row("B", &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]))
        .unwrap();

    let mut sub_confirmed = SubRegionTable::new(labels.clone());
    let mut sub_deaths = SubRegionTable::new(labels);
    for admin2 in ["Bronx", "Kings", "Queens"] {
        sub_confirmed
            .rows
            .push(unit_row(admin2, "X", &[5.0, 10.0, 15.0, 20.0, 25.0, 30.0]));
        sub_deaths
            .rows
            .push(unit_row(admin2, "X", &[0.0, 0.0, 1.0, 2.0, 3.0, 5.0]));
    }

    RawSources {
        confirmed,
        deaths,
        recovered,
        sub_confirmed,
        sub_deaths,
    }
}

fn test_catalog() -> RegionCatalog {
    RegionCatalog::new(vec![
        RegionSpec::new("A", 2_000_000),
        RegionSpec::new("B", 8_000_000),
        RegionSpec::new("X", 1_000_000).from_sub_national(),
    ])
    .unwrap()
}

fn load_snapshot() -> EngineSnapshot {
    EngineSnapshot::load_all(&test_sources(), &test_catalog(), &EngineConfig::default()).unwrap()
}

#[test]
fn test_catalog_rejects_zero_population() {
    let result = RegionCatalog::new(vec![RegionSpec::new("A", 0)]);
    assert!(matches!(result, Err(Error::InvalidPopulation { .. })));
}

#[test]
fn test_load_all_rejects_disagreeing_global_schemas() {
    let mut sources = test_sources();
    sources.recovered = RawTable::new(date_labels(5));
    let result = EngineSnapshot::load_all(&sources, &test_catalog(), &EngineConfig::default());
    assert!(matches!(result, Err(Error::SchemaMismatch(_))));
}

#[test]
fn test_aligned_series_flags_region_without_onset() {
    let snapshot = load_snapshot();
    let results = snapshot.aligned_series(&["A", "B"]).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "A");
    let a = results[0].1.as_ref().unwrap();
    // Day 0 is the last day at or below the threshold: 2 deaths out of
    // 2,000,000 is exactly 0.0001%, on the third date.
    assert_eq!(a.days, vec![0, 1, 2, 3]);
    assert_eq!(a.dates[0], start_date() + Duration::days(2));
    assert!((a.deaths[0] - 0.0001).abs() < 1e-15);
    assert!(a.deaths[1..].iter().all(|&d| d > 0.0001));

    // B's normalized deaths never rise above the threshold
    assert_eq!(results[1].0, "B");
    assert!(matches!(results[1].1, Err(Error::NoOnsetFound(_))));
}

#[test]
fn test_aligned_series_unknown_region_fails_the_call() {
    let snapshot = load_snapshot();
    let result = snapshot.aligned_series(&["A", "Atlantis"]);
    assert!(matches!(result, Err(Error::RegionNotFound(_))));
}

#[test]
fn test_synthetic_region_is_aggregated_and_uses_deaths_fallback() {
    let snapshot = load_snapshot();
    let region = snapshot.region("X").unwrap();
    let data = region.outcome.as_ref().unwrap();

    // Three units of [5,10,15,20,25,30] each
    assert_eq!(data.series.confirmed, vec![15.0, 30.0, 45.0, 60.0, 75.0, 90.0]);
    assert_eq!(data.series.deaths, vec![0.0, 0.0, 3.0, 6.0, 9.0, 15.0]);
    // No recovered source exists for synthetic regions
    assert_eq!(data.series.recovered, data.series.deaths);
}

#[test]
fn test_trend_and_summary() {
    let snapshot = load_snapshot();
    let as_of = start_date() + Duration::days(5);

    // A's confirmed increments are 20,30,40,50,60: slope 10 per day
    let trend = snapshot.trend("A", as_of).unwrap();
    assert!((trend.confirmed_gradient - 10.0 / 2_000_000.0).abs() < 1e-15);

    // Memoized: a second call returns the identical estimate
    let again = snapshot.trend("A", as_of).unwrap();
    assert_eq!(again, trend);

    // Explicit invalidation keeps the trend computable
    snapshot.invalidate_trends();
    let recomputed = snapshot.trend("A", as_of).unwrap();
    assert_eq!(recomputed, trend);

    let summary = snapshot.summary(&["A", "X"], as_of).unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].region, "A");
    assert_eq!(summary[0].confirmed_total, 210);
    assert_eq!(summary[0].deaths_total, 30);
    // Acceleration scaled back to absolute daily counts
    assert_eq!(summary[0].confirmed_acceleration, 10);
    assert_eq!(summary[1].region, "X");
    assert_eq!(summary[1].confirmed_total, 90);
    // Flat increments: no acceleration
    assert_eq!(summary[1].confirmed_acceleration, 0);
}

#[test]
fn test_merge_failure_isolated_to_synthetic_region() {
    let mut sources = test_sources();
    // Sub-national tables missing a date column: only X becomes unusable
    sources.sub_confirmed = SubRegionTable::new(date_labels(5));
    sources.sub_deaths = SubRegionTable::new(date_labels(5));

    let snapshot =
        EngineSnapshot::load_all(&sources, &test_catalog(), &EngineConfig::default()).unwrap();
    assert!(snapshot.region("A").unwrap().outcome.is_ok());
    assert!(snapshot.region("B").unwrap().outcome.is_ok());
    assert!(matches!(
        snapshot.region("X").unwrap().outcome,
        Err(Error::SchemaMismatch(_))
    ));

    // Queries against the unusable region surface its stored error
    let result = snapshot.summary(&["X"], start_date() + Duration::days(5));
    assert!(matches!(result, Err(Error::SchemaMismatch(_))));
}

#[test]
fn test_engine_reload_swaps_snapshot() {
    let catalog = test_catalog();
    let config = EngineConfig::default();
    let engine = Engine::load(&test_sources(), &catalog, &config).unwrap();

    let before = engine.snapshot();
    assert_eq!(
        before.region("A").unwrap().outcome.as_ref().unwrap().series.latest_confirmed(),
        Some(210.0)
    );

    // A fresh feed with one more confirmed case on the last day
    let mut sources = test_sources();
    sources.confirmed.rows[0].values[5] = 211.0;
    engine.reload(&sources, &catalog, &config).unwrap();

    let after = engine.snapshot();
    assert_eq!(
        after.region("A").unwrap().outcome.as_ref().unwrap().series.latest_confirmed(),
        Some(211.0)
    );
    // The old snapshot is unchanged for readers still holding it
    assert_eq!(
        before.region("A").unwrap().outcome.as_ref().unwrap().series.latest_confirmed(),
        Some(210.0)
    );
}

#[test]
fn test_catalog_from_json() {
    let catalog = RegionCatalog::from_json(
        r#"[
            {"name": "A", "population": 2000000},
            {"name": "X", "population": 1000000, "from_sub_national": true}
        ]"#,
    )
    .unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(catalog.get("X").unwrap().from_sub_national);
    assert_eq!(catalog.get("A").unwrap().sub_region, "");
}
