use chrono::{Duration, NaiveDate};
use epicompare::{
    Engine, EngineConfig, RawRow, RawTable, RegionCatalog, RegionSpec, Result, SubRegionRow,
    SubRegionTable,
};
use log::{info, warn};
use rand::Rng;

/// Synthesize a cumulative epidemic curve: flat before the local onset,
/// then roughly quadratic growth with some noise.
fn synthetic_curve(rng: &mut impl Rng, days: usize, onset_day: usize, scale: f64) -> Vec<f64> {
    let mut total = 0.0;
    (0..days)
        .map(|day| {
            if day > onset_day {
                let t = (day - onset_day) as f64;
                total += (scale * t * rng.random_range(0.8..1.2)).round();
            }
            total
        })
        .collect()
}

fn global_row(region: &str, values: Vec<f64>) -> RawRow {
    RawRow {
        sub_region: String::new(),
        region: region.to_string(),
        lat: 0.0,
        long: 0.0,
        values,
    }
}

fn county_row(admin2: &str, state: &str, cells: Vec<String>) -> SubRegionRow {
    SubRegionRow {
        uid: format!("840{admin2}"),
        iso2: "US".to_string(),
        iso3: "USA".to_string(),
        code3: "840".to_string(),
        fips: "36".to_string(),
        admin2: admin2.to_string(),
        province_state: state.to_string(),
        country_region: "US".to_string(),
        lat: 0.0,
        long: 0.0,
        cells,
    }
}

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut rng = rand::rng();
    let days = 60;
    let start = NaiveDate::from_ymd_opt(2020, 1, 22).expect("valid start date");
    let date_labels: Vec<String> = (0..days)
        .map(|d| (start + Duration::days(d as i64)).format("%m/%d/%y").to_string())
        .collect();

    // Two national regions plus one state aggregated from the
    // sub-national feed.
    let catalog = RegionCatalog::new(vec![
        RegionSpec::new("Norway", 5_368_000),
        RegionSpec::new("Sweden", 10_120_000),
        RegionSpec::new("New York", 8_623_000).from_sub_national(),
    ])?;

    info!("Synthesizing {days}-day feed for {} regions", catalog.len());

    let mut confirmed = RawTable::new(date_labels.clone());
    let mut deaths = RawTable::new(date_labels.clone());
    let mut recovered = RawTable::new(date_labels.clone());
    for (region, onset) in [("Norway", 30), ("Sweden", 24)] {
        confirmed.push_row(global_row(region, synthetic_curve(&mut rng, days, onset, 40.0)))?;
        deaths.push_row(global_row(region, synthetic_curve(&mut rng, days, onset + 4, 2.0)))?;
        recovered.push_row(global_row(region, synthetic_curve(&mut rng, days, onset + 8, 10.0)))?;
    }

    // Sub-national feed: three counties, one of them with placeholder
    // cells that must be skipped during aggregation.
    let mut sub_confirmed = SubRegionTable::new(date_labels.clone());
    let mut sub_deaths = SubRegionTable::new(date_labels);
    for (county, scale) in [("Bronx", 25.0), ("Kings", 30.0), ("Queens", 28.0)] {
        let confirmed_cells: Vec<String> = synthetic_curve(&mut rng, days, 34, scale)
            .into_iter()
            .map(|v| {
                if county == "Queens" && v == 0.0 {
                    String::new()
                } else {
                    format!("{v}")
                }
            })
            .collect();
        let death_cells: Vec<String> = synthetic_curve(&mut rng, days, 38, scale / 15.0)
            .into_iter()
            .map(|v| format!("{v}"))
            .collect();
        sub_confirmed.rows.push(county_row(county, "New York", confirmed_cells));
        sub_deaths.rows.push(county_row(county, "New York", death_cells));
    }

    let sources = epicompare::RawSources {
        confirmed,
        deaths,
        recovered,
        sub_confirmed,
        sub_deaths,
    };

    let engine = Engine::load(&sources, &catalog, &EngineConfig::default())?;
    let snapshot = engine.snapshot();

    let names: Vec<&str> = vec!["Norway", "Sweden", "New York"];
    for (region, aligned) in snapshot.aligned_series(&names)? {
        match aligned {
            Ok(series) => info!(
                "{region}: {} days since onset, latest normalized deaths {:.6}%",
                series.len(),
                series.deaths.last().copied().unwrap_or(0.0)
            ),
            Err(e) => warn!("{region}: no aligned view ({e})"),
        }
    }

    let as_of = start + Duration::days(days as i64 - 1);
    for region in &names {
        match snapshot.trend(region, as_of) {
            Ok(trend) => info!(
                "{region}: confirmed acceleration {:.3e}/capita/day, deaths {:.3e}/capita/day",
                trend.confirmed_gradient, trend.deaths_gradient
            ),
            Err(e) => warn!("{region}: trend unavailable ({e})"),
        }
    }

    let summary = snapshot.summary(&names, as_of)?;
    let rendered = serde_json::to_string_pretty(&summary).expect("summary serializes");
    info!("Summary:\n{rendered}");

    Ok(())
}
