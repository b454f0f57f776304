//! End-to-end tests: payload -> cache -> pipeline -> presentation

use approx::assert_abs_diff_eq;
use rusty_fxrates::config::PipelineConfig;
use rusty_fxrates::data::cache::RateCache;
use rusty_fxrates::data::{tidy, RawRatePayload};
use rusty_fxrates::pipeline::{
    correlation_matrix, pivot, summarize, Field, RatePipeline, Selection,
};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

/// 30 business-ish days of USD quotes for six symbols
fn payload() -> RawRatePayload {
    let levels = [
        ("EUR", 0.92),
        ("GBP", 0.79),
        ("JPY", 148.0),
        ("MXN", 17.1),
        ("BRL", 4.95),
        ("CLP", 905.0),
    ];
    let start = chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let mut rates = Map::new();
    for i in 0..30 {
        let date = start + chrono::Duration::days(i);
        let mut day = Map::new();
        for (k, (symbol, level)) in levels.iter().enumerate() {
            let wiggle = 1.0 + 0.004 * ((i as f64) * 0.7 + k as f64).sin();
            day.insert(symbol.to_string(), json!(level * wiggle));
        }
        rates.insert(date.to_string(), Value::Object(day));
    }
    RawRatePayload::new("USD", Value::Object(rates))
}

fn cached() -> (TempDir, RateCache) {
    let dir = TempDir::new().unwrap();
    let cache = RateCache::new(dir.path());
    let table = tidy(&payload(), "USD");
    let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    cache.write_snapshot(&table, today).unwrap();
    (dir, cache)
}

#[test]
fn test_default_view() {
    let (_dir, cache) = cached();
    let out = RatePipeline::default()
        .run(&cache, &Selection::default())
        .unwrap();

    assert_eq!(out.available_symbols.len(), 6);
    assert_eq!(out.selected_symbols, vec!["BRL", "CLP", "EUR", "GBP"]);
    assert_eq!(out.table.len(), 4 * 30);
    assert!(out.advisory.is_none());

    let summary = summarize(&out.table);
    assert_eq!(summary.len(), 4);
    for s in &summary {
        assert_eq!(s.observations, 30);
        assert!(s.min.unwrap() <= s.last.unwrap() && s.last.unwrap() <= s.max.unwrap());
    }
}

#[test]
fn test_rebased_view() {
    let (_dir, cache) = cached();
    let selection = Selection::new()
        .with_base("eur")
        .with_symbols(&["USD", "GBP"]);
    let out = RatePipeline::default().run(&cache, &selection).unwrap();

    assert_eq!(out.table.bases(), vec!["EUR"]);
    assert_eq!(out.selected_symbols, vec!["GBP", "USD"]);

    let rates = pivot(&out.table, Field::Rate);
    let first = *rates.dates().next().unwrap();
    let usd = rates.get(first, "USD").unwrap();
    assert_abs_diff_eq!(usd, 1.0 / (0.92 * (1.0 + 0.004 * 0.0f64.sin())), epsilon = 1e-9);

    let rsi = pivot(&out.table, Field::Rsi14);
    assert_eq!(rsi.column("GBP").iter().filter(|(_, v)| v.is_some()).count(), 30 - 13);
}

#[test]
fn test_correlation_over_selection() {
    let (_dir, cache) = cached();
    let selection = Selection::new().with_symbols(&["EUR", "GBP", "JPY"]);
    let out = RatePipeline::default().run(&cache, &selection).unwrap();
    let matrix = correlation_matrix(&out.table).unwrap();

    assert_eq!(matrix.symbols, vec!["EUR", "GBP", "JPY"]);
    for a in &matrix.symbols {
        assert_eq!(matrix.get(a, a), Some(1.0));
        for b in &matrix.symbols {
            let r = matrix.get(a, b).unwrap();
            assert!((-1.0..=1.0).contains(&r));
            assert_eq!(matrix.get(a, b), matrix.get(b, a));
        }
    }
}

#[test]
fn test_config_driven_view_count() {
    let (_dir, cache) = cached();
    let config = PipelineConfig::from_toml_str("default_view_count = 2").unwrap();
    let out = RatePipeline::new(config)
        .run(&cache, &Selection::default())
        .unwrap();
    assert_eq!(out.selected_symbols, vec!["BRL", "CLP"]);
}

#[test]
fn test_output_serializes() {
    let (_dir, cache) = cached();
    let out = RatePipeline::default()
        .run(&cache, &Selection::new().with_symbols(&["JPY"]))
        .unwrap();
    let json = serde_json::to_value(&out.table).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 30);
    assert!(rows[0]["pct_change"].is_null());
    assert_eq!(rows[0]["symbol"], "JPY");
    assert_eq!(rows[0]["is_outlier"], false);
}
