//! Integration tests for base conversion
//!
//! Tests the converter against tables produced by the tidy transformer

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use rusty_fxrates::data::fx::{convert_base, ConversionAdvisory};
use rusty_fxrates::data::{tidy, RawRatePayload};
use rusty_fxrates::types::{TidyRow, TidyTable};
use serde_json::json;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn usd_table() -> TidyTable {
    let payload = RawRatePayload::from_value(json!({
        "base": "USD",
        "rates": {
            "2024-01-01": {"EUR": 0.90, "GBP": 0.80, "JPY": 141.0},
            "2024-01-02": {"EUR": 0.92, "GBP": 0.79, "JPY": 143.5}
        }
    }));
    tidy(&payload, "USD")
}

fn rate(table: &TidyTable, date: NaiveDate, symbol: &str) -> Option<f64> {
    table
        .iter()
        .find(|r| r.date == date && r.symbol == symbol)
        .and_then(|r| r.rate)
}

#[test]
fn test_identity_conversion_is_exact() {
    let table = usd_table();
    let conversion = convert_base(&table, "USD");
    assert!(conversion.advisory.is_none());
    assert_eq!(conversion.table, table.sorted_by_symbol_date());

    let lower = convert_base(&table, " usd ");
    assert_eq!(lower.table, table.sorted_by_symbol_date());
}

#[test]
fn test_usd_to_eur_arithmetic() {
    let conversion = convert_base(&usd_table(), "EUR");
    assert!(conversion.advisory.is_none());
    let table = conversion.table;

    assert_abs_diff_eq!(rate(&table, d(1), "USD").unwrap(), 1.0 / 0.90, epsilon = 1e-3);
    assert_abs_diff_eq!(rate(&table, d(1), "USD").unwrap(), 1.1111, epsilon = 1e-3);
    assert_abs_diff_eq!(rate(&table, d(1), "GBP").unwrap(), 0.8889, epsilon = 1e-3);
    assert_abs_diff_eq!(rate(&table, d(2), "JPY").unwrap(), 143.5 / 0.92, epsilon = 1e-9);

    assert_eq!(table.bases(), vec!["EUR"]);
    assert!(table.iter().all(|r| r.symbol != "EUR"));
    assert_eq!(table.symbols(), vec!["GBP", "JPY", "USD"]);
    assert_eq!(table.len(), 6);
}

#[test]
fn test_old_base_row_is_reciprocal_of_pivot() {
    let table = convert_base(&usd_table(), "GBP").table;
    let usd = rate(&table, d(2), "USD").unwrap();
    assert_eq!(usd, 1.0 / 0.79);
    assert!(table.iter().all(|r| r.symbol != r.base));
}

#[test]
fn test_round_trip_through_eur() {
    let original = usd_table();
    let back = convert_base(&convert_base(&original, "EUR").table, "USD").table;
    for row in original.iter() {
        let there_and_back = rate(&back, row.date, &row.symbol).unwrap();
        assert_abs_diff_eq!(there_and_back, row.rate.unwrap(), epsilon = 1e-9);
    }
}

#[test]
fn test_target_not_found() {
    let table = usd_table();
    let conversion = convert_base(&table, "CHF");
    assert_eq!(
        conversion.advisory,
        Some(ConversionAdvisory::TargetNotFound {
            target: "CHF".to_string(),
            base: "USD".to_string(),
        })
    );
    assert_eq!(conversion.table, table);
}

#[test]
fn test_missing_pivot_leaves_rate_undefined() {
    let table = TidyTable::from_rows(vec![
        TidyRow::new(d(1), "USD", "EUR", 0.90),
        TidyRow::new(d(1), "USD", "GBP", 0.80),
        TidyRow::new(d(2), "USD", "GBP", 0.81),
    ]);
    let out = convert_base(&table, "EUR").table;

    let gbp_day2 = out
        .iter()
        .find(|r| r.date == d(2) && r.symbol == "GBP")
        .unwrap();
    assert_eq!(gbp_day2.rate, None);
    assert_eq!(gbp_day2.base, "EUR");
    assert!(!out.iter().any(|r| r.date == d(2) && r.symbol == "USD"));
    assert_eq!(out.len(), 3);
}

#[test]
fn test_mixed_bases_are_refused() {
    let table = TidyTable::from_rows(vec![
        TidyRow::new(d(1), "USD", "EUR", 0.90),
        TidyRow::new(d(1), "EUR", "GBP", 0.88),
    ]);
    let conversion = convert_base(&table, "GBP");
    assert!(matches!(
        conversion.advisory,
        Some(ConversionAdvisory::MixedBases { .. })
    ));
    assert_eq!(conversion.table.len(), 2);
}

#[test]
fn test_empty_table_passes_through() {
    let conversion = convert_base(&TidyTable::new(), "EUR");
    assert!(conversion.table.is_empty());
    assert!(conversion.advisory.is_none());
}
