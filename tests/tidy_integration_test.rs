//! Integration tests for the tidy transformer
//!
//! Payload JSON in, flat rows out, through to the CSV cache format

use rusty_fxrates::data::cache::{read_table_from, write_table_to, CSV_HEADERS};
use rusty_fxrates::data::{tidy, tidy_with_report, RawRatePayload};
use rusty_fxrates::pipeline::derive_metrics;
use serde_json::json;
use std::collections::HashSet;

#[test]
fn test_empty_payloads_yield_empty_tables() {
    for doc in ["{}", r#"{"rates": {}}"#, r#"{"base": "USD", "rates": null}"#, "[]"] {
        let payload = RawRatePayload::from_json(doc).unwrap();
        let table = tidy(&payload, "USD");
        assert!(table.is_empty(), "expected no rows for {}", doc);
    }
}

#[test]
fn test_empty_table_keeps_column_set() {
    let table = tidy(&RawRatePayload::from_json("{}").unwrap(), "USD");
    let mut buf = Vec::new();
    write_table_to(&mut buf, &table).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.trim_end(), CSV_HEADERS.join(","));
}

#[test]
fn test_realistic_payload() {
    let payload = RawRatePayload::from_value(json!({
        "amount": 1.0,
        "base": "USD",
        "start_date": "2024-01-02",
        "end_date": "2024-01-04",
        "rates": {
            "2024-01-04": {"EUR": 0.9136, "GBP": 0.7877, "JPY": 143.99},
            "2024-01-02": {"EUR": 0.9123, "GBP": 0.7881, "JPY": 141.77},
            "2024-01-03": {"EUR": 0.9157, "GBP": 0.7900, "JPY": 143.42}
        }
    }));

    let table = tidy(&payload, "USD");
    assert_eq!(table.len(), 9);
    assert_eq!(table.bases(), vec!["USD"]);
    assert_eq!(table.symbols(), vec!["EUR", "GBP", "JPY"]);

    let dates: Vec<_> = table.iter().map(|r| r.date.to_string()).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
}

#[test]
fn test_bad_entries_are_counted() {
    let payload = RawRatePayload::from_value(json!({
        "base": "USD",
        "rates": {
            "2024-01-02": {"EUR": 0.91, "GBP": "0.79", "XAU": null, "ARS": -1.0},
            "2024-01-03": [0.9, 0.8],
            "yesterday": {"EUR": 0.92}
        }
    }));

    let report = tidy_with_report(&payload, "USD");
    assert_eq!(report.table.len(), 2);
    assert_eq!(report.skipped.malformed_dates, 1);
    assert_eq!(report.skipped.bad_dates, 1);
    assert_eq!(report.skipped.bad_rates, 2);
    assert_eq!(report.skipped.total(), 4);
}

#[test]
fn test_timestamp_key_does_not_duplicate_a_day() {
    let payload = RawRatePayload::from_value(json!({
        "base": "USD",
        "rates": {
            "2024-01-01": {"EUR": 0.90},
            "2024-01-01T00:00:00Z": {"EUR": 0.95},
            "2024-01-02": {"EUR": 0.91}
        }
    }));

    let report = tidy_with_report(&payload, "USD");
    assert_eq!(report.skipped.duplicates, 1);
    assert_eq!(report.table.len(), 2);

    let keys: HashSet<_> = report.table.iter().map(|r| (r.date, r.symbol.clone())).collect();
    assert_eq!(keys.len(), report.table.len());

    // No zero-day change between two rates of the same date
    let augmented = derive_metrics(&report.table);
    let rows = augmented.rows();
    assert_eq!(rows[0].rate, Some(0.90));
    assert_eq!(rows[0].pct_change, None);
    let change = rows[1].pct_change.unwrap();
    assert!((change - (0.91 / 0.90 - 1.0)).abs() < 1e-12);
}

#[test]
fn test_tidy_table_survives_csv() {
    let payload = RawRatePayload::from_value(json!({
        "base": "USD",
        "rates": {"2024-01-02": {"EUR": 0.91, "GBP": 0.79}}
    }));
    let table = tidy(&payload, "USD");

    let mut buf = Vec::new();
    write_table_to(&mut buf, &table).unwrap();
    let back = read_table_from(buf.as_slice()).unwrap();
    assert_eq!(back, table);
}
