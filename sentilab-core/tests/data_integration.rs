//! Integration tests for the loader using the frozen two-sentiment fixture.

use chrono::NaiveDate;
use std::path::PathBuf;
use sentilab_core::data::load_merged_trades;
use sentilab_core::domain::{PositionType, Sentiment};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn fixture_loads_every_row() {
    let loaded = load_merged_trades(&fixture("two_sentiment.csv")).unwrap();
    let s = &loaded.summary;

    assert_eq!(s.rows_read, 10);
    assert_eq!(s.rows_retained, 10);
    assert_eq!(s.missing_sentiment + s.unknown_sentiment + s.missing_pnl, 0);
    assert_eq!(s.first_date, NaiveDate::from_ymd_opt(2024, 3, 2));
    assert_eq!(s.last_date, NaiveDate::from_ymd_opt(2024, 3, 11));
    assert_eq!(s.trading_days, 4);
    assert_eq!(s.accounts, Some(3));
    assert_eq!(s.coins, Some(3));
}

#[test]
fn fixture_labels_and_signs() {
    let loaded = load_merged_trades(&fixture("two_sentiment.csv")).unwrap();
    let fear: Vec<_> = loaded
        .trades
        .iter()
        .filter(|t| t.sentiment == Sentiment::Fear)
        .collect();
    let greed: Vec<_> = loaded
        .trades
        .iter()
        .filter(|t| t.sentiment == Sentiment::Greed)
        .collect();

    assert_eq!(fear.len(), 5);
    assert_eq!(greed.len(), 5);
    assert!(fear.iter().all(|t| t.closed_pnl < 0.0));
    assert!(greed.iter().all(|t| t.closed_pnl > 0.0));

    let shorts = loaded
        .trades
        .iter()
        .filter(|t| t.position_type == PositionType::Short)
        .count();
    assert_eq!(shorts, 4);
}

#[test]
fn fingerprint_is_stable_across_loads() {
    let a = load_merged_trades(&fixture("two_sentiment.csv")).unwrap();
    let b = load_merged_trades(&fixture("two_sentiment.csv")).unwrap();
    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(a.fingerprint.len(), 64);
}
