//! Merged trade/sentiment loading.
//!
//! Reads the merged CSV with Polars, validates the schema, and converts each
//! row into a [`MergedTrade`]. Rows are dropped (and counted) when:
//! 1. the sentiment cell is null or empty,
//! 2. the sentiment label is not one of the five known labels,
//! 3. the PnL cell is null or not numeric.
//!
//! A missing required column is fatal. An empty result after filtering is
//! reported as [`LoadError::Empty`] so the caller can stop cleanly.

use crate::data::columns::{self, ColumnSpec};
use crate::domain::{MergedTrade, PositionType, Sentiment};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        column: &'static str,
        row: usize,
        value: String,
    },

    #[error("no rows with a known sentiment remain after filtering ({rows_read} rows read)")]
    Empty { rows_read: usize },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// What the loader kept, what it dropped, and what the retained data spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub rows_retained: usize,
    pub missing_sentiment: usize,
    pub unknown_sentiment: usize,
    pub missing_pnl: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub trading_days: usize,
    /// `None` when the file has no account column.
    pub accounts: Option<usize>,
    /// `None` when the file has no coin column.
    pub coins: Option<usize>,
}

/// Loaded, filtered dataset with provenance.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub trades: Vec<MergedTrade>,
    pub summary: LoadSummary,
    /// BLAKE3 over every retained record, for rerun comparison.
    pub fingerprint: String,
}

/// Load the merged trade/sentiment CSV at `path`.
pub fn load_merged_trades(path: &Path) -> Result<LoadedDataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(None)
        .finish()?
        .collect()?;

    tracing::debug!(path = %path.display(), rows = df.height(), "read merged CSV");
    trades_from_dataframe(&df)
}

/// Convert an in-memory frame with the merged schema into a dataset.
pub fn trades_from_dataframe(df: &DataFrame) -> Result<LoadedDataset, LoadError> {
    for spec in columns::REQUIRED.iter().filter(|s| s.required) {
        if spec.resolve(df).is_none() {
            return Err(LoadError::MissingColumn {
                column: spec.canonical,
            });
        }
    }

    let dates = string_column(df, &columns::DATE)?;
    let labels = string_column(df, &columns::CLASSIFICATION)?;
    let directions = string_column(df, &columns::DIRECTION)?;
    let pnls = float_column(df, &columns::CLOSED_PNL)?;
    let sizes = float_column(df, &columns::SIZE_USD)?;
    let accounts = optional_string_column(df, &columns::ACCOUNT)?;
    let coins = optional_string_column(df, &columns::COIN)?;

    let rows_read = df.height();
    let mut trades = Vec::with_capacity(rows_read);
    let mut missing_sentiment = 0usize;
    let mut unknown_sentiment = 0usize;
    let mut missing_pnl = 0usize;
    let mut unknown_labels: BTreeSet<String> = BTreeSet::new();

    for row in 0..rows_read {
        let sentiment = match labels.get(row).map(str::trim) {
            None | Some("") => {
                missing_sentiment += 1;
                continue;
            }
            Some(label) => match label.parse::<Sentiment>() {
                Ok(s) => s,
                Err(_) => {
                    unknown_sentiment += 1;
                    unknown_labels.insert(label.to_string());
                    continue;
                }
            },
        };

        let Some(closed_pnl) = pnls.get(row).filter(|v| v.is_finite()) else {
            missing_pnl += 1;
            continue;
        };

        let raw_date = dates.get(row).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| LoadError::InvalidValue {
            column: columns::DATE.canonical,
            row,
            value: raw_date.to_string(),
        })?;

        let direction = directions.get(row).unwrap_or("").trim().to_string();
        let position_type = PositionType::from_direction(&direction);

        trades.push(MergedTrade {
            date,
            account: cell(&accounts, row),
            coin: cell(&coins, row),
            direction,
            position_type,
            size_usd: sizes.get(row).filter(|v| v.is_finite()),
            closed_pnl,
            sentiment,
        });
    }

    if !unknown_labels.is_empty() {
        tracing::warn!(
            rows = unknown_sentiment,
            labels = ?unknown_labels,
            "dropped rows with unrecognized sentiment labels"
        );
    }
    if missing_sentiment > 0 {
        tracing::info!(rows = missing_sentiment, "dropped rows without sentiment");
    }
    if missing_pnl > 0 {
        tracing::warn!(rows = missing_pnl, "dropped rows without a numeric PnL");
    }

    if trades.is_empty() {
        return Err(LoadError::Empty { rows_read });
    }

    let summary = summarize(
        &trades,
        rows_read,
        missing_sentiment,
        unknown_sentiment,
        missing_pnl,
        accounts.is_some(),
        coins.is_some(),
    );
    let fingerprint = compute_fingerprint(&trades);

    tracing::info!(
        rows_read,
        retained = summary.rows_retained,
        first = ?summary.first_date,
        last = ?summary.last_date,
        "loaded merged trades"
    );

    Ok(LoadedDataset {
        trades,
        summary,
        fingerprint,
    })
}

/// Parse the date formats seen in merged and raw exports.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%d-%m-%Y %H:%M",
    ];

    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
        })
}

fn string_column(df: &DataFrame, spec: &ColumnSpec) -> Result<StringChunked, LoadError> {
    let name = spec.resolve(df).ok_or(LoadError::MissingColumn {
        column: spec.canonical,
    })?;
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column.str()?.clone())
}

fn optional_string_column(
    df: &DataFrame,
    spec: &ColumnSpec,
) -> Result<Option<StringChunked>, LoadError> {
    match spec.resolve(df) {
        Some(_) => string_column(df, spec).map(Some),
        None => Ok(None),
    }
}

fn float_column(df: &DataFrame, spec: &ColumnSpec) -> Result<Float64Chunked, LoadError> {
    let name = spec.resolve(df).ok_or(LoadError::MissingColumn {
        column: spec.canonical,
    })?;
    let source = df.column(name)?;
    let values = source.cast(&DataType::Float64)?.f64()?.clone();

    // A text column means at least one cell is not a number; name the first.
    if source.dtype() == &DataType::String {
        let raw = source.str()?;
        let bad = (0..raw.len()).find(|&row| {
            values.get(row).is_none() && raw.get(row).is_some_and(|v| !v.trim().is_empty())
        });
        if let Some(row) = bad {
            return Err(LoadError::InvalidValue {
                column: spec.canonical,
                row,
                value: raw.get(row).unwrap_or("").to_string(),
            });
        }
    }
    Ok(values)
}

fn cell(column: &Option<StringChunked>, row: usize) -> Option<String> {
    column
        .as_ref()
        .and_then(|c| c.get(row))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn summarize(
    trades: &[MergedTrade],
    rows_read: usize,
    missing_sentiment: usize,
    unknown_sentiment: usize,
    missing_pnl: usize,
    has_accounts: bool,
    has_coins: bool,
) -> LoadSummary {
    let days: BTreeSet<NaiveDate> = trades.iter().map(|t| t.date).collect();
    let distinct = |f: fn(&MergedTrade) -> Option<&String>| {
        trades.iter().filter_map(f).collect::<BTreeSet<_>>().len()
    };

    LoadSummary {
        rows_read,
        rows_retained: trades.len(),
        missing_sentiment,
        unknown_sentiment,
        missing_pnl,
        first_date: days.first().copied(),
        last_date: days.last().copied(),
        trading_days: days.len(),
        accounts: has_accounts.then(|| distinct(|t| t.account.as_ref())),
        coins: has_coins.then(|| distinct(|t| t.coin.as_ref())),
    }
}

/// Deterministic BLAKE3 hash over the retained records in load order.
fn compute_fingerprint(trades: &[MergedTrade]) -> String {
    let mut hasher = blake3::Hasher::new();
    for t in trades {
        hasher.update(t.date.to_string().as_bytes());
        hasher.update(&[t.sentiment.index() as u8]);
        hasher.update(t.direction.as_bytes());
        hasher.update(&t.closed_pnl.to_le_bytes());
        hasher.update(&t.size_usd.unwrap_or(f64::NAN).to_le_bytes());
        hasher.update(t.account.as_deref().unwrap_or("").as_bytes());
        hasher.update(t.coin.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}
