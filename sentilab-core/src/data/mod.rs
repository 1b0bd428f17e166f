//! Data ingestion for the merged trade/sentiment table

pub mod columns;
pub mod loader;

pub use loader::{load_merged_trades, parse_date, trades_from_dataframe, LoadError, LoadSummary, LoadedDataset};
