//! Domain types for SentiLab

pub mod position;
pub mod sentiment;
pub mod trade;

pub use position::{PositionType, SizeBucket, SizeThresholds};
pub use sentiment::{Sentiment, UnknownSentiment};
pub use trade::{ClosedTradePolicy, MergedTrade};
