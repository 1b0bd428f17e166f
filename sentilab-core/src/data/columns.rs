//! Column names of the merged trade/sentiment table.
//!
//! The merged file is produced upstream with dotted names (`Closed.PnL`),
//! while raw exchange exports use spaces (`Closed PnL`). Both are accepted.

use polars::prelude::DataFrame;

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

pub const DATE: ColumnSpec = ColumnSpec {
    canonical: "date",
    aliases: &["Date"],
    required: true,
};

pub const CLASSIFICATION: ColumnSpec = ColumnSpec {
    canonical: "classification",
    aliases: &["Classification", "sentiment"],
    required: true,
};

pub const CLOSED_PNL: ColumnSpec = ColumnSpec {
    canonical: "Closed.PnL",
    aliases: &["Closed PnL", "closed_pnl"],
    required: true,
};

pub const SIZE_USD: ColumnSpec = ColumnSpec {
    canonical: "Size.USD",
    aliases: &["Size USD", "size_usd"],
    required: true,
};

pub const DIRECTION: ColumnSpec = ColumnSpec {
    canonical: "Direction",
    aliases: &["direction"],
    required: true,
};

pub const ACCOUNT: ColumnSpec = ColumnSpec {
    canonical: "Account",
    aliases: &["account"],
    required: false,
};

pub const COIN: ColumnSpec = ColumnSpec {
    canonical: "Coin",
    aliases: &["coin", "symbol"],
    required: false,
};

pub const REQUIRED: [ColumnSpec; 5] = [DATE, CLASSIFICATION, CLOSED_PNL, SIZE_USD, DIRECTION];

impl ColumnSpec {
    /// Find the first name (canonical, then aliases) present in the frame.
    pub fn resolve(&self, df: &DataFrame) -> Option<&'static str> {
        std::iter::once(self.canonical)
            .chain(self.aliases.iter().copied())
            .find(|name| df.get_column_index(name).is_some())
    }
}
