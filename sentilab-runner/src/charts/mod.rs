//! Six-panel sentiment dashboard rendered to a single PNG.
//!
//! Layout (2 × 3):
//! 1. PnL distribution (violin)      2. Win rate        3. Long vs Short mean PnL
//! 4. Daily volume (lines)           5. Size vs PnL     6. Cumulative PnL (lines)

pub mod canvas;
pub mod font;
mod panels;

use crate::aggregate::{Aggregates, SentimentSeries};
use crate::config::ChartSettings;
use crate::views::TradeViews;
use anyhow::{Context, Result};
use canvas::{colors, Canvas, Rect};
use image::{ImageFormat, Rgb, RgbImage};
use sentilab_core::domain::{PositionType, Sentiment};
use sentilab_core::rng::RngHierarchy;
use std::path::Path;

/// Sub-seed label for the scatter sample.
pub const SCATTER_STREAM: &str = "charts/scatter";

/// Fixed colour per sentiment label, red through blue.
pub fn sentiment_color(sentiment: Sentiment) -> Rgb<u8> {
    match sentiment {
        Sentiment::ExtremeFear => Rgb([214, 39, 40]),
        Sentiment::Fear => Rgb([255, 127, 14]),
        Sentiment::Neutral => Rgb([127, 127, 127]),
        Sentiment::Greed => Rgb([44, 160, 44]),
        Sentiment::ExtremeGreed => Rgb([31, 119, 180]),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub size_usd: f64,
    pub pnl: f64,
    pub sentiment: Sentiment,
}

/// Everything the panels draw, gathered up front so rendering is pure.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// Closed PnL per sentiment, in scale order.
    pub pnl_by_sentiment: [Vec<f64>; 5],
    /// Win rate (0–1) per sentiment.
    pub win_rates: [Option<f64>; 5],
    /// Mean (long, short) PnL per sentiment.
    pub direction_means: [(Option<f64>, Option<f64>); 5],
    pub daily_volume: Vec<SentimentSeries>,
    pub scatter: Vec<ScatterPoint>,
    pub cumulative_pnl: Vec<SentimentSeries>,
}

impl ChartData {
    pub fn collect(
        views: &TradeViews<'_>,
        aggregates: &Aggregates,
        settings: &ChartSettings,
        rng: &RngHierarchy,
    ) -> Self {
        let mut win_rates = [None; 5];
        let mut direction_means = [(None, None); 5];
        for s in Sentiment::ALL {
            win_rates[s.index()] = aggregates.summary_for(s).map(|x| x.win_rate);
            direction_means[s.index()] = (
                aggregates.direction_for(s, PositionType::Long).map(|d| d.mean_pnl),
                aggregates.direction_for(s, PositionType::Short).map(|d| d.mean_pnl),
            );
        }

        let picked = rng.sample_indices(SCATTER_STREAM, views.closed.len(), settings.scatter_sample);
        let scatter = picked
            .into_iter()
            .filter_map(|i| {
                let t = views.closed[i];
                t.size_usd.map(|size_usd| ScatterPoint {
                    size_usd,
                    pnl: t.closed_pnl,
                    sentiment: t.sentiment,
                })
            })
            .collect();

        Self {
            pnl_by_sentiment: views.closed_pnl_by_sentiment(),
            win_rates,
            direction_means,
            daily_volume: aggregates.daily_volume.clone(),
            scatter,
            cumulative_pnl: aggregates.cumulative_pnl.clone(),
        }
    }
}

/// Render the full dashboard.
pub fn render_dashboard(data: &ChartData, settings: &ChartSettings) -> RgbImage {
    let mut canvas = Canvas::new(settings.width, settings.height, colors::BACKGROUND);
    let pad = 12;
    let cell_w = (canvas.width() - pad * 4) / 3;
    let cell_h = (canvas.height() - pad * 3) / 2;
    let cell = |row: i64, col: i64| {
        Rect::new(
            pad + col * (cell_w + pad),
            pad + row * (cell_h + pad),
            cell_w,
            cell_h,
        )
    };

    panels::pnl_violin(&mut canvas, cell(0, 0), data, settings);
    panels::win_rate_bars(&mut canvas, cell(0, 1), data);
    panels::direction_bars(&mut canvas, cell(0, 2), data);
    panels::daily_volume_lines(&mut canvas, cell(1, 0), data);
    panels::size_pnl_scatter(&mut canvas, cell(1, 1), data, settings);
    panels::cumulative_lines(&mut canvas, cell(1, 2), data);

    canvas.into_image()
}

pub fn write_png(image: &RgbImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write chart PNG {}", path.display()))
}
