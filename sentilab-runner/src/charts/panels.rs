//! The six dashboard panels.

use super::canvas::{colors, padded_bounds, Canvas, LinearScale, Rect};
use super::{sentiment_color, ChartData};
use crate::aggregate::SentimentSeries;
use crate::config::ChartSettings;
use chrono::{Datelike, NaiveDate};
use image::Rgb;
use sentilab_core::domain::Sentiment;

const TITLE_SCALE: i64 = 2;
const LABEL_SCALE: i64 = 1;

/// Draw the panel chrome and return the plot area.
fn frame(canvas: &mut Canvas, cell: Rect, title: &str) -> Rect {
    canvas.fill_rect(cell, colors::WHITE);
    canvas.outline(cell, colors::GRID);
    canvas.text_centered(cell.x + cell.w / 2, cell.y + 10, title, colors::TEXT, TITLE_SCALE);
    let plot = cell.inset(64, 40, 16, 40);
    canvas.outline(plot, colors::AXIS);
    plot
}

fn ticks(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect()
}

/// `1234.5` → `"1.2K"`, `-2500000` → `"-2.5M"`.
pub(super) fn fmt_compact(v: f64) -> String {
    let a = v.abs();
    if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else if a >= 10.0 || a == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

fn y_axis(canvas: &mut Canvas, plot: Rect, y: &LinearScale, values: &[f64], suffix: &str) {
    for &v in values {
        let py = y.map(v);
        canvas.hline(py, plot.x + 1, plot.right() - 2, colors::GRID);
        let label = format!("{}{suffix}", fmt_compact(v));
        canvas.text_right(plot.x - 6, py - 3, &label, colors::TEXT, LABEL_SCALE);
    }
}

fn slot_center(plot: Rect, index: usize, slots: usize) -> i64 {
    plot.x + ((index as f64 + 0.5) * plot.w as f64 / slots as f64).round() as i64
}

fn category_labels(canvas: &mut Canvas, plot: Rect) {
    for s in Sentiment::ALL {
        let cx = slot_center(plot, s.index(), Sentiment::ALL.len());
        canvas.text_centered(cx, plot.bottom() + 8, s.label(), colors::TEXT, LABEL_SCALE);
    }
}

fn legend(canvas: &mut Canvas, plot: Rect, entries: &[(String, Rgb<u8>)]) {
    let longest = entries
        .iter()
        .map(|(l, _)| super::font::text_width(l, LABEL_SCALE))
        .max()
        .unwrap_or(0);
    let x = plot.right() - longest - 24;
    for (i, (label, color)) in entries.iter().enumerate() {
        let y = plot.y + 8 + i as i64 * 12;
        canvas.fill_rect(Rect::new(x, y, 8, 7), *color);
        canvas.text(x + 12, y, label, colors::TEXT, LABEL_SCALE);
    }
}

/// Histogram over `[lo, hi]` smoothed with a 5-tap triangle kernel and
/// scaled so the tallest bin is 1.
pub(super) fn binned_density(values: &[f64], lo: f64, hi: f64, bins: usize) -> Vec<f64> {
    let mut counts = vec![0.0_f64; bins];
    let width = (hi - lo) / bins as f64;
    for &v in values.iter().filter(|v| **v >= lo && **v <= hi) {
        let b = (((v - lo) / width) as usize).min(bins - 1);
        counts[b] += 1.0;
    }

    const KERNEL: [f64; 5] = [1.0, 2.0, 3.0, 2.0, 1.0];
    let smoothed: Vec<f64> = (0..bins)
        .map(|i| {
            KERNEL
                .iter()
                .enumerate()
                .filter_map(|(k, w)| {
                    let j = i as i64 + k as i64 - 2;
                    (j >= 0 && (j as usize) < bins).then(|| w * counts[j as usize])
                })
                .sum()
        })
        .collect();

    let peak = smoothed.iter().copied().fold(0.0, f64::max);
    if peak > 0.0 {
        smoothed.into_iter().map(|d| d / peak).collect()
    } else {
        smoothed
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Panel 1. Values outside ±`pnl_display_limit` are left out.
pub(super) fn pnl_violin(canvas: &mut Canvas, cell: Rect, data: &ChartData, settings: &ChartSettings) {
    let plot = frame(canvas, cell, "PnL Distribution by Sentiment");
    let limit = settings.pnl_display_limit;
    let y = LinearScale::new(-limit, limit, plot.bottom() - 1, plot.y);
    y_axis(canvas, plot, &y, &ticks(-limit, limit, 5), "");

    let bins = settings.violin_bins;
    let bin_h = 2.0 * limit / bins as f64;
    let max_half = (plot.w as f64 / Sentiment::ALL.len() as f64 * 0.42) as i64;

    for s in Sentiment::ALL {
        let values: Vec<f64> = data.pnl_by_sentiment[s.index()]
            .iter()
            .copied()
            .filter(|v| v.abs() <= limit)
            .collect();
        if values.is_empty() {
            continue;
        }
        let cx = slot_center(plot, s.index(), Sentiment::ALL.len());
        let color = sentiment_color(s);
        for (b, d) in binned_density(&values, -limit, limit, bins).into_iter().enumerate() {
            if d <= 0.0 {
                continue;
            }
            let lo = -limit + b as f64 * bin_h;
            let top = y.map(lo + bin_h);
            let bottom = y.map(lo);
            let half = ((d * max_half as f64).round() as i64).max(1);
            canvas.fill_rect(
                Rect::new(cx - half, top, 2 * half + 1, (bottom - top).max(1)),
                color,
            );
        }
        let my = y.map(median(&values));
        canvas.hline(my, cx - 6, cx + 6, colors::WHITE);
        canvas.hline(my + 1, cx - 6, cx + 6, colors::BLACK);
    }

    canvas.dashed_hline(y.map(0.0), plot.x, plot.right() - 1, colors::BLACK);
    category_labels(canvas, plot);
}

/// Panel 2.
pub(super) fn win_rate_bars(canvas: &mut Canvas, cell: Rect, data: &ChartData) {
    let plot = frame(canvas, cell, "Win Rate by Sentiment");
    let y = LinearScale::new(0.0, 110.0, plot.bottom() - 1, plot.y);
    y_axis(canvas, plot, &y, &[0.0, 25.0, 50.0, 75.0, 100.0], "%");

    let bar_w = (plot.w as f64 / Sentiment::ALL.len() as f64 * 0.6) as i64;
    for s in Sentiment::ALL {
        let cx = slot_center(plot, s.index(), Sentiment::ALL.len());
        match data.win_rates[s.index()] {
            Some(rate) => {
                let pct = rate * 100.0;
                let top = y.map(pct);
                canvas.fill_rect(
                    Rect::new(cx - bar_w / 2, top, bar_w, plot.bottom() - 1 - top),
                    sentiment_color(s),
                );
                canvas.text_centered(cx, top - 12, &format!("{pct:.1}%"), colors::TEXT, LABEL_SCALE);
            }
            None => {
                canvas.text_centered(cx, plot.bottom() - 14, "n/a", colors::AXIS, LABEL_SCALE);
            }
        }
    }
    category_labels(canvas, plot);
}

/// Panel 3.
pub(super) fn direction_bars(canvas: &mut Canvas, cell: Rect, data: &ChartData) {
    let plot = frame(canvas, cell, "Long vs Short: Avg PnL");
    let values: Vec<f64> = data
        .direction_means
        .iter()
        .flat_map(|(l, s)| [*l, *s])
        .flatten()
        .collect();
    let lo = values.iter().copied().fold(0.0, f64::min);
    let hi = values.iter().copied().fold(0.0, f64::max);
    let (lo, hi) = padded_bounds(lo, hi, 0.1);
    let y = LinearScale::new(lo, hi, plot.bottom() - 1, plot.y);
    y_axis(canvas, plot, &y, &ticks(lo, hi, 5), "");

    let zero = y.map(0.0);
    let bar_w = (plot.w as f64 / Sentiment::ALL.len() as f64 * 0.3) as i64;
    for s in Sentiment::ALL {
        let cx = slot_center(plot, s.index(), Sentiment::ALL.len());
        let (long, short) = data.direction_means[s.index()];
        for (value, x, color) in [
            (long, cx - bar_w, colors::LONG),
            (short, cx, colors::SHORT),
        ] {
            if let Some(v) = value {
                let py = y.map(v);
                let (top, bottom) = if py < zero { (py, zero) } else { (zero, py) };
                canvas.fill_rect(Rect::new(x, top, bar_w, (bottom - top).max(1)), color);
            }
        }
    }

    canvas.dashed_hline(zero, plot.x, plot.right() - 1, colors::BLACK);
    legend(
        canvas,
        plot,
        &[("Long".into(), colors::LONG), ("Short".into(), colors::SHORT)],
    );
    category_labels(canvas, plot);
}

fn day_number(d: NaiveDate) -> f64 {
    f64::from(d.num_days_from_ce())
}

fn series_lines(
    canvas: &mut Canvas,
    plot: Rect,
    series: &[SentimentSeries],
    with_zero: bool,
) {
    let points = series.iter().flat_map(|s| s.points.iter());
    let (mut d_lo, mut d_hi) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut v_lo, mut v_hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for (date, value) in points {
        d_lo = d_lo.min(day_number(*date));
        d_hi = d_hi.max(day_number(*date));
        v_lo = v_lo.min(*value);
        v_hi = v_hi.max(*value);
    }
    if series.is_empty() || !d_lo.is_finite() {
        canvas.text_centered(plot.x + plot.w / 2, plot.y + plot.h / 2, "no data", colors::AXIS, 2);
        return;
    }
    if with_zero {
        v_lo = v_lo.min(0.0);
        v_hi = v_hi.max(0.0);
    }

    let (v_lo, v_hi) = padded_bounds(v_lo, v_hi, 0.05);
    let x = LinearScale::new(d_lo, d_hi, plot.x + 2, plot.right() - 3);
    let y = LinearScale::new(v_lo, v_hi, plot.bottom() - 2, plot.y + 1);
    y_axis(canvas, plot, &y, &ticks(v_lo, v_hi, 5), "");

    for s in series {
        let pixels: Vec<(i64, i64)> = s
            .points
            .iter()
            .map(|(d, v)| (x.map(day_number(*d)), y.map(*v)))
            .collect();
        canvas.polyline(&pixels, sentiment_color(s.sentiment), 2);
    }
    if with_zero {
        canvas.dashed_hline(y.map(0.0), plot.x, plot.right() - 1, colors::BLACK);
    }

    if let (Some(first), Some(last)) = (
        series.iter().filter_map(|s| s.points.first()).map(|p| p.0).min(),
        series.iter().filter_map(|s| s.points.last()).map(|p| p.0).max(),
    ) {
        canvas.text(plot.x, plot.bottom() + 8, &first.to_string(), colors::TEXT, LABEL_SCALE);
        canvas.text_right(plot.right(), plot.bottom() + 8, &last.to_string(), colors::TEXT, LABEL_SCALE);
    }

    let entries: Vec<(String, Rgb<u8>)> = series
        .iter()
        .map(|s| (s.sentiment.label().to_string(), sentiment_color(s.sentiment)))
        .collect();
    legend(canvas, plot, &entries);
}

/// Panel 4.
pub(super) fn daily_volume_lines(canvas: &mut Canvas, cell: Rect, data: &ChartData) {
    let plot = frame(canvas, cell, "Daily Trading Volume by Sentiment");
    series_lines(canvas, plot, &data.daily_volume, false);
}

/// Panel 5. Points outside the capped axes are not drawn.
pub(super) fn size_pnl_scatter(
    canvas: &mut Canvas,
    cell: Rect,
    data: &ChartData,
    settings: &ChartSettings,
) {
    let title = format!("Trade Size vs PnL ({} sample)", data.scatter.len());
    let plot = frame(canvas, cell, &title);
    let limit = settings.scatter_pnl_limit;
    let x = LinearScale::new(0.0, settings.scatter_size_max, plot.x + 1, plot.right() - 2);
    let y = LinearScale::new(-limit, limit, plot.bottom() - 2, plot.y + 1);
    y_axis(canvas, plot, &y, &ticks(-limit, limit, 5), "");

    for p in &data.scatter {
        if !x.contains(p.size_usd) || !y.contains(p.pnl) {
            continue;
        }
        let (px, py) = (x.map(p.size_usd), y.map(p.pnl));
        let color = sentiment_color(p.sentiment);
        for dy in -1..=1 {
            for dx in -1..=1 {
                canvas.blend(px + dx, py + dy, color, 0.35);
            }
        }
    }

    canvas.dashed_hline(y.map(0.0), plot.x, plot.right() - 1, colors::BLACK);
    canvas.dashed_vline(x.map(0.0), plot.y, plot.bottom() - 1, colors::BLACK);
    for v in ticks(0.0, settings.scatter_size_max, 3) {
        canvas.text_centered(x.map(v), plot.bottom() + 8, &fmt_compact(v), colors::TEXT, LABEL_SCALE);
    }

    let entries: Vec<(String, Rgb<u8>)> = Sentiment::ALL
        .into_iter()
        .map(|s| (s.label().to_string(), sentiment_color(s)))
        .collect();
    legend(canvas, plot, &entries);
}

/// Panel 6.
pub(super) fn cumulative_lines(canvas: &mut Canvas, cell: Rect, data: &ChartData) {
    let plot = frame(canvas, cell, "Cumulative PnL by Sentiment");
    series_lines(canvas, plot, &data.cumulative_pnl, true);
}
