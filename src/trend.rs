//! Short-horizon trend classification by ordinary least squares.
//!
//! The regression runs over at most [`TRAILING_WINDOW`] yearly values ending
//! at the query year. The slope relative to the window mean decides the label:
//! anything under [`STABLE_THRESHOLD`] per year in magnitude counts as stable.

use crate::aggregate::aggregate;
use crate::models::{Confidence, TrendLabel, TrendResult};
use crate::store::Store;
use serde::{Deserialize, Serialize};

/// Relative change per year below which a series counts as stable (0.5%).
pub const STABLE_THRESHOLD: f64 = 0.005;

/// Number of years in a full trailing window.
pub const TRAILING_WINDOW: usize = 4;

/// Classify the trend of `values` over `years`.
///
/// `years` and `values` are parallel and ascending by year. Mismatched lengths
/// or fewer than two points give [`TrendResult::DEGENERATE`]. Callers filter
/// out uncertain records before calling.
pub fn trend(years: &[i32], values: &[f64]) -> TrendResult {
    if years.len() != values.len() || years.len() < 2 {
        return TrendResult::DEGENERATE;
    }
    let n = years.len() as f64;
    let mean_x = years.iter().map(|&y| y as f64).sum::<f64>() / n;
    let mean_y = values.iter().sum::<f64>() / n;

    let (num, den) = years
        .iter()
        .zip(values)
        .fold((0.0, 0.0), |(num, den), (&x, &y)| {
            let dx = x as f64 - mean_x;
            (num + dx * (y - mean_y), den + dx * dx)
        });
    let slope = if den == 0.0 { 0.0 } else { num / den };

    let relative = if mean_y != 0.0 { slope / mean_y } else { 0.0 };
    let label = if relative.abs() < STABLE_THRESHOLD {
        TrendLabel::Stable
    } else if relative > 0.0 {
        TrendLabel::Rising
    } else {
        TrendLabel::Falling
    };

    let confidence = if years.len() == TRAILING_WINDOW {
        Confidence::High
    } else {
        Confidence::Low
    };

    TrendResult {
        slope,
        label,
        confidence,
    }
}

/// Parallel year/value sample fed to [`trend`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendInput {
    pub years: Vec<i32>,
    pub values: Vec<f64>,
}

impl TrendInput {
    fn push(&mut self, year: i32, value: f64) {
        self.years.push(year);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn estimate(&self) -> TrendResult {
        trend(&self.years, &self.values)
    }
}

/// Years `year - 3 ..= year`, clipped at the dataset's first year.
fn window_years(store: &Store, year: i32) -> impl Iterator<Item = i32> {
    let lower = store.year_range().map_or(i32::MIN, |(lo, _)| lo);
    let start = year.saturating_sub(TRAILING_WINDOW as i32 - 1).max(lower);
    start..=year
}

/// Trailing window for one entity: only years with a non-uncertain record.
/// Unknown ids give an empty window.
pub fn entity_window(store: &Store, id: &str, year: i32) -> TrendInput {
    let mut input = TrendInput::default();
    let Some(entity) = store.get_by_id(id) else {
        return input;
    };
    for y in window_years(store, year) {
        if let Some(rec) = entity.reliable_record(y) {
            input.push(y, rec.absolute);
        }
    }
    input
}

/// Trailing window of region totals. Years where the region total is not
/// strictly positive are skipped.
pub fn region_window(store: &Store, region: &str, year: i32) -> TrendInput {
    let mut input = TrendInput::default();
    for y in window_years(store, year) {
        let agg = aggregate(store, region, y);
        if agg.absolute > 0.0 {
            input.push(y, agg.absolute);
        }
    }
    input
}
