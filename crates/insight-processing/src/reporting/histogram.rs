//! Equal-width histograms for numeric chart data.

use serde::{Deserialize, Serialize};

/// One histogram bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// `"{start:.2}-{end:.2}"`
    pub range: String,
    pub count: usize,
    pub bin_start: f64,
    pub bin_end: f64,
}

/// Bucket values into `bins` equal-width bins between their min and max.
///
/// Bins are half-open except the last, which also takes the maximum. When
/// every value is equal the range is widened to `value ± 0.5`. Non-finite
/// values are skipped; no values yields no bins.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    // divided before subtracting so a span near f64::MAX stays finite
    let width = max / bins as f64 - min / bins as f64;
    let edge = |i: usize| {
        if i == bins {
            max
        } else {
            min + width * i as f64
        }
    };

    let mut counts = vec![0usize; bins];
    for value in finite {
        let index = ((value / width - min / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let bin_start = edge(i);
            let bin_end = edge(i + 1);
            HistogramBin {
                range: format!("{bin_start:.2}-{bin_end:.2}"),
                count,
                bin_start,
                bin_end,
            }
        })
        .collect()
}
