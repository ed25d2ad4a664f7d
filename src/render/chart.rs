// src/render/chart.rs
//! Terminal line chart of the hash rate history

use crate::stats::sampler::Sample;
use crate::stats::statistics::format_rate;

/// Message printed instead of a chart when no sample was taken
pub const NO_DATA: &str = "No data to display";

/// Renders `samples` as a text chart at most `width` columns by `height` rows
///
/// One column per sample when they fit; otherwise samples are picked at
/// even intervals. The y axis starts at zero and ends at the highest rate.
pub fn render_chart(samples: &[Sample], width: usize, height: usize) -> String {
    if samples.is_empty() {
        return NO_DATA.to_string();
    }
    let height = height.max(2);
    let columns = width.clamp(1, samples.len());

    let picked: Vec<&Sample> = (0..columns)
        .map(|i| &samples[i * samples.len() / columns])
        .collect();
    let peak = picked
        .iter()
        .map(|s| s.hash_rate)
        .fold(0.0_f64, f64::max);
    let scale = if peak > 0.0 { peak } else { 1.0 };

    let levels: Vec<usize> = picked
        .iter()
        .map(|s| ((s.hash_rate / scale) * (height - 1) as f64).round() as usize)
        .collect();

    let labels = [format_rate(peak), format_rate(peak / 2.0), format_rate(0.0)];
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    let mut out = String::from("Hash rate over time\n");
    for row in (0..height).rev() {
        let label = if row == height - 1 {
            labels[0].as_str()
        } else if row == (height - 1) / 2 && row != 0 {
            labels[1].as_str()
        } else if row == 0 {
            labels[2].as_str()
        } else {
            ""
        };
        out.push_str(&format!("{:>width$} |", label, width = label_width));
        for level in &levels {
            out.push(if *level == row { '*' } else { ' ' });
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "{:>width$} +{}\n",
        "",
        "-".repeat(columns),
        width = label_width
    ));

    let first = format!("{:.1}s", picked[0].elapsed_secs);
    let last = format!("{:.1}s", picked[columns - 1].elapsed_secs);
    let gap = (columns + 1).saturating_sub(first.len() + last.len()).max(1);
    out.push_str(&format!(
        "{:>width$}  {}{}{}",
        "",
        first,
        " ".repeat(gap),
        last,
        width = label_width
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};

    fn samples(rates: &[f64]) -> Vec<Sample> {
        let start = Utc::now();
        rates
            .iter()
            .enumerate()
            .map(|(i, &rate)| Sample {
                timestamp: start + TimeDelta::seconds(i as i64),
                elapsed_secs: (i + 1) as f64,
                hashes: (rate * (i + 1) as f64) as u64,
                hash_rate: rate,
            })
            .collect()
    }

    #[test]
    fn empty_history_has_no_chart() {
        assert_eq!(render_chart(&[], 40, 10), NO_DATA);
    }

    #[test]
    fn one_point_per_sample_when_they_fit() {
        let chart = render_chart(&samples(&[100.0, 200.0, 300.0]), 40, 5);
        assert_eq!(chart.matches('*').count(), 3);
        assert!(chart.starts_with("Hash rate over time"));
        assert!(chart.contains("300.00 H/s"));
        assert!(chart.contains("1.0s"));
        assert!(chart.contains("3.0s"));
    }

    #[test]
    fn peak_is_on_the_top_row() {
        let chart = render_chart(&samples(&[10.0, 50.0]), 40, 4);
        let top = chart.lines().nth(1).unwrap();
        assert!(top.contains("50.00 H/s"));
        assert!(top.ends_with(" *"));
    }

    #[test]
    fn long_histories_are_downsampled() {
        let rates: Vec<f64> = (0..500).map(|i| i as f64).collect();
        let chart = render_chart(&samples(&rates), 60, 8);
        assert_eq!(chart.matches('*').count(), 60);
    }

    #[test]
    fn all_zero_rates_sit_on_the_axis() {
        let chart = render_chart(&samples(&[0.0, 0.0]), 10, 3);
        let bottom = chart.lines().nth(3).unwrap();
        assert!(bottom.ends_with("|**"));
    }
}
