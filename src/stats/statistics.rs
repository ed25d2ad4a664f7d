// src/stats/statistics.rs
//! Session statistics and hash rate arithmetic
//!
//! [`MiningStatistics`] is what `stop` returns and what the report prints.
//! Rates are 0 whenever no time has elapsed.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Final or live statistics of a mining session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MiningStatistics {
    /// Seconds between start and stop (or now, while running)
    pub elapsed_secs: f64,
    /// Total number of hashes computed
    pub hashes_computed: u64,
    /// `hashes_computed / elapsed_secs`, 0 when no time has elapsed
    pub average_rate: f64,
    /// Number of valid blocks found
    pub found_blocks: u64,
    /// Last nonce handed out to a worker
    pub last_nonce: u64,
}

impl MiningStatistics {
    /// Builds statistics from raw session counters
    pub fn new(elapsed: Duration, hashes_computed: u64, found_blocks: u64, last_nonce: u64) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        MiningStatistics {
            elapsed_secs,
            hashes_computed,
            average_rate: hash_rate(hashes_computed, elapsed_secs),
            found_blocks,
            last_nonce,
        }
    }
}

impl fmt::Display for MiningStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mining stopped after {:.2} seconds", self.elapsed_secs)?;
        writeln!(f, "Hashes computed: {}", self.hashes_computed)?;
        writeln!(f, "Average hash rate: {}", format_rate(self.average_rate))?;
        write!(f, "Blocks found: {}", self.found_blocks)
    }
}

/// Hashes per second, guarding against a zero or negative elapsed time
pub fn hash_rate(hashes: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        hashes as f64 / elapsed_secs
    } else {
        0.0
    }
}

/// Formats a hash rate with an SI prefix, e.g. `1.25 MH/s`
pub fn format_rate(rate: f64) -> String {
    const UNITS: [&str; 5] = ["H/s", "kH/s", "MH/s", "GH/s", "TH/s"];
    let mut value = rate;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_elapsed_gives_zero_rate() {
        let stats = MiningStatistics::new(Duration::ZERO, 10, 0, 10);
        assert_eq!(stats.average_rate, 0.0);
        assert_eq!(hash_rate(5, -1.0), 0.0);
    }

    #[test]
    fn average_rate_over_elapsed() {
        let stats = MiningStatistics::new(Duration::from_secs(4), 1000, 1, 1000);
        assert_eq!(stats.average_rate, 250.0);
        assert_eq!(stats.found_blocks, 1);
    }

    #[test]
    fn rate_units() {
        assert_eq!(format_rate(0.0), "0.00 H/s");
        assert_eq!(format_rate(999.0), "999.00 H/s");
        assert_eq!(format_rate(1_250_000.0), "1.25 MH/s");
    }

    #[test]
    fn report_lists_every_figure() {
        let report = MiningStatistics::new(Duration::from_secs(2), 200, 1, 200).to_string();
        assert!(report.contains("2.00 seconds"));
        assert!(report.contains("Hashes computed: 200"));
        assert!(report.contains("100.00 H/s"));
        assert!(report.contains("Blocks found: 1"));
    }
}
