//! Distribution summaries for per-element samples.

use serde::{Deserialize, Serialize};

/// Summary statistics over a non-empty sequence of samples.
///
/// `std_dev` is the population standard deviation. For an even sample count
/// the median is the midpoint of the two central values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl DistributionStats {
    /// Summarize a set of samples, or `None` if the set is empty.
    ///
    /// The samples are sorted before accumulation so the result does not
    /// depend on the order they were collected in.
    pub fn from_samples(mut samples: Vec<f64>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_by(f64::total_cmp);

        let n = samples.len();
        let min = samples[0];
        let max = samples[n - 1];

        let sum: f64 = samples.iter().sum();
        let mean = sum / n as f64;

        let median = if n % 2 == 1 {
            samples[n / 2]
        } else {
            (samples[n / 2 - 1] + samples[n / 2]) * 0.5
        };

        let variance: f64 = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n as f64;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}
