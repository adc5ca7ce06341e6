//! Timing samples and the statistics derived from them

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// Per-call duration estimates in nanoseconds, one entry per repeat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct TimingSample {
    durations_ns: Vec<f64>,
}

impl TimingSample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            durations_ns: Vec::with_capacity(capacity),
        }
    }

    /// Build a sample from raw values. Every value must be finite and non-negative.
    pub fn from_nanos(values: impl IntoIterator<Item = f64>) -> Result<Self> {
        let mut sample = Self::new();
        for value in values {
            sample.push(value)?;
        }
        Ok(sample)
    }

    pub fn push(&mut self, duration_ns: f64) -> Result<()> {
        if !duration_ns.is_finite() || duration_ns < 0.0 {
            return Err(BenchError::invalid_sample(format!(
                "duration {duration_ns} must be finite and non-negative"
            )));
        }
        self.durations_ns.push(duration_ns);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.durations_ns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations_ns.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.durations_ns
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.durations_ns.iter().copied()
    }
}

impl TryFrom<Vec<f64>> for TimingSample {
    type Error = BenchError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::from_nanos(values)
    }
}

impl From<TimingSample> for Vec<f64> {
    fn from(sample: TimingSample) -> Self {
        sample.durations_ns
    }
}

/// Minimum of the sample.
///
/// Noise from scheduling and allocator pauses only ever inflates a
/// measurement, so the minimum is the closest estimate of steady-state cost.
pub fn best_of(sample: &TimingSample) -> Result<f64> {
    sample
        .iter()
        .min_by(f64::total_cmp)
        .ok_or(BenchError::EmptySample)
}

/// Summary of one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchResult {
    pub best_ns: f64,
    pub mean_ns: f64,
    pub median_ns: f64,
    pub max_ns: f64,
    pub count: usize,
}

impl BenchResult {
    pub fn from_sample(sample: &TimingSample) -> Result<Self> {
        let best = best_of(sample)?;

        let mut sorted = sample.as_slice().to_vec();
        sorted.sort_unstable_by(f64::total_cmp);

        let count = sorted.len();
        let total: f64 = sorted.iter().sum();
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        Ok(Self {
            best_ns: best,
            mean_ns: total / count as f64,
            median_ns: median,
            max_ns: sorted[count - 1],
            count,
        })
    }

    /// Calls per second at the best observed cost
    pub fn throughput_ops(&self) -> f64 {
        if self.best_ns > 0.0 {
            1_000_000_000.0 / self.best_ns
        } else {
            f64::INFINITY
        }
    }
}

impl std::fmt::Display for BenchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "best: {:>10} | mean: {:>10} | max: {:>10} | {:>12.0} ops/s | n={}",
            format_ns(self.best_ns),
            format_ns(self.mean_ns),
            format_ns(self.max_ns),
            self.throughput_ops(),
            self.count
        )
    }
}

/// Render nanoseconds with the largest unit that keeps the value >= 1
pub fn format_ns(ns: f64) -> String {
    if ns >= 1_000_000_000.0 {
        format!("{:.3} s", ns / 1_000_000_000.0)
    } else if ns >= 1_000_000.0 {
        format!("{:.3} ms", ns / 1_000_000.0)
    } else if ns >= 1_000.0 {
        format!("{:.3} µs", ns / 1_000.0)
    } else {
        format!("{:.2} ns", ns)
    }
}
