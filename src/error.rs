//! Error taxonomy for measurement and comparison

use thiserror::Error;

use crate::bench::sample::TimingSample;

/// Which side of a comparison an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Baseline,
    Variant,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Baseline => f.write_str("baseline"),
            Side::Variant => f.write_str("variant"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BenchError {
    /// `best_of` on a sample with no recorded durations
    #[error("timing sample is empty")]
    EmptySample,

    /// Best time at or below zero: the clock is too coarse for the loop count
    #[error("degenerate timing on {side}: best {best_ns}ns is not positive, increase loops_per_repeat")]
    DegenerateTiming { side: Side, best_ns: f64 },

    /// The target itself failed; the benchmark is invalid
    #[error("target `{target}` failed")]
    Invocation {
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid sample: {0}")]
    InvalidSample(String),

    /// A repeat overran its deadline. `completed` holds only whole repeats.
    #[error("target `{target}` timed out after {} complete repeats", .completed.len())]
    Timeout {
        target: String,
        completed: TimingSample,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BenchError {
    pub fn invalid_config<T: Into<String>>(msg: T) -> Self {
        BenchError::InvalidConfig(msg.into())
    }

    pub fn invalid_sample<T: Into<String>>(msg: T) -> Self {
        BenchError::InvalidSample(msg.into())
    }

    pub fn invocation<T: Into<String>>(target: T, source: anyhow::Error) -> Self {
        BenchError::Invocation {
            target: target.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
