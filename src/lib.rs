//! Accel Bench
//!
//! Micro-benchmark comparator for a plain baseline function and an
//! accelerated variant of it.
//!
//! ## Architecture
//! - Bench: targets, monotonic clock, measurement loop, calibration, comparison
//! - Config: JSON file + environment overrides
//! - Workloads: built-in baseline/variant pairs driven by the CLI
//!
//! ```no_run
//! use accel_bench::{BenchConfig, BenchTarget, Comparator};
//!
//! let comparator = Comparator::from_config(&BenchConfig::default())?;
//! let mut plain = BenchTarget::infallible("sum_loop", 10_000u64, |&n| {
//!     let mut s = 0u64;
//!     for i in 0..n {
//!         s += i;
//!     }
//!     s
//! });
//! let mut closed = BenchTarget::infallible("sum_closed", 10_000u64, |&n| n * (n - 1) / 2);
//! let report = comparator.compare_targets("sum", &mut plain, &mut closed)?;
//! println!("{report}");
//! # Ok::<(), accel_bench::BenchError>(())
//! ```

pub mod bench;
pub mod config;
pub mod error;
pub mod workloads;

pub use bench::{
    best_of, compare, measure, BenchResult, BenchTarget, Benchmarkable, Comparator, Comparison,
    ComparisonReport, Measurer, TimingSample,
};
pub use config::{BenchConfig, WarmupPolicy};
pub use error::{BenchError, Result, Side};
