//! Benchmark module
//! Baseline vs accelerated-variant latency comparison

pub mod clock;
pub mod compare;
pub mod measure;
pub mod report;
pub mod sample;
pub mod target;

pub use clock::{Clock, MonotonicClock};
pub use compare::{compare, Comparator, Comparison};
pub use measure::{measure, Measurer};
pub use report::ComparisonReport;
pub use sample::{best_of, BenchResult, TimingSample};
pub use target::{BenchTarget, Benchmarkable};
