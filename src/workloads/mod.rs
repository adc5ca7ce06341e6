//! Demo workloads: each pairs a plain baseline with an accelerated twin

pub mod distance;
pub mod fibonacci;
pub mod polynomial;

use tracing::{info, warn};

use crate::bench::{Comparator, ComparisonReport};
use crate::error::Result;

/// A named comparison the CLI can run
#[derive(Clone, Copy)]
pub struct Workload {
    pub name: &'static str,
    pub description: &'static str,
    run: fn(&Comparator) -> Result<ComparisonReport>,
}

impl Workload {
    pub fn run(&self, comparator: &Comparator) -> Result<ComparisonReport> {
        (self.run)(comparator)
    }
}

impl std::fmt::Debug for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workload").field("name", &self.name).finish()
    }
}

pub fn all() -> Vec<Workload> {
    vec![
        Workload {
            name: "polynomial",
            description: "per-term powi vs Horner's rule over 1000 points",
            run: polynomial::run,
        },
        Workload {
            name: "fibonacci",
            description: "naive recursion vs iteration",
            run: fibonacci::run,
        },
        Workload {
            name: "fibonacci-lazy",
            description: "naive recursion vs a table built on first call",
            run: fibonacci::run_lazy,
        },
        Workload {
            name: "pairwise-distance",
            description: "nested Vec distance matrix vs flat row-major buffer",
            run: distance::run,
        },
    ]
}

pub fn find(name: &str) -> Option<Workload> {
    all().into_iter().find(|w| w.name == name)
}

/// Run the selected workloads in order. A failed comparison is logged and
/// returned; it does not stop the rest.
pub fn run_all(comparator: &Comparator, only: Option<&str>) -> Vec<(&'static str, Result<ComparisonReport>)> {
    let mut results = Vec::new();
    for workload in all() {
        if only.is_some_and(|name| name != workload.name) {
            continue;
        }
        info!(workload = workload.name, "Running comparison");
        let result = workload.run(comparator);
        if let Err(e) = &result {
            warn!(workload = workload.name, error = %e, "Comparison failed, skipping");
        }
        results.push((workload.name, result));
    }
    results
}
