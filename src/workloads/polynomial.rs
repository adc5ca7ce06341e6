//! Polynomial evaluation: per-term `powi` vs Horner's rule

use crate::bench::{BenchTarget, Comparator, ComparisonReport};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PolyArgs {
    /// Lowest degree first
    pub coeffs: Vec<f64>,
    pub xs: Vec<f64>,
}

impl PolyArgs {
    pub fn demo() -> Self {
        Self {
            coeffs: vec![1.0, -3.0, 0.5, 2.0, -0.25, 0.125],
            xs: (0..1_000).map(|i| i as f64 / 1_000.0).collect(),
        }
    }
}

/// Sum of `p(x)` over all points, one `powi` per term
pub fn eval_naive(args: &PolyArgs) -> f64 {
    let mut total = 0.0;
    for &x in &args.xs {
        for (i, c) in args.coeffs.iter().enumerate() {
            total += c * x.powi(i as i32);
        }
    }
    total
}

/// Same sum with Horner's rule
pub fn eval_horner(args: &PolyArgs) -> f64 {
    args.xs
        .iter()
        .map(|&x| args.coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c))
        .sum()
}

pub fn run(comparator: &Comparator) -> Result<ComparisonReport> {
    let mut baseline = BenchTarget::infallible("eval_naive", PolyArgs::demo(), eval_naive);
    let mut variant = BenchTarget::infallible("eval_horner", PolyArgs::demo(), eval_horner);
    comparator.compare_targets("polynomial", &mut baseline, &mut variant)
}
