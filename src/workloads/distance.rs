//! Pairwise Euclidean distance: nested vectors vs a flat row-major buffer

use crate::bench::{BenchTarget, Comparator, ComparisonReport};
use crate::error::Result;

/// Points stored both ways so each variant gets its natural layout
#[derive(Debug, Clone)]
pub struct PointSet {
    pub nested: Vec<Vec<f64>>,
    pub flat: Vec<f64>,
    pub dims: usize,
}

impl PointSet {
    /// Deterministic `count` x `dims` points
    pub fn grid(count: usize, dims: usize) -> Self {
        let nested: Vec<Vec<f64>> = (0..count)
            .map(|i| (0..dims).map(|d| ((i * 31 + d * 17) % 97) as f64 / 7.0).collect())
            .collect();
        let flat = nested.iter().flatten().copied().collect();
        Self { nested, flat, dims }
    }

    pub fn len(&self) -> usize {
        self.nested.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nested.is_empty()
    }
}

/// Full distance matrix as nested vectors
pub fn pairwise_nested(points: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut out = Vec::new();
    for a in points {
        let mut row = Vec::new();
        for b in points {
            let mut sum = 0.0;
            for k in 0..a.len() {
                let diff = a[k] - b[k];
                sum += diff * diff;
            }
            row.push(sum.sqrt());
        }
        out.push(row);
    }
    out
}

/// Full distance matrix, row-major, one allocation
pub fn pairwise_flat(points: &[f64], dims: usize) -> Vec<f64> {
    if dims == 0 {
        return Vec::new();
    }
    let n = points.len() / dims;
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        let a = &points[i * dims..(i + 1) * dims];
        for j in (i + 1)..n {
            let b = &points[j * dims..(j + 1) * dims];
            let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
            let d = sum.sqrt();
            out[i * n + j] = d;
            out[j * n + i] = d;
        }
    }
    out
}

pub fn run(comparator: &Comparator) -> Result<ComparisonReport> {
    let points = PointSet::grid(64, 3);
    let mut baseline = BenchTarget::infallible("pairwise_nested", points.clone(), |p| {
        pairwise_nested(&p.nested)
    });
    let mut variant = BenchTarget::infallible("pairwise_flat", points, |p| {
        pairwise_flat(&p.flat, p.dims)
    });
    comparator.compare_targets("pairwise-distance", &mut baseline, &mut variant)
}
