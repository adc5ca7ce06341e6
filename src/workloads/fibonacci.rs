//! Fibonacci: naive recursion vs iteration, and vs a lazily built table

use std::cell::OnceCell;

use anyhow::anyhow;

use crate::bench::{BenchTarget, Comparator, ComparisonReport};
use crate::error::Result;

/// Largest n whose Fibonacci number fits in a u64
pub const MAX_FIB_N: u32 = 93;

/// Input for the demo comparisons
pub const DEMO_N: u32 = 24;

pub fn fib_recursive(n: u32) -> u64 {
    if n < 2 {
        n as u64
    } else {
        fib_recursive(n - 1) + fib_recursive(n - 2)
    }
}

/// `None` when the result overflows u64
pub fn fib_iterative(n: u32) -> Option<u64> {
    if n == 0 {
        return Some(0);
    }
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 1..n {
        let next = a.checked_add(b)?;
        a = b;
        b = next;
    }
    Some(b)
}

/// Every representable Fibonacci number, built on first lookup
#[derive(Debug, Default)]
pub struct LazyFibTable {
    table: OnceCell<Vec<u64>>,
}

impl LazyFibTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self) -> bool {
        self.table.get().is_some()
    }

    pub fn get(&self, n: u32) -> Option<u64> {
        let table = self.table.get_or_init(|| {
            let mut table = Vec::with_capacity(MAX_FIB_N as usize + 1);
            table.push(0);
            table.push(1);
            for i in 2..=MAX_FIB_N as usize {
                table.push(table[i - 1] + table[i - 2]);
            }
            table
        });
        table.get(n as usize).copied()
    }
}

pub fn run(comparator: &Comparator) -> Result<ComparisonReport> {
    let mut baseline = BenchTarget::infallible("fib_recursive", DEMO_N, |&n| fib_recursive(n));
    let mut variant = BenchTarget::new("fib_iterative", DEMO_N, |&n: &u32| {
        fib_iterative(n).ok_or_else(|| anyhow!("fib({n}) overflows u64"))
    });
    comparator.compare_targets("fibonacci", &mut baseline, &mut variant)
}

/// The table variant pays its build cost on the first call only
pub fn run_lazy(comparator: &Comparator) -> Result<ComparisonReport> {
    let mut baseline = BenchTarget::infallible("fib_recursive", DEMO_N, |&n| fib_recursive(n));
    let table = LazyFibTable::new();
    let mut variant = BenchTarget::new("lazy_fib_table", DEMO_N, move |&n: &u32| {
        table.get(n).ok_or_else(|| anyhow!("fib({n}) overflows u64"))
    });
    comparator.compare_targets("fibonacci-lazy", &mut baseline, &mut variant)
}
