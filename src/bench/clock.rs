//! Monotonic clock sources

use std::cell::Cell;
use std::time::Instant;

/// Consecutive reading pairs sampled when estimating resolution
const RESOLUTION_PROBES: usize = 1_000;

/// A clock that has not ticked after this many reads is treated as stopped
const MAX_SPINS: u32 = 100_000;

/// A monotonic time source reading in nanoseconds from an arbitrary origin
pub trait Clock {
    fn now_ns(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline(always)]
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}

/// `Instant`-backed wall clock
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now_ns(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Clock that advances a fixed step on every read. Test-only timing.
#[doc(hidden)]
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<u64>,
    step_ns: u64,
}

impl ManualClock {
    pub fn new(step_ns: u64) -> Self {
        Self {
            now: Cell::new(0),
            step_ns,
        }
    }

    /// Jump forward without a read
    pub fn advance(&self, ns: u64) {
        self.now.set(self.now.get() + ns);
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        let t = self.now.get();
        self.now.set(t + self.step_ns);
        t
    }
}

/// Smallest non-zero gap between consecutive readings, floored at 1ns.
pub fn resolution_ns<C: Clock + ?Sized>(clock: &C) -> f64 {
    let mut smallest = u64::MAX;
    let mut last = clock.now_ns();
    for _ in 0..RESOLUTION_PROBES {
        // spin until the reading changes
        let mut next = clock.now_ns();
        let mut spins = 0;
        while next == last && spins < MAX_SPINS {
            next = clock.now_ns();
            spins += 1;
        }
        if next <= last {
            break;
        }
        smallest = smallest.min(next - last);
        last = next;
    }
    if smallest == u64::MAX {
        1.0
    } else {
        smallest.max(1) as f64
    }
}

/// Average cost of one reading, from back-to-back reads
pub fn read_cost_ns<C: Clock + ?Sized>(clock: &C) -> f64 {
    let first = clock.now_ns();
    let mut last = first;
    for _ in 0..RESOLUTION_PROBES {
        last = clock.now_ns();
    }
    last.saturating_sub(first) as f64 / RESOLUTION_PROBES as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_steps() {
        let clock = ManualClock::new(25);
        assert_eq!(clock.now_ns(), 0);
        assert_eq!(clock.now_ns(), 25);
        clock.advance(100);
        assert_eq!(clock.now_ns(), 150);
    }

    #[test]
    fn test_resolution_of_manual_clock() {
        let clock = ManualClock::new(40);
        assert_eq!(resolution_ns(&clock), 40.0);
    }

    #[test]
    fn test_read_cost_of_manual_clock() {
        assert_eq!(read_cost_ns(&ManualClock::new(3)), 3.0);
        assert_eq!(read_cost_ns(&ManualClock::new(0)), 0.0);
    }

    #[test]
    fn test_stopped_clock_floors_at_one() {
        let clock = ManualClock::new(0);
        assert_eq!(resolution_ns(&clock), 1.0);
    }

    #[test]
    fn test_monotonic_resolution_is_sane() {
        let clock = MonotonicClock::new();
        let res = resolution_ns(&clock);
        assert!(res >= 1.0);
        assert!(res < 1_000_000.0, "resolution {res}ns is implausibly coarse");
    }

    #[test]
    fn test_monotonic_never_goes_back() {
        let clock = MonotonicClock::new();
        let mut last = clock.now_ns();
        for _ in 0..10_000 {
            let now = clock.now_ns();
            assert!(now >= last);
            last = now;
        }
    }
}
