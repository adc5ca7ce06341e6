//! Measurement loop, loop-count calibration and warm-up handling

use tracing::{debug, warn};

use super::clock::{read_cost_ns, resolution_ns, Clock, MonotonicClock};
use super::sample::TimingSample;
use super::target::Benchmarkable;
use crate::config::{BenchConfig, WarmupPolicy};
use crate::error::{BenchError, Result};

/// With a timeout, a block checks its deadline at most this many times
const DEADLINE_CHECKS: u64 = 64;

/// Times targets against one clock
#[derive(Debug)]
pub struct Measurer<C: Clock = MonotonicClock> {
    clock: C,
    resolution_ns: f64,
    read_cost_ns: f64,
    min_block_factor: f64,
    min_block_ns: u64,
    max_loops: u64,
    repeat_timeout_ns: Option<u64>,
}

impl Measurer<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }

    pub fn from_config(config: &BenchConfig) -> Result<Self> {
        Self::with_clock_and_config(MonotonicClock::new(), config)
    }
}

impl Default for Measurer<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Measurer<C> {
    pub fn with_clock(clock: C) -> Self {
        let defaults = BenchConfig::default();
        let resolution = resolution_ns(&clock);
        let read_cost = read_cost_ns(&clock);
        debug!(resolution_ns = resolution, read_cost_ns = read_cost, "Clock resolution estimated");
        Self {
            clock,
            resolution_ns: resolution,
            read_cost_ns: read_cost,
            min_block_factor: defaults.min_block_factor,
            min_block_ns: defaults.min_block_ns,
            max_loops: defaults.max_loops,
            repeat_timeout_ns: None,
        }
    }

    pub fn with_clock_and_config(clock: C, config: &BenchConfig) -> Result<Self> {
        config.validate()?;
        let mut measurer = Self::with_clock(clock);
        measurer.min_block_factor = config.min_block_factor;
        measurer.min_block_ns = config.min_block_ns;
        measurer.max_loops = config.max_loops;
        measurer.repeat_timeout_ns = config.repeat_timeout_ms.map(|ms| ms.saturating_mul(1_000_000));
        Ok(measurer)
    }

    /// Abort any repeat that runs longer than `timeout_ns`
    pub fn with_repeat_timeout_ns(mut self, timeout_ns: u64) -> Self {
        self.repeat_timeout_ns = Some(timeout_ns);
        self
    }

    pub fn resolution_ns(&self) -> f64 {
        self.resolution_ns
    }

    /// Shortest block calibration accepts
    pub fn min_block_threshold_ns(&self) -> f64 {
        (self.resolution_ns * self.min_block_factor).max(self.min_block_ns as f64)
    }

    /// Run `repeats` blocks of `loops_per_repeat` calls and record the per-call
    /// cost of each block. Any target failure aborts the whole measurement.
    pub fn measure<T>(&self, target: &mut T, repeats: usize, loops_per_repeat: u64) -> Result<TimingSample>
    where
        T: Benchmarkable + ?Sized,
    {
        if repeats == 0 {
            return Err(BenchError::invalid_config("repeats must be at least 1"));
        }
        if loops_per_repeat == 0 {
            return Err(BenchError::invalid_config("loops_per_repeat must be at least 1"));
        }

        let mut sample = TimingSample::with_capacity(repeats);
        for repeat in 0..repeats {
            let elapsed = match self.time_block(target, loops_per_repeat)? {
                Some(elapsed) => elapsed,
                None => {
                    warn!(
                        target_name = target.name(),
                        repeat,
                        "Repeat exceeded timeout, partial block discarded"
                    );
                    return Err(BenchError::Timeout {
                        target: target.name().to_string(),
                        completed: sample,
                    });
                }
            };
            let per_call = elapsed / loops_per_repeat as f64;
            debug!(target_name = target.name(), repeat, elapsed_ns = elapsed, per_call_ns = per_call, "Repeat done");
            sample.push(per_call)?;
        }
        Ok(sample)
    }

    /// Smallest 1-2-5 loop count whose block clears the minimum block
    /// threshold, capped at `max_loops`
    pub fn calibrate<T>(&self, target: &mut T) -> Result<u64>
    where
        T: Benchmarkable + ?Sized,
    {
        let threshold = self.min_block_threshold_ns();
        let mut base = 1u64;
        loop {
            for step in [1u64, 2, 5] {
                let loops = base.saturating_mul(step).min(self.max_loops);
                let elapsed = self.time_block(target, loops)?.ok_or_else(|| BenchError::Timeout {
                    target: target.name().to_string(),
                    completed: TimingSample::new(),
                })?;
                debug!(target_name = target.name(), loops, elapsed_ns = elapsed, threshold_ns = threshold, "Calibration step");

                if elapsed >= threshold {
                    return Ok(loops);
                }
                if loops >= self.max_loops {
                    warn!(
                        target_name = target.name(),
                        loops,
                        elapsed_ns = elapsed,
                        threshold_ns = threshold,
                        "Calibration hit max_loops below threshold, timings may be dominated by clock overhead"
                    );
                    return Ok(loops);
                }
            }
            base = base.saturating_mul(10);
        }
    }

    /// Apply the warm-up policy. Returns the first call's cost under `Measure`.
    pub fn warm_up<T>(&self, target: &mut T, policy: WarmupPolicy) -> Result<Option<f64>>
    where
        T: Benchmarkable + ?Sized,
    {
        match policy {
            WarmupPolicy::None => Ok(None),
            WarmupPolicy::Discard { calls } => {
                for _ in 0..calls {
                    target.invoke()?;
                }
                debug!(target_name = target.name(), calls, "Warm-up calls discarded");
                Ok(None)
            }
            WarmupPolicy::Measure => {
                let start = self.clock.now_ns();
                target.invoke()?;
                let cost = self.clock.now_ns().saturating_sub(start) as f64;
                debug!(target_name = target.name(), warmup_ns = cost, "First call timed");
                Ok(Some(cost))
            }
        }
    }

    /// Elapsed nanoseconds for `loops` calls, or `None` on timeout.
    ///
    /// With a deadline the block is split into chunks and the clock is read
    /// only between chunks; the cost of those extra reads is subtracted.
    fn time_block<T>(&self, target: &mut T, loops: u64) -> Result<Option<f64>>
    where
        T: Benchmarkable + ?Sized,
    {
        let start = self.clock.now_ns();
        let Some(limit) = self.repeat_timeout_ns else {
            for _ in 0..loops {
                target.invoke()?;
            }
            return Ok(Some(self.clock.now_ns().saturating_sub(start) as f64));
        };

        let chunk = (loops / DEADLINE_CHECKS).max(1);
        let mut done = 0u64;
        let mut reads = 0u64;
        let mut elapsed = 0u64;
        while done < loops {
            let n = chunk.min(loops - done);
            for _ in 0..n {
                target.invoke()?;
            }
            done += n;
            reads += 1;
            elapsed = self.clock.now_ns().saturating_sub(start);
            if elapsed > limit {
                return Ok(None);
            }
        }
        let overhead = reads.saturating_sub(1) as f64 * self.read_cost_ns;
        Ok(Some((elapsed as f64 - overhead).max(0.0)))
    }
}

/// Measure on the system monotonic clock
pub fn measure<T>(target: &mut T, repeats: usize, loops_per_repeat: u64) -> Result<TimingSample>
where
    T: Benchmarkable + ?Sized,
{
    Measurer::new().measure(target, repeats, loops_per_repeat)
}
