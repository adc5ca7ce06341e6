//! Baseline vs variant comparison

use serde::{Deserialize, Serialize};
use tracing::info;

use super::clock::{Clock, MonotonicClock};
use super::measure::Measurer;
use super::report::ComparisonReport;
use super::sample::{BenchResult, TimingSample};
use super::target::Benchmarkable;
use crate::config::{BenchConfig, WarmupPolicy};
use crate::error::{BenchError, Result, Side};

/// Two results and `baseline.best / variant.best`. Above 1 means the variant is faster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub baseline: BenchResult,
    pub variant: BenchResult,
    pub ratio: f64,
}

impl Comparison {
    pub fn variant_is_faster(&self) -> bool {
        self.ratio > 1.0
    }
}

/// Compare two samples by their best times.
///
/// The baseline is summarized first, so an empty baseline fails before the
/// variant is looked at.
pub fn compare(baseline: &TimingSample, variant: &TimingSample) -> Result<Comparison> {
    let baseline = BenchResult::from_sample(baseline)?;
    if baseline.best_ns <= 0.0 {
        return Err(BenchError::DegenerateTiming {
            side: Side::Baseline,
            best_ns: baseline.best_ns,
        });
    }

    let variant = BenchResult::from_sample(variant)?;
    if variant.best_ns <= 0.0 {
        return Err(BenchError::DegenerateTiming {
            side: Side::Variant,
            best_ns: variant.best_ns,
        });
    }

    let ratio = baseline.best_ns / variant.best_ns;
    Ok(Comparison {
        baseline,
        variant,
        ratio,
    })
}

/// Runs the full warm-up, calibrate, measure, compare pipeline
#[derive(Debug)]
pub struct Comparator<C: Clock = MonotonicClock> {
    measurer: Measurer<C>,
    repeats: usize,
    loops_per_repeat: Option<u64>,
    warmup: WarmupPolicy,
}

impl Comparator<MonotonicClock> {
    pub fn from_config(config: &BenchConfig) -> Result<Self> {
        Ok(Self {
            measurer: Measurer::from_config(config)?,
            repeats: config.repeats,
            loops_per_repeat: config.loops_per_repeat,
            warmup: config.warmup,
        })
    }
}

impl<C: Clock> Comparator<C> {
    pub fn with_measurer(measurer: Measurer<C>, config: &BenchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            measurer,
            repeats: config.repeats,
            loops_per_repeat: config.loops_per_repeat,
            warmup: config.warmup,
        })
    }

    pub fn measurer(&self) -> &Measurer<C> {
        &self.measurer
    }

    /// Time both targets and compare them. The baseline is handled first.
    pub fn compare_targets<B, V>(&self, name: &str, baseline: &mut B, variant: &mut V) -> Result<ComparisonReport>
    where
        B: Benchmarkable + ?Sized,
        V: Benchmarkable + ?Sized,
    {
        let (baseline_sample, baseline_loops, baseline_warmup) = self.run_side(baseline)?;
        let (variant_sample, variant_loops, variant_warmup) = self.run_side(variant)?;

        let comparison = compare(&baseline_sample, &variant_sample)?;
        info!(
            comparison = name,
            baseline_best_ns = comparison.baseline.best_ns,
            variant_best_ns = comparison.variant.best_ns,
            ratio = comparison.ratio,
            "Comparison finished"
        );

        Ok(ComparisonReport {
            name: name.to_string(),
            baseline_name: baseline.name().to_string(),
            variant_name: variant.name().to_string(),
            comparison,
            baseline_loops,
            variant_loops,
            warmup: self.warmup,
            baseline_warmup_ns: baseline_warmup,
            variant_warmup_ns: variant_warmup,
            clock_resolution_ns: self.measurer.resolution_ns(),
        })
    }

    fn run_side<T>(&self, target: &mut T) -> Result<(TimingSample, u64, Option<f64>)>
    where
        T: Benchmarkable + ?Sized,
    {
        let warmup = self.measurer.warm_up(target, self.warmup)?;
        let loops = match self.loops_per_repeat {
            Some(loops) => loops,
            None => self.measurer.calibrate(target)?,
        };
        let sample = self.measurer.measure(target, self.repeats, loops)?;
        Ok((sample, loops, warmup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::clock::ManualClock;
    use crate::bench::target::BenchTarget;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::convert::Infallible;

    fn sample(values: &[f64]) -> TimingSample {
        TimingSample::from_nanos(values.iter().copied()).unwrap()
    }

    #[test]
    fn test_variant_five_times_faster() {
        let cmp = compare(&sample(&[10.0, 12.0, 11.0]), &sample(&[2.0, 3.0, 2.0])).unwrap();
        assert_eq!(cmp.ratio, 5.0);
        assert!(cmp.variant_is_faster());
        assert_eq!(cmp.baseline.best_ns, 10.0);
        assert_eq!(cmp.variant.best_ns, 2.0);
    }

    #[test]
    fn test_equal_samples() {
        let cmp = compare(&sample(&[5.0]), &sample(&[5.0])).unwrap();
        assert_eq!(cmp.ratio, 1.0);
        assert!(!cmp.variant_is_faster());
    }

    #[test]
    fn test_empty_baseline_fails_first() {
        // the variant is degenerate too, but the empty baseline wins
        let result = compare(&TimingSample::new(), &sample(&[0.0]));
        assert!(matches!(result, Err(BenchError::EmptySample)));
    }

    #[test]
    fn test_empty_variant() {
        let result = compare(&sample(&[3.0]), &TimingSample::new());
        assert!(matches!(result, Err(BenchError::EmptySample)));
    }

    #[test]
    fn test_zero_best_is_degenerate() {
        let result = compare(&sample(&[4.0, 2.0]), &sample(&[1.0, 0.0]));
        assert!(matches!(
            result,
            Err(BenchError::DegenerateTiming {
                side: Side::Variant,
                ..
            })
        ));

        let result = compare(&sample(&[0.0]), &sample(&[1.0]));
        assert!(matches!(
            result,
            Err(BenchError::DegenerateTiming {
                side: Side::Baseline,
                ..
            })
        ));
    }

    #[test]
    fn test_comparator_pipeline() {
        let clock = ManualClock::new(1);
        let config = BenchConfig {
            repeats: 4,
            ..Default::default()
        };
        let comparator = Comparator::with_measurer(Measurer::with_clock(&clock), &config).unwrap();

        let slow_first = Cell::new(true);
        let mut baseline = BenchTarget::new("plain", (), |_: &()| {
            clock.advance(200);
            Ok::<_, Infallible>(())
        });
        let mut variant = BenchTarget::new("lazy", (), |_: &()| {
            clock.advance(if slow_first.replace(false) { 1_000_000 } else { 40 });
            Ok::<_, Infallible>(())
        });

        let report = comparator.compare_targets("demo", &mut baseline, &mut variant).unwrap();
        assert_eq!(report.name, "demo");
        assert_eq!(report.baseline_name, "plain");
        assert_eq!(report.variant_name, "lazy");
        assert_eq!(report.comparison.baseline.count, 4);
        assert_eq!(report.comparison.variant.count, 4);
        // 200ns clears the 100ns threshold in one call, 40ns needs five
        assert_eq!(report.baseline_loops, 1);
        assert_eq!(report.variant_loops, 5);
        assert_eq!(report.variant_warmup_ns, Some(1_000_001.0));
        assert_eq!(report.baseline_warmup_ns, Some(201.0));
        // the one-time cost never reaches the sample
        assert!(report.comparison.variant.max_ns < 50.0);
        assert!(report.comparison.ratio > 4.0 && report.comparison.ratio < 5.1);
    }

    #[test]
    fn test_comparator_fixed_loops() {
        let clock = ManualClock::new(1);
        let config = BenchConfig {
            repeats: 2,
            loops_per_repeat: Some(10),
            warmup: WarmupPolicy::None,
            ..Default::default()
        };
        let comparator = Comparator::with_measurer(Measurer::with_clock(&clock), &config).unwrap();
        let mut a = BenchTarget::new("a", (), |_: &()| {
            clock.advance(10);
            Ok::<_, Infallible>(())
        });
        let mut b = BenchTarget::new("b", (), |_: &()| {
            clock.advance(10);
            Ok::<_, Infallible>(())
        });
        let report = comparator.compare_targets("same", &mut a, &mut b).unwrap();
        assert_eq!(report.baseline_loops, 10);
        assert_eq!(report.variant_loops, 10);
        assert_eq!(report.baseline_warmup_ns, None);
        assert!((report.comparison.ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_warmup_first_call_placement() {
        let run = |loops_per_repeat: Option<u64>| {
            let clock = ManualClock::new(1);
            let config = BenchConfig {
                repeats: 3,
                loops_per_repeat,
                warmup: WarmupPolicy::None,
                ..Default::default()
            };
            let comparator = Comparator::with_measurer(Measurer::with_clock(&clock), &config).unwrap();
            let mut plain = BenchTarget::new("plain", (), |_: &()| {
                clock.advance(500);
                Ok::<_, Infallible>(())
            });
            let first = Cell::new(true);
            let mut lazy = BenchTarget::new("lazy", (), |_: &()| {
                clock.advance(if first.replace(false) { 100_000 } else { 500 });
                Ok::<_, Infallible>(())
            });
            comparator.compare_targets("none", &mut plain, &mut lazy).unwrap()
        };

        // fixed loops: the slow first call lands in the first repeat
        let fixed = run(Some(1));
        assert_eq!(fixed.variant_warmup_ns, None);
        assert_eq!(fixed.comparison.variant.max_ns, 100_001.0);
        assert_eq!(fixed.comparison.variant.best_ns, 501.0);

        // calibrated: calibration absorbs the first call
        let calibrated = run(None);
        assert_eq!(calibrated.variant_loops, 1);
        assert_eq!(calibrated.comparison.variant.max_ns, 501.0);
    }

    #[test]
    fn test_comparator_propagates_invocation_error() {
        let config = BenchConfig {
            repeats: 2,
            loops_per_repeat: Some(3),
            ..Default::default()
        };
        let comparator = Comparator::from_config(&config).unwrap();
        let mut ok = BenchTarget::infallible("ok", (), |_| 1u32);
        let mut broken = BenchTarget::new("broken", (), |_: &()| {
            Err::<u32, _>(anyhow::anyhow!("invalid input"))
        });
        let result = comparator.compare_targets("bad", &mut ok, &mut broken);
        match result {
            Err(BenchError::Invocation { target, .. }) => assert_eq!(target, "broken"),
            other => panic!("expected invocation error, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn compare_is_antisymmetric(
            a in prop::collection::vec(1e-3f64..1e9, 1..32),
            b in prop::collection::vec(1e-3f64..1e9, 1..32),
        ) {
            let a = TimingSample::from_nanos(a).unwrap();
            let b = TimingSample::from_nanos(b).unwrap();
            let ab = compare(&a, &b).unwrap().ratio;
            let ba = compare(&b, &a).unwrap().ratio;
            prop_assert!(ab > 0.0);
            prop_assert!((ab - 1.0 / ba).abs() <= 1e-9 * ab.max(1.0 / ba));
        }
    }
}
