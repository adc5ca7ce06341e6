//! Text and JSON reporting

use serde::{Deserialize, Serialize};

use super::compare::Comparison;
use super::sample::format_ns;
use crate::config::WarmupPolicy;

/// Everything known about one finished comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub name: String,
    pub baseline_name: String,
    pub variant_name: String,
    pub comparison: Comparison,
    pub baseline_loops: u64,
    pub variant_loops: u64,
    pub warmup: WarmupPolicy,
    /// First-call cost, kept out of the sample
    pub baseline_warmup_ns: Option<f64>,
    pub variant_warmup_ns: Option<f64>,
    pub clock_resolution_ns: f64,
}

impl ComparisonReport {
    pub fn ratio(&self) -> f64 {
        self.comparison.ratio
    }

    /// How many steady-state variant calls the variant's warm-up is worth
    pub fn variant_warmup_calls(&self) -> Option<f64> {
        self.variant_warmup_ns
            .map(|w| w / self.comparison.variant.best_ns)
    }
}

impl std::fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cmp = &self.comparison;
        writeln!(f, "── {} ──", self.name)?;
        writeln!(
            f,
            "  baseline {:<28} {}  ({} loops)",
            self.baseline_name, cmp.baseline, self.baseline_loops
        )?;
        writeln!(
            f,
            "  variant  {:<28} {}  ({} loops)",
            self.variant_name, cmp.variant, self.variant_loops
        )?;
        if let (Some(b), Some(v)) = (self.baseline_warmup_ns, self.variant_warmup_ns) {
            write!(
                f,
                "  first call: baseline {} | variant {}",
                format_ns(b),
                format_ns(v)
            )?;
            if let Some(calls) = self.variant_warmup_calls() {
                write!(f, " (= {calls:.0} steady variant calls)")?;
            }
            writeln!(f)?;
        }
        let verdict = if cmp.ratio >= 1.0 { "faster" } else { "slower" };
        let factor = if cmp.ratio >= 1.0 { cmp.ratio } else { 1.0 / cmp.ratio };
        write!(
            f,
            "  speedup: {:.2}x (variant {:.2}x {})",
            cmp.ratio, factor, verdict
        )
    }
}

/// Render a batch of reports for the terminal
pub fn render_text(reports: &[ComparisonReport]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&report.to_string());
        out.push_str("\n\n");
    }
    if let Some(best) = reports.iter().max_by(|a, b| a.ratio().total_cmp(&b.ratio())) {
        out.push_str(&format!(
            "Largest speedup: {} at {:.2}x\n",
            best.name,
            best.ratio()
        ));
    }
    out
}

pub fn render_json(reports: &[ComparisonReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::compare::compare;
    use crate::bench::sample::TimingSample;

    fn report(name: &str, baseline: &[f64], variant: &[f64]) -> ComparisonReport {
        let comparison = compare(
            &TimingSample::from_nanos(baseline.iter().copied()).unwrap(),
            &TimingSample::from_nanos(variant.iter().copied()).unwrap(),
        )
        .unwrap();
        ComparisonReport {
            name: name.to_string(),
            baseline_name: "plain".to_string(),
            variant_name: "fast".to_string(),
            comparison,
            baseline_loops: 100,
            variant_loops: 1_000,
            warmup: WarmupPolicy::Measure,
            baseline_warmup_ns: Some(1_200.0),
            variant_warmup_ns: Some(2_000_000.0),
            clock_resolution_ns: 20.0,
        }
    }

    #[test]
    fn test_display_contains_bests_and_ratio() {
        let text = report("poly", &[10.0, 12.0, 11.0], &[2.0, 3.0, 2.0]).to_string();
        assert!(text.contains("poly"));
        assert!(text.contains("10.00 ns"));
        assert!(text.contains("2.00 ns"));
        assert!(text.contains("speedup: 5.00x"));
        assert!(text.contains(
            "first call: baseline 1.200 µs | variant 2.000 ms (= 1000000 steady variant calls)"
        ));
    }

    #[test]
    fn test_display_slower_variant() {
        let text = report("regress", &[2.0], &[8.0]).to_string();
        assert!(text.contains("speedup: 0.25x (variant 4.00x slower)"));
    }

    #[test]
    fn test_warmup_in_steady_calls() {
        let r = report("fib", &[100.0], &[4.0]);
        assert_eq!(r.variant_warmup_calls(), Some(500_000.0));
    }

    #[test]
    fn test_render_text_names_largest() {
        let reports = vec![
            report("a", &[10.0], &[5.0]),
            report("b", &[30.0], &[3.0]),
        ];
        let text = render_text(&reports);
        assert!(text.contains("Largest speedup: b at 10.00x"));
    }

    #[test]
    fn test_render_json() {
        let reports = vec![report("poly", &[10.0], &[2.0])];
        let json = render_json(&reports).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "poly");
        assert_eq!(value[0]["comparison"]["ratio"], 5.0);
        assert_eq!(value[0]["warmup"]["kind"], "measure");
        let back: Vec<ComparisonReport> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reports);
    }
}
