//! Configuration module

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{BenchError, Result};

/// Default config file, overridden by `ACCEL_BENCH_CONFIG`
pub const DEFAULT_CONFIG_PATH: &str = "config/accel-bench.json";

/// Main configuration struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Timed blocks per target
    pub repeats: usize,

    /// Calls per timed block. `None` calibrates against clock resolution.
    pub loops_per_repeat: Option<u64>,

    /// A calibrated block must last this many clock ticks
    pub min_block_factor: f64,

    /// Absolute floor for a calibrated block
    pub min_block_ns: u64,

    /// Calibration never goes beyond this many calls per block
    pub max_loops: u64,

    /// First-call handling
    pub warmup: WarmupPolicy,

    /// Abort a repeat that runs longer than this
    pub repeat_timeout_ms: Option<u64>,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json_output: bool,
}

/// What to do with the first invocations of a target, which may pay one-time
/// costs (lazy initialization, page faults, cold caches)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarmupPolicy {
    /// No dedicated warm-up. With calibrated loops the calibration blocks
    /// still run first, so the first call never reaches the sample; only a
    /// fixed `loops_per_repeat` times it like any other call.
    None,
    /// Untimed calls before calibration
    Discard { calls: u32 },
    /// Time the first call alone and report it as warm-up cost
    Measure,
}

impl Default for WarmupPolicy {
    fn default() -> Self {
        WarmupPolicy::Measure
    }
}

impl std::fmt::Display for WarmupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarmupPolicy::None => f.write_str("none"),
            WarmupPolicy::Discard { calls } => write!(f, "discard:{calls}"),
            WarmupPolicy::Measure => f.write_str("measure"),
        }
    }
}

impl FromStr for WarmupPolicy {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(WarmupPolicy::None),
            "measure" => Ok(WarmupPolicy::Measure),
            other => {
                let calls = other
                    .strip_prefix("discard:")
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| {
                        BenchError::invalid_config(format!(
                            "unknown warmup policy `{other}` (expected none, measure or discard:N)"
                        ))
                    })?;
                Ok(WarmupPolicy::Discard { calls })
            }
        }
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            repeats: 7,
            loops_per_repeat: None,
            min_block_factor: 100.0,
            min_block_ns: 0,
            max_loops: 1_000_000_000,
            warmup: WarmupPolicy::default(),
            repeat_timeout_ms: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_output: false,
        }
    }
}

impl BenchConfig {
    /// Load config from environment
    pub fn from_env() -> Result<Self> {
        let config_path = std::env::var("ACCEL_BENCH_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&config_path).exists() {
            Self::load(&config_path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `ACCEL_BENCH_REPEATS` and `ACCEL_BENCH_LOOPS` when set
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(repeats) = std::env::var("ACCEL_BENCH_REPEATS") {
            self.repeats = repeats.parse().map_err(|_| {
                BenchError::invalid_config(format!("ACCEL_BENCH_REPEATS=`{repeats}` is not a count"))
            })?;
        }
        if let Ok(loops) = std::env::var("ACCEL_BENCH_LOOPS") {
            let loops = loops.parse().map_err(|_| {
                BenchError::invalid_config(format!("ACCEL_BENCH_LOOPS=`{loops}` is not a count"))
            })?;
            self.loops_per_repeat = Some(loops);
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BenchConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.repeats == 0 {
            return Err(BenchError::invalid_config("repeats must be at least 1"));
        }
        if self.loops_per_repeat == Some(0) {
            return Err(BenchError::invalid_config("loops_per_repeat must be at least 1"));
        }
        if !(self.min_block_factor.is_finite() && self.min_block_factor > 0.0) {
            return Err(BenchError::invalid_config("min_block_factor must be positive"));
        }
        if self.max_loops == 0 {
            return Err(BenchError::invalid_config("max_loops must be at least 1"));
        }
        if self.repeat_timeout_ms == Some(0) {
            return Err(BenchError::invalid_config("repeat_timeout_ms must be positive"));
        }
        Ok(())
    }
}
