//! Fuzz run configuration and a deterministic sweep runner

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Environment variable overriding the number of generated cases
pub const CASES_ENV: &str = "SKYTRACK_FUZZ_CASES";

// ============================================================================
// Configuration
// ============================================================================

/// Fuzz test configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzConfig {
    /// Number of test cases to run
    pub cases: u32,
    /// Maximum shrink iterations on failure
    pub max_shrink_iters: u32,
    /// Fixed RNG seed (0 = random)
    pub seed: u64,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
            seed: 0,
        }
    }
}

impl FuzzConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with `SKYTRACK_FUZZ_CASES` applied when set and valid.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(CASES_ENV).ok().and_then(|v| v.parse().ok()) {
            Some(n) => config.cases(n),
            None => config,
        }
    }

    pub fn cases(mut self, n: u32) -> Self {
        self.cases = n;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = s;
        self
    }

    /// Generate proptest config from this
    pub fn to_proptest_config(&self) -> proptest::test_runner::Config {
        let mut config = proptest::test_runner::Config::default();
        config.cases = self.cases;
        config.max_shrink_iters = self.max_shrink_iters;
        if self.seed != 0 {
            config.rng_algorithm = proptest::test_runner::RngAlgorithm::ChaCha;
        }
        config
    }
}

// ============================================================================
// Results
// ============================================================================

/// Details of a test failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzFailure {
    pub case: u64,
    pub message: String,
}

/// Result of a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzResult {
    pub name: String,
    pub cases_run: u64,
    pub cases_failed: u64,
    pub duration_ms: u64,
    pub failures: Vec<FuzzFailure>,
}

impl FuzzResult {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cases_run: 0,
            cases_failed: 0,
            duration_ms: 0,
            failures: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.cases_failed == 0
    }

    fn finalize(&mut self, duration: Duration) {
        self.duration_ms = duration.as_millis() as u64;
    }

    /// One-line summary, with up to five failures listed after it
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{}: {} cases, {} failed, {} ms",
            self.name, self.cases_run, self.cases_failed, self.duration_ms
        );
        for f in self.failures.iter().take(5) {
            out.push_str(&format!("\n  [case {}] {}", f.case, f.message));
        }
        if self.failures.len() > 5 {
            out.push_str(&format!("\n  ... and {} more", self.failures.len() - 5));
        }
        out
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Runs an indexed check over `cases` inputs and collects every failure,
/// for sweeps where the index itself defines the input (day number, grid
/// cell) rather than a random draw.
pub struct FuzzRunner {
    config: FuzzConfig,
    results: Vec<FuzzResult>,
}

impl FuzzRunner {
    pub fn new(config: FuzzConfig) -> Self {
        Self {
            config,
            results: Vec::new(),
        }
    }

    pub fn run<F>(&mut self, name: &str, test_fn: F) -> &FuzzResult
    where
        F: Fn(u64) -> Result<(), String>,
    {
        let mut result = FuzzResult::new(name);
        let start = Instant::now();

        for i in 0..self.config.cases as u64 {
            result.cases_run += 1;
            if let Err(message) = test_fn(i) {
                result.cases_failed += 1;
                result.failures.push(FuzzFailure { case: i, message });
            }
        }

        result.finalize(start.elapsed());
        self.results.push(result);
        &self.results[self.results.len() - 1]
    }

    pub fn results(&self) -> &[FuzzResult] {
        &self.results
    }

    /// Export results to JSON
    pub fn export_json(&self) -> String {
        serde_json::to_string_pretty(&self.results).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = FuzzConfig::default();
        assert_eq!(config.cases, 256);
        assert_eq!(config.to_proptest_config().cases, 256);
        assert_eq!(FuzzConfig::new().cases(10).to_proptest_config().cases, 10);
    }

    #[test]
    fn test_runner_with_failures() {
        let mut runner = FuzzRunner::new(FuzzConfig::new().cases(100));

        let result = runner.run("test_some_fail", |i| {
            if i % 10 == 0 {
                Err(format!("Failed at {}", i))
            } else {
                Ok(())
            }
        });

        assert!(!result.passed());
        assert_eq!(result.cases_failed, 10);
        assert_eq!(result.cases_run, 100);
        assert!(result.summary().contains("... and 5 more"));
        assert!(runner.export_json().contains("test_some_fail"));
    }
}
