//! Configuration for the experiment harness.

use std::path::PathBuf;

/// Configuration for an [`Experiment`](crate::Experiment).
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Timed executions per (algorithm, instance) pair.
    pub iterations: usize,
    /// Emit console progress while validating and running.
    pub verbose: bool,
    /// Output directory for the JSON run record.
    pub output_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            iterations: 3,
            verbose: true,
            output_dir: PathBuf::from("target/runlab"),
        }
    }
}

impl ExperimentConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config from environment variables.
    ///
    /// Supported variables:
    /// - `RUNLAB_ITERATIONS`: timed executions per pair (default: 3)
    /// - `RUNLAB_VERBOSE`: console progress (default: true)
    /// - `RUNLAB_OUTPUT_DIR`: directory for JSON run records
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("RUNLAB_ITERATIONS") {
            if let Ok(n) = v.parse() {
                cfg.iterations = n;
            }
        }
        if let Ok(v) = std::env::var("RUNLAB_VERBOSE") {
            cfg.verbose = v != "0" && !v.eq_ignore_ascii_case("false");
        }
        if let Ok(v) = std::env::var("RUNLAB_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(v);
        }

        cfg
    }

    /// Set the number of timed executions per (algorithm, instance) pair.
    pub fn iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    /// Set verbose output.
    pub fn verbose(mut self, v: bool) -> Self {
        self.verbose = v;
        self
    }

    /// Set the output directory for JSON run records.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_defaults_when_env_not_set() {
        let cfg = ExperimentConfig::default();
        assert_eq!(cfg.iterations, 3);
        assert!(cfg.verbose);
        assert_eq!(cfg.output_dir, PathBuf::from("target/runlab"));
    }

    #[test]
    fn should_build_config_with_builder() {
        let cfg = ExperimentConfig::new()
            .iterations(10)
            .verbose(false)
            .output_dir("out/records");

        assert_eq!(cfg.iterations, 10);
        assert!(!cfg.verbose);
        assert_eq!(cfg.output_dir, PathBuf::from("out/records"));
    }
}
