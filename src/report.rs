//! Pluggable progress observers for validation and run output.

use crate::result::RunRecord;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Observer for experiment lifecycle events.
///
/// All hooks default to no-ops; implement the ones you care about. Console
/// output is an observability side channel, not part of the measurement
/// contract, so sinks can be replaced or removed freely.
pub trait Progress: Send + Sync {
    /// Called before the validation pass executes any algorithm.
    fn validation_start(&self) {}

    /// Called when every algorithm agreed with the reference output.
    fn validation_passed(&self) {}

    /// Called once before the measurement loop starts.
    fn run_start(&self, _experiment: &str, _iterations: usize) {}

    /// Called before an algorithm's instances are measured.
    fn algorithm_start(&self, _name: &str) {}

    /// Called before the iterations for one instance.
    fn instance_start(&self, _size: u64) {}

    /// Called after each timed execution with the elapsed seconds.
    fn sample_recorded(&self, _seconds: f64) {}

    /// Called after an algorithm's last instance.
    fn algorithm_finished(&self, _name: &str) {}

    /// Called once after the measurement loop with the finished record.
    fn run_finished(&self, _record: &RunRecord) {}
}

/// Console observer printing incremental progress to stderr.
///
/// One line per algorithm: `Running measurement (algorithm=NAME): |n=10:...|`
/// with a dot per timed execution.
pub struct ConsoleProgress;

impl ConsoleProgress {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for ConsoleProgress {
    fn validation_start(&self) {
        eprint!("Validating algorithms...");
        std::io::stderr().flush().ok();
    }

    fn validation_passed(&self) {
        eprintln!("ok");
    }

    fn algorithm_start(&self, name: &str) {
        eprint!("Running measurement (algorithm={}): ", name);
        std::io::stderr().flush().ok();
    }

    fn instance_start(&self, size: u64) {
        eprint!("|n={}:", size);
        std::io::stderr().flush().ok();
    }

    fn sample_recorded(&self, _seconds: f64) {
        eprint!(".");
        std::io::stderr().flush().ok();
    }

    fn algorithm_finished(&self, _name: &str) {
        eprintln!("|");
    }
}

/// Writes the run record to `<output_dir>/<experiment>.json` after each run.
pub struct JsonSink {
    output_dir: PathBuf,
}

impl JsonSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl Progress for JsonSink {
    fn run_finished(&self, record: &RunRecord) {
        if let Err(e) = write_record(&self.output_dir, record) {
            eprintln!("Warning: failed to write run record: {}", e);
        }
    }
}

fn write_record(output_dir: &Path, record: &RunRecord) -> std::io::Result<()> {
    std::fs::create_dir_all(output_dir)?;

    let filename = format!("{}.json", record.experiment.replace('/', "_"));
    let path = output_dir.join(&filename);

    let json = serde_json::to_string_pretty(record).map_err(std::io::Error::other)?;

    std::fs::write(&path, json)?;
    eprintln!("  Run record written to: {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{unix_millis, MeasurementTable};

    fn sample_record() -> RunRecord {
        let mut table = MeasurementTable::new();
        table.record("alg", 10, 0.25);
        RunRecord {
            experiment: "demo/suite".to_string(),
            started_at: unix_millis(),
            iterations: 1,
            algorithms: vec!["alg".to_string()],
            sizes: vec![10],
            table,
        }
    }

    #[test]
    fn should_write_record_with_sanitized_filename() {
        let dir = tempfile::tempdir().unwrap();
        write_record(dir.path(), &sample_record()).unwrap();

        let path = dir.path().join("demo_suite.json");
        let back = RunRecord::load(&path).unwrap();
        assert_eq!(back.experiment, "demo/suite");
        assert_eq!(back.table.samples("alg", 10), &[0.25]);
    }

    #[test]
    fn should_create_output_dir_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        write_record(&nested, &sample_record()).unwrap();
        assert!(nested.join("demo_suite.json").exists());
    }
}
