//! Measurement storage and serializable run records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-algorithm, per-size collection of elapsed-time samples (seconds).
///
/// Sizes are not required to be unique across instances: samples from
/// instances sharing a size accumulate into the same sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementTable {
    samples: HashMap<String, HashMap<u64, Vec<f64>>>,
}

impl MeasurementTable {
    pub(crate) fn new() -> Self {
        Self {
            samples: HashMap::new(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.samples.clear();
    }

    pub(crate) fn record(&mut self, algorithm: &str, size: u64, seconds: f64) {
        self.samples
            .entry(algorithm.to_string())
            .or_default()
            .entry(size)
            .or_default()
            .push(seconds);
    }

    /// All samples for one (algorithm, size) cell, in recording order.
    ///
    /// Empty when the cell was never measured.
    pub fn samples(&self, algorithm: &str, size: u64) -> &[f64] {
        self.samples
            .get(algorithm)
            .and_then(|by_size| by_size.get(&size))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Arithmetic mean of one cell, or `None` when it holds no samples.
    pub fn mean(&self, algorithm: &str, size: u64) -> Option<f64> {
        let s = self.samples(algorithm, size);
        if s.is_empty() {
            None
        } else {
            Some(s.iter().sum::<f64>() / s.len() as f64)
        }
    }

    /// Total number of recorded samples across all cells.
    pub fn len(&self) -> usize {
        self.samples
            .values()
            .flat_map(|by_size| by_size.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Snapshot of one completed run, suitable for JSON export and re-plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Experiment name (also the default export file stem).
    pub experiment: String,
    /// Unix timestamp in milliseconds, taken when the record was created.
    pub started_at: String,
    /// Timed executions per (algorithm, instance) pair.
    pub iterations: usize,
    /// Algorithm names in registration order.
    pub algorithms: Vec<String>,
    /// Instance sizes in registration order (duplicates preserved).
    pub sizes: Vec<u64>,
    /// The measurement table.
    pub table: MeasurementTable,
}

impl RunRecord {
    /// Load a run record from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

pub(crate) fn unix_millis() -> String {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", duration.as_millis())
}
