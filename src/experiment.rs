//! The experiment harness: registries, validation, and the timed run loop.

use crate::config::ExperimentConfig;
use crate::error::ExperimentError;
use crate::figure::{Figure, FigureOptions};
use crate::report::{ConsoleProgress, JsonSink, Progress};
use crate::result::{unix_millis, MeasurementTable, RunRecord};
use std::time::Instant;

/// One benchmark input, tagged with the size used for grouping and plotting.
struct Instance<I> {
    size: u64,
    payload: I,
}

/// One timed implementation under test.
struct Algorithm<I, R> {
    name: String,
    func: Box<dyn Fn(&I) -> R>,
}

/// Running-time experiment harness.
///
/// Registers problem instances and algorithm implementations, validates that
/// the implementations agree on a reference instance, times repeated
/// executions of every (algorithm, instance) pair, and builds a chart of the
/// measurements.
///
/// Generic over the payload type `I` the algorithms consume and the result
/// type `R` they produce. Registration order is execution and plotting order
/// for both registries.
///
/// # Example
///
/// ```rust,no_run
/// use runlab::Experiment;
///
/// let mut exp = Experiment::new("summing");
/// exp.add_instance(100, (0..100u64).collect::<Vec<_>>());
/// exp.add_algorithm("iter_sum", |v: &Vec<u64>| v.iter().sum::<u64>());
/// exp.add_algorithm("fold_sum", |v: &Vec<u64>| v.iter().fold(0, |a, b| a + b));
///
/// exp.validate().unwrap();
/// exp.run();
/// assert_eq!(exp.results().samples("iter_sum", 100).len(), 3);
/// ```
pub struct Experiment<I, R> {
    name: String,
    config: ExperimentConfig,
    instances: Vec<Instance<I>>,
    algorithms: Vec<Algorithm<I, R>>,
    results: MeasurementTable,
    last_iterations: Option<usize>,
    progress: Vec<Box<dyn Progress>>,
}

impl<I, R> Experiment<I, R> {
    /// Create a harness with config from the environment.
    pub fn new(name: &str) -> Self {
        Self::with_config(name, ExperimentConfig::from_env())
    }

    /// Create a harness with an explicit config.
    ///
    /// The measurement table is freshly allocated per harness; nothing is
    /// shared between instances.
    pub fn with_config(name: &str, config: ExperimentConfig) -> Self {
        let mut progress: Vec<Box<dyn Progress>> = Vec::new();
        if config.verbose {
            progress.push(Box::new(ConsoleProgress::new()));
        }
        progress.push(Box::new(JsonSink::new(config.output_dir.clone())));

        Self {
            name: name.to_string(),
            config,
            instances: Vec::new(),
            algorithms: Vec::new(),
            results: MeasurementTable::new(),
            last_iterations: None,
            progress,
        }
    }

    /// Replace the progress observers with a custom set.
    pub fn progress_sinks(&mut self, sinks: Vec<Box<dyn Progress>>) -> &mut Self {
        self.progress = sinks;
        self
    }

    /// Add an additional progress observer.
    pub fn add_progress(&mut self, sink: Box<dyn Progress>) -> &mut Self {
        self.progress.push(sink);
        self
    }

    /// Append one problem instance.
    ///
    /// Duplicate sizes are allowed; their samples accumulate into the same
    /// measurement cell and merge in the distribution trace.
    pub fn add_instance(&mut self, size: u64, payload: I) {
        self.instances.push(Instance { size, payload });
    }

    /// Append one algorithm implementation.
    ///
    /// Names are not checked for uniqueness; duplicates make the chart
    /// legend ambiguous.
    pub fn add_algorithm<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&I) -> R + 'static,
    {
        self.algorithms.push(Algorithm {
            name: name.to_string(),
            func: Box::new(func),
        });
    }

    /// Check that every algorithm agrees with the first one on the first
    /// registered instance.
    ///
    /// A sanity smoke test, not exhaustive verification: only the first
    /// instance is checked, and checking stops at the first mismatch.
    pub fn validate(&self) -> Result<(), ExperimentError>
    where
        R: PartialEq,
    {
        if self.instances.is_empty() || self.algorithms.is_empty() {
            return Err(ExperimentError::EmptyRegistry);
        }

        for p in &self.progress {
            p.validation_start();
        }

        let payload = &self.instances[0].payload;
        let reference = &self.algorithms[0];
        let expected = (reference.func)(payload);

        for alg in &self.algorithms[1..] {
            if (alg.func)(payload) != expected {
                return Err(ExperimentError::Mismatch {
                    algorithm: alg.name.clone(),
                    reference: reference.name.clone(),
                });
            }
        }

        for p in &self.progress {
            p.validation_passed();
        }
        Ok(())
    }

    /// Time every (algorithm, instance) pair `config.iterations` times.
    pub fn run(&mut self) {
        self.run_with(self.config.iterations);
    }

    /// Time every (algorithm, instance) pair `iterations` times.
    ///
    /// Clears measurements from any previous run first, so the table only
    /// ever reflects the latest run. Execution is strictly sequential, one
    /// (algorithm, instance, iteration) triple at a time; a panicking
    /// algorithm aborts the run. Return values are discarded after timing.
    pub fn run_with(&mut self, iterations: usize) {
        self.results.clear();
        self.last_iterations = Some(iterations);

        for p in &self.progress {
            p.run_start(&self.name, iterations);
        }

        for alg in &self.algorithms {
            for p in &self.progress {
                p.algorithm_start(&alg.name);
            }

            for inst in &self.instances {
                for p in &self.progress {
                    p.instance_start(inst.size);
                }

                for _ in 0..iterations {
                    let start = Instant::now();
                    std::hint::black_box((alg.func)(&inst.payload));
                    let seconds = start.elapsed().as_secs_f64();

                    self.results.record(&alg.name, inst.size, seconds);
                    for p in &self.progress {
                        p.sample_recorded(seconds);
                    }
                }
            }

            for p in &self.progress {
                p.algorithm_finished(&alg.name);
            }
        }

        let record = self.to_record();
        for p in &self.progress {
            p.run_finished(&record);
        }
    }

    /// The measurement table from the most recent run (empty before any run).
    pub fn results(&self) -> &MeasurementTable {
        &self.results
    }

    /// Snapshot the registries and measurements into a serializable record.
    pub fn to_record(&self) -> RunRecord {
        RunRecord {
            experiment: self.name.clone(),
            started_at: unix_millis(),
            iterations: self.last_iterations.unwrap_or(self.config.iterations),
            algorithms: self.algorithms.iter().map(|a| a.name.clone()).collect(),
            sizes: self.instances.iter().map(|i| i.size).collect(),
            table: self.results.clone(),
        }
    }

    /// Build a chart with a distribution trace and a mean-trend trace per
    /// algorithm, using the default layout (800x800, log/log).
    pub fn create_figure(&self, title: &str) -> Figure {
        self.create_figure_with(title, &FigureOptions::default())
    }

    /// Build a chart with explicit layout options.
    ///
    /// Meaningful after [`run`](Self::run); before that every trace is empty.
    pub fn create_figure_with(&self, title: &str, options: &FigureOptions) -> Figure {
        let names: Vec<&str> = self.algorithms.iter().map(|a| a.name.as_str()).collect();
        let sizes: Vec<u64> = self.instances.iter().map(|i| i.size).collect();
        Figure::build(title, options, &names, &sizes, &self.results)
    }
}
