//! # runlab
//!
//! A running-time experiment harness for comparing algorithm implementations.
//!
//! Register problem instances (each tagged with an input size) and competing
//! implementations, check that the implementations agree on a reference
//! instance, time repeated executions of every (algorithm, instance) pair,
//! and chart the measured distributions together with the mean running-time
//! trend per algorithm.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use runlab::Experiment;
//!
//! let mut exp = Experiment::new("sorting");
//!
//! exp.add_instance(1_000, (0..1_000u32).rev().collect::<Vec<_>>());
//! exp.add_instance(10_000, (0..10_000u32).rev().collect::<Vec<_>>());
//!
//! exp.add_algorithm("std_sort", |v: &Vec<u32>| {
//!     let mut v = v.clone();
//!     v.sort();
//!     v
//! });
//! exp.add_algorithm("std_sort_unstable", |v: &Vec<u32>| {
//!     let mut v = v.clone();
//!     v.sort_unstable();
//!     v
//! });
//!
//! exp.validate().unwrap();
//! exp.run();
//!
//! let fig = exp.create_figure("Sorting running times");
//! runlab::write_figure(&fig, "target/sorting.svg").unwrap();
//! ```
//!
//! Measurements are single-threaded and strictly sequential, so the harness
//! never perturbs its own wall-clock timings. Each run also leaves a JSON
//! record behind (default: `target/runlab/<name>.json`) that the
//! `runlab-plot` binary can re-render later.
//!
//! ## Features
//!
//! - **`raster`** (default): PNG output via SVG rasterization

mod config;
mod error;
mod experiment;
mod figure;
mod render;
mod report;
mod result;

pub use config::ExperimentConfig;
pub use error::ExperimentError;
pub use experiment::Experiment;
pub use figure::{Axis, Figure, FigureOptions, Scale, Trace, TraceKind, PALETTE};
pub use render::{show_figure, write_figure};
pub use report::{ConsoleProgress, JsonSink, Progress};
pub use result::{MeasurementTable, RunRecord};
