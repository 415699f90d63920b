//! Demo experiment: three sorting implementations across growing inputs.
//!
//! Run with `cargo bench --bench sorting-demo`; the chart lands in
//! `target/runlab/sorting.svg` next to the JSON run record.

use runlab::{write_figure, Experiment, ExperimentConfig};

/// Deterministic scrambled input: i * 31 mod n visits every index once for
/// n coprime with 31.
fn scrambled(n: u64) -> Vec<u64> {
    (0..n).map(|i| (i * 31) % n).collect()
}

fn bubble_sort(v: &Vec<u64>) -> Vec<u64> {
    let mut v = v.clone();
    let mut n = v.len();
    while n > 1 {
        let mut swapped = 0;
        for i in 1..n {
            if v[i - 1] > v[i] {
                v.swap(i - 1, i);
                swapped = i;
            }
        }
        n = swapped;
    }
    v
}

fn insertion_sort(v: &Vec<u64>) -> Vec<u64> {
    let mut v = v.clone();
    for i in 1..v.len() {
        let mut j = i;
        while j > 0 && v[j - 1] > v[j] {
            v.swap(j - 1, j);
            j -= 1;
        }
    }
    v
}

fn std_sort(v: &Vec<u64>) -> Vec<u64> {
    let mut v = v.clone();
    v.sort_unstable();
    v
}

fn main() {
    let mut exp = Experiment::with_config("sorting", ExperimentConfig::new().iterations(3));

    for size in [512u64, 1024, 2048, 4096] {
        exp.add_instance(size, scrambled(size));
    }

    exp.add_algorithm("bubble_sort", bubble_sort);
    exp.add_algorithm("insertion_sort", insertion_sort);
    exp.add_algorithm("std_sort", std_sort);

    if let Err(e) = exp.validate() {
        eprintln!("validation failed: {}", e);
        std::process::exit(1);
    }

    exp.run();

    let fig = exp.create_figure("Sorting running times");
    if let Err(e) = write_figure(&fig, "target/runlab/sorting.svg") {
        eprintln!("failed to write chart: {}", e);
        std::process::exit(1);
    }
    eprintln!("Chart written to: target/runlab/sorting.svg");
}
