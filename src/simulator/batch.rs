//! Independent runs over many parameter sets.
//!
//! Runs share nothing mutable, so they are mapped over a rayon parallel
//! iterator. Results keep the order of the input parameter sets.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use super::{SolverSettings, Trajectory};
use crate::data::Regimen;
use crate::model::{Parameters, Pbpk};
use crate::PbpkError;

/// Simulate the same regimen for every parameter set.
///
/// A failing parameter set only fails its own entry.
pub fn simulate_batch(
    parameter_sets: &[Parameters],
    regimen: &Regimen,
    times: &[f64],
    settings: &SolverSettings,
    progress: bool,
) -> Vec<Result<Trajectory, PbpkError>> {
    let bar = if progress {
        let bar = ProgressBar::new(parameter_sets.len() as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} runs ({percent}%) ETA: {eta}",
        ) {
            bar.set_style(style);
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    tracing::info!(runs = parameter_sets.len(), "starting batch simulation");
    let results: Vec<Result<Trajectory, PbpkError>> = parameter_sets
        .par_iter()
        .map(|params| {
            let result = Pbpk::new(params.clone())
                .and_then(|model| model.simulate(regimen, times, settings));
            bar.inc(1);
            result
        })
        .collect();
    bar.finish();

    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(
        runs = results.len(),
        failed,
        "batch simulation complete"
    );
    results
}
