//! Virtual populations of parameter sets.
//!
//! Each varied parameter is drawn from a log-normal distribution whose median
//! is the base value and whose coefficient of variation is given per
//! parameter. Draws that do not form a physiologically valid model are
//! rejected and redrawn.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::model::{Parameters, Pbpk};
use crate::PbpkError;

const MAX_ATTEMPTS: usize = 100;

/// Coefficients of variation for the parameters to vary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variability {
    entries: Vec<(String, f64)>,
}

impl Variability {
    pub fn new() -> Self {
        Variability::default()
    }

    /// Vary parameter `name` with coefficient of variation `cv` (0.3 = 30 %)
    pub fn with(mut self, name: &str, cv: f64) -> Result<Self, PbpkError> {
        Parameters::default().get(name)?;
        if !(cv.is_finite() && cv >= 0.0) {
            return Err(PbpkError::Population(format!(
                "coefficient of variation for {} must be finite and non-negative, got {}",
                name, cv
            )));
        }
        self.entries.push((name.to_string(), cv));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Draw `n` parameter sets around `base`.
///
/// The same seed always yields the same population.
///
/// Rejected draws make the accepted population a truncated log-normal. With
/// the reference parameters the rest-of-body volume margin is only 0.48 L, so
/// any draw of `weight` below about 72.5 kg is rejected and a population
/// varying `weight` is biased towards heavier individuals. The acceptance
/// rate is logged at `info` level.
pub fn sample_population(
    base: &Parameters,
    variability: &Variability,
    n: usize,
    seed: u64,
) -> Result<Vec<Parameters>, PbpkError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let distributions = variability
        .entries
        .iter()
        .map(|(name, cv)| {
            let omega = (1.0 + cv * cv).ln().sqrt();
            Normal::new(0.0, omega)
                .map(|normal| (name.as_str(), normal))
                .map_err(|e| PbpkError::Population(format!("{}: {}", name, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut population = Vec::with_capacity(n);
    let mut draws = 0usize;
    for individual in 0..n {
        let mut accepted = None;
        for attempt in 0..MAX_ATTEMPTS {
            draws += 1;
            let mut candidate = base.clone();
            for (name, normal) in &distributions {
                let eta: f64 = normal.sample(&mut rng);
                let value = candidate.get(name)? * eta.exp();
                candidate.set(name, value)?;
            }
            match Pbpk::new(candidate.clone()) {
                Ok(_) => {
                    accepted = Some(candidate);
                    break;
                }
                Err(e) => {
                    tracing::warn!(individual, attempt, error = %e, "rejected parameter draw");
                }
            }
        }
        match accepted {
            Some(params) => population.push(params),
            None => {
                return Err(PbpkError::Population(format!(
                    "no valid parameter set for individual {} after {} draws",
                    individual, MAX_ATTEMPTS
                )))
            }
        }
    }
    tracing::info!(
        accepted = population.len(),
        draws,
        acceptance_rate = population.len() as f64 / draws.max(1) as f64,
        "sampled population"
    );
    Ok(population)
}
