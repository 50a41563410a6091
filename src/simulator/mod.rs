//! Integration of the model with diffsol.
//!
//! A run starts at t = 0 from an explicit initial state. The integrator is
//! stopped at every requested output time, every dose time and every
//! infusion end, so input discontinuities always fall on a step boundary.
//! Boluses due at a stop are added to the state before the output row for
//! that time is recorded.

pub mod batch;
mod closure;
pub mod trajectory;

use diffsol::error::{DiffsolError, OdeSolverError};
use diffsol::{OdeBuilder, OdeSolverMethod, OdeSolverStopReason, VectorHost};
use serde::{Deserialize, Serialize};

use crate::data::Regimen;
use crate::model::{Pbpk, NSTATES};
use crate::PbpkError;
use closure::PbpkProblem;
pub use trajectory::{Record, Trajectory};

pub(crate) type T = f64;
pub(crate) type V = diffsol::NalgebraVec<f64>;
pub(crate) type M = diffsol::NalgebraMat<f64>;
pub(crate) type C = diffsol::NalgebraContext;
type LS = diffsol::NalgebraLU<f64>;

const RTOL: f64 = 1e-6;
const ATOL: f64 = 1e-9;
const H0: f64 = 1e-3;

/// Tolerances and initial step of the BDF integrator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub rtol: f64,
    pub atol: f64,
    pub h0: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            rtol: RTOL,
            atol: ATOL,
            h0: H0,
        }
    }
}

impl SolverSettings {
    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }
}

fn check_times(times: &[f64]) -> Result<(), PbpkError> {
    if let Some(t) = times.iter().find(|t| !t.is_finite() || **t < 0.0) {
        return Err(PbpkError::InvalidOutputTimes(format!(
            "output time {} is not a finite non-negative number",
            t
        )));
    }
    if times.windows(2).any(|w| w[1] < w[0]) {
        return Err(PbpkError::InvalidOutputTimes(
            "output times must be non-decreasing".to_string(),
        ));
    }
    Ok(())
}

fn check_initial_state(initial: &[f64]) -> Result<(), PbpkError> {
    if initial.len() != NSTATES {
        return Err(PbpkError::InvalidInitialState(format!(
            "expected {} values, got {}",
            NSTATES,
            initial.len()
        )));
    }
    if let Some(x) = initial.iter().find(|x| !x.is_finite() || **x < 0.0) {
        return Err(PbpkError::InvalidInitialState(format!(
            "amounts must be finite and non-negative, got {}",
            x
        )));
    }
    Ok(())
}

impl Pbpk {
    /// Simulate `regimen` from an empty body and report the state at `times`
    pub fn simulate(
        &self,
        regimen: &Regimen,
        times: &[f64],
        settings: &SolverSettings,
    ) -> Result<Trajectory, PbpkError> {
        self.simulate_from(&[0.0; NSTATES], regimen, times, settings)
    }

    /// Simulate `regimen` starting from `initial` at t = 0
    pub fn simulate_from(
        &self,
        initial: &[f64],
        regimen: &Regimen,
        times: &[f64],
        settings: &SolverSettings,
    ) -> Result<Trajectory, PbpkError> {
        check_initial_state(initial)?;
        check_times(times)?;

        let mut stops: Vec<f64> = times.to_vec();
        stops.extend(regimen.breakpoints());
        stops.push(0.0);
        stops.sort_by(f64::total_cmp);
        stops.dedup();

        let problem = PbpkProblem::new(self.clone(), regimen.infusions().cloned().collect(), initial);
        let ode = OdeBuilder::<M>::new()
            .t0(0.0)
            .h0(settings.h0)
            .rtol(settings.rtol)
            .atol(vec![settings.atol; NSTATES])
            .build_from_eqn(problem)?;
        let mut solver = ode.bdf::<LS>()?;

        let mut boluses = regimen.boluses().peekable();
        let mut outputs = times.iter().peekable();
        let mut trajectory = Trajectory::with_capacity(times.len());

        for &stop in &stops {
            if stop > solver.state().t {
                match solver.set_stop_time(stop) {
                    Ok(_) => loop {
                        match solver.step() {
                            Ok(OdeSolverStopReason::TstopReached) => break,
                            Ok(_) => continue,
                            Err(DiffsolError::OdeSolverError(
                                OdeSolverError::StepSizeTooSmall { .. },
                            )) => {
                                return Err(PbpkError::StepSizeTooSmall {
                                    time: solver.state().t,
                                });
                            }
                            Err(err) => return Err(err.into()),
                        }
                    },
                    Err(DiffsolError::OdeSolverError(OdeSolverError::StopTimeAtCurrentTime)) => {}
                    Err(err) => return Err(err.into()),
                }
                tracing::debug!(t = stop, "integrated to stop time");
            }

            while let Some(bolus) = boluses.next_if(|b| b.time() <= stop) {
                solver.state_mut().y.as_mut_slice()[bolus.input().index()] += bolus.amount();
            }

            while let Some(&t) = outputs.next_if(|&&t| t <= stop) {
                trajectory.push(t, solver.state().y.as_slice(), self);
            }
        }

        tracing::debug!(
            rows = trajectory.len(),
            doses = regimen.doses().len(),
            "simulation finished"
        );
        Ok(trajectory)
    }
}
