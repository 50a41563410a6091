//! Whole-body physiologically-based pharmacokinetic (PBPK) model of a reference adult.
//!
//! The model tracks the drug amount in 15 physiological compartments plus two
//! accumulators (cumulative urinary excretion and the venous AUC). Distribution
//! is flow-limited; the liver and the kidney clear unbound drug.
//!
//! ```ignore
//! use pbpk::prelude::*;
//!
//! let model = Pbpk::new(Parameters::default())?;
//! let regimen = Regimen::builder()
//!     .bolus(0.0, 100.0, Compartment::GutLumen)
//!     .build()?;
//! let times: Vec<f64> = (0..=24).map(|t| t as f64).collect();
//! let trajectory = model.simulate(&regimen, &times, &SolverSettings::default())?;
//! let cvenous = trajectory.concentrations(Compartment::Venous);
//! ```

pub mod data;
pub mod error;
pub mod model;
pub mod population;
pub mod simulator;

pub use crate::data::{Bolus, Dose, Infusion, Regimen, RegimenBuilder};
pub use crate::model::{
    Circulation, Compartment, CompartmentKind, Concentrations, Derived, Parameters, Pbpk,
    NCAPTURED, NSTATES,
};
pub use crate::population::{sample_population, Variability};
pub use crate::simulator::batch::simulate_batch;
pub use crate::simulator::{Record, SolverSettings, Trajectory};
pub use error::PbpkError;

pub mod prelude {
    pub use crate::data::auc;
    pub use crate::{
        sample_population, simulate_batch, Compartment, Dose, Parameters, Pbpk, PbpkError,
        Regimen, SolverSettings, Trajectory, Variability,
    };
}
