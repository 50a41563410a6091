use diffsol::error::DiffsolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PbpkError {
    #[error("Invalid value {value} for parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("Rest-of-body volume must be positive, got {0} L; the explicit compartment volumes exceed vss * weight")]
    NonPositiveRestVolume(f64),
    #[error("Rest-of-body blood flow must be non-negative, got {0} L/h; the branch flows exceed cardiac output")]
    NegativeRestFlow(f64),
    #[error("Circulation is not closed: {side} flow {flow} L/h does not match cardiac output {cardiac_output} L/h")]
    FlowImbalance {
        side: &'static str,
        flow: f64,
        cardiac_output: f64,
    },
    #[error("Unknown compartment: {0}")]
    InvalidCompartment(String),
    #[error("Invalid dose: {0}")]
    InvalidDose(String),
    #[error("Invalid output times: {0}")]
    InvalidOutputTimes(String),
    #[error("Invalid initial state: {0}")]
    InvalidInitialState(String),
    #[error("The step size of the ODE solver went to zero at t = {time}, check the parameter set")]
    StepSizeTooSmall { time: f64 },
    #[error("Error in the ODE solver: {0}")]
    Solver(#[from] DiffsolError),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Population sampling failed: {0}")]
    Population(String),
}
