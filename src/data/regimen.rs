use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::event::{Bolus, Dose, Infusion};
use crate::model::Compartment;
use crate::PbpkError;

/// Time-ordered list of doses for one simulation run.
///
/// Every constructor, deserialization included, goes through [Regimen::new],
/// so the doses are always valid and sorted by time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRegimen")]
pub struct Regimen {
    doses: Vec<Dose>,
}

/// Unchecked wire form of a [Regimen]
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegimen {
    doses: Vec<Dose>,
}

impl TryFrom<RawRegimen> for Regimen {
    type Error = PbpkError;

    fn try_from(raw: RawRegimen) -> Result<Self, Self::Error> {
        Regimen::new(raw.doses)
    }
}

impl Regimen {
    /// Create a regimen, validating and sorting the doses by time
    pub fn new(mut doses: Vec<Dose>) -> Result<Self, PbpkError> {
        for dose in &doses {
            validate(dose)?;
        }
        doses.sort_by(|a, b| a.time().total_cmp(&b.time()));
        Ok(Regimen { doses })
    }

    /// A regimen without any dose, e.g. when the initial state carries the drug
    pub fn empty() -> Self {
        Regimen::default()
    }

    pub fn builder() -> RegimenBuilder {
        RegimenBuilder { doses: Vec::new() }
    }

    pub fn doses(&self) -> &[Dose] {
        &self.doses
    }

    pub fn boluses(&self) -> impl Iterator<Item = &Bolus> {
        self.doses.iter().filter_map(|dose| match dose {
            Dose::Bolus(bolus) => Some(bolus),
            Dose::Infusion(_) => None,
        })
    }

    pub fn infusions(&self) -> impl Iterator<Item = &Infusion> {
        self.doses.iter().filter_map(|dose| match dose {
            Dose::Infusion(infusion) => Some(infusion),
            Dose::Bolus(_) => None,
        })
    }

    /// Total amount administered over the whole regimen
    pub fn total_amount(&self) -> f64 {
        self.doses.iter().map(Dose::amount).sum()
    }

    /// Amount administered up to and including time `t`
    pub fn amount_given_by(&self, t: f64) -> f64 {
        self.doses
            .iter()
            .map(|dose| match dose {
                Dose::Bolus(bolus) if bolus.time() <= t => bolus.amount(),
                Dose::Bolus(_) => 0.0,
                Dose::Infusion(infusion) => {
                    let elapsed = (t - infusion.time()).clamp(0.0, infusion.duration());
                    infusion.rate() * elapsed
                }
            })
            .sum()
    }

    /// Times at which the input changes discontinuously
    pub(crate) fn breakpoints(&self) -> Vec<f64> {
        let mut times = Vec::with_capacity(self.doses.len() * 2);
        for dose in &self.doses {
            times.push(dose.time());
            if let Dose::Infusion(infusion) = dose {
                times.push(infusion.end_time());
            }
        }
        times
    }
}

fn validate(dose: &Dose) -> Result<(), PbpkError> {
    if !dose.time().is_finite() || dose.time() < 0.0 {
        return Err(PbpkError::InvalidDose(format!(
            "dose time must be finite and non-negative: {}",
            dose
        )));
    }
    if !dose.amount().is_finite() || dose.amount() < 0.0 {
        return Err(PbpkError::InvalidDose(format!(
            "dose amount must be finite and non-negative: {}",
            dose
        )));
    }
    if !dose.input().accepts_dose() {
        return Err(PbpkError::InvalidDose(format!(
            "compartment {} cannot receive a dose",
            dose.input()
        )));
    }
    if let Dose::Infusion(infusion) = dose {
        if !(infusion.duration() > 0.0 && infusion.duration().is_finite()) {
            return Err(PbpkError::InvalidDose(format!(
                "infusion duration must be positive: {}",
                dose
            )));
        }
    }
    Ok(())
}

pub struct RegimenBuilder {
    doses: Vec<Dose>,
}

impl RegimenBuilder {
    pub fn dose(mut self, dose: Dose) -> Self {
        self.doses.push(dose);
        self
    }

    pub fn bolus(self, time: f64, amount: f64, input: Compartment) -> Self {
        self.dose(Dose::Bolus(Bolus::new(time, amount, input)))
    }

    pub fn infusion(self, time: f64, amount: f64, input: Compartment, duration: f64) -> Self {
        self.dose(Dose::Infusion(Infusion::new(time, amount, input, duration)))
    }

    /// Repeat the last added dose `n` more times, every `interval` time units.
    ///
    /// Does nothing when no dose has been added yet.
    pub fn repeat(mut self, n: usize, interval: f64) -> Self {
        let Some(last) = self.doses.last().cloned() else {
            tracing::warn!("repeat called on an empty regimen, ignoring");
            return self;
        };
        for i in 1..=n {
            let mut dose = last.clone();
            dose.inc_time(interval * i as f64);
            self.doses.push(dose);
        }
        self
    }

    pub fn build(self) -> Result<Regimen, PbpkError> {
        Regimen::new(self.doses)
    }
}

impl fmt::Display for Regimen {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Regimen with {} doses", self.doses.len())?;
        for dose in &self.doses {
            writeln!(f, "  {}", dose)?;
        }
        Ok(())
    }
}
