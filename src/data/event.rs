use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Compartment;

/// A dosing event
///
/// - [Bolus] doses (instantaneous drug input)
/// - [Infusion]s (continuous drug input over a duration)
#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
pub enum Dose {
    /// A bolus dose (instantaneous drug input)
    Bolus(Bolus),
    /// An infusion (continuous drug input over a duration)
    Infusion(Infusion),
}

impl Dose {
    /// Get the time of the dose
    pub fn time(&self) -> f64 {
        match self {
            Dose::Bolus(bolus) => bolus.time,
            Dose::Infusion(infusion) => infusion.time,
        }
    }

    /// Get the total amount administered
    pub fn amount(&self) -> f64 {
        match self {
            Dose::Bolus(bolus) => bolus.amount,
            Dose::Infusion(infusion) => infusion.amount,
        }
    }

    /// Get the receiving compartment
    pub fn input(&self) -> Compartment {
        match self {
            Dose::Bolus(bolus) => bolus.input,
            Dose::Infusion(infusion) => infusion.input,
        }
    }

    /// Shift the dose by `dt`
    pub(crate) fn inc_time(&mut self, dt: f64) {
        match self {
            Dose::Bolus(bolus) => bolus.time += dt,
            Dose::Infusion(infusion) => infusion.time += dt,
        }
    }
}

/// Represents an instantaneous input of drug
///
/// A [Bolus] is a discrete amount of drug added to a specific compartment at a specific time.
#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
pub struct Bolus {
    time: f64,
    amount: f64,
    input: Compartment,
}

impl Bolus {
    /// Create a new bolus event
    ///
    /// # Arguments
    ///
    /// * `time` - Time of the bolus dose
    /// * `amount` - Amount of drug administered
    /// * `input` - The compartment receiving the dose
    pub fn new(time: f64, amount: f64, input: Compartment) -> Self {
        Bolus {
            time,
            amount,
            input,
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn input(&self) -> Compartment {
        self.input
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

/// Represents a continuous dose of drug over time
///
/// An [Infusion] administers drug at a constant rate over a specified duration.
#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
pub struct Infusion {
    time: f64,
    amount: f64,
    input: Compartment,
    duration: f64,
}

impl Infusion {
    /// Create a new infusion event
    ///
    /// # Arguments
    ///
    /// * `time` - Start time of the infusion
    /// * `amount` - Total amount of drug to be administered
    /// * `input` - The compartment receiving the dose
    /// * `duration` - Duration of the infusion in time units
    pub fn new(time: f64, amount: f64, input: Compartment, duration: f64) -> Self {
        Infusion {
            time,
            amount,
            input,
            duration,
        }
    }

    /// Get the total amount of drug provided over the infusion
    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn input(&self) -> Compartment {
        self.input
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Get the start time of the infusion
    ///
    /// The infusion continues from this time until time + duration.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn end_time(&self) -> f64 {
        self.time + self.duration
    }

    /// Constant input rate (amount per time unit)
    pub fn rate(&self) -> f64 {
        self.amount / self.duration
    }

    /// Whether the infusion is running at time `t`; the end point is excluded
    #[inline]
    pub fn is_active(&self, t: f64) -> bool {
        t >= self.time && t < self.end_time()
    }
}

impl fmt::Display for Dose {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Dose::Bolus(bolus) => write!(
                f,
                "Bolus at time {:.2} with amount {:.2} in compartment {}",
                bolus.time, bolus.amount, bolus.input
            ),
            Dose::Infusion(infusion) => write!(
                f,
                "Infusion starting at {:.2} with amount {:.2} over {:.2} hours in compartment {}",
                infusion.time, infusion.amount, infusion.duration, infusion.input
            ),
        }
    }
}
