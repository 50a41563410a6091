//! Model parameters of the reference adult.
//!
//! [Parameters] holds every fixed scalar of the model. The defaults are the
//! reference parameter set; any subset can be overridden by name, from a JSON
//! document or from a CSV table with one parameter set per row.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PbpkError;

/// Cardiac output of the reference adult, 6.5 L/min (L/h)
pub const CARDIAC_OUTPUT: f64 = 6.5 * 60.0;

macro_rules! parameters {
    ($( $(#[$meta:meta])* $name:ident = $default:expr ),* $(,)?) => {
        /// Fixed scalars of one simulation run.
        ///
        /// Volumes are in L, flows in L/h, rate constants in 1/h and the body
        /// weight in kg. Use [Parameters::validate] (called by [crate::Pbpk::new])
        /// before integrating.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct Parameters {
            $( $(#[$meta])* pub $name: f64, )*
        }

        impl Default for Parameters {
            fn default() -> Self {
                Parameters {
                    $( $name: $default, )*
                }
            }
        }

        impl Parameters {
            /// Names of all parameters, in declaration order
            pub const NAMES: &'static [&'static str] = &[$( stringify!($name) ),*];

            /// Get a parameter value by name
            pub fn get(&self, name: &str) -> Result<f64, PbpkError> {
                match name {
                    $( stringify!($name) => Ok(self.$name), )*
                    other => Err(PbpkError::UnknownParameter(other.to_string())),
                }
            }

            /// Set a parameter value by name
            pub fn set(&mut self, name: &str, value: f64) -> Result<(), PbpkError> {
                match name {
                    $( stringify!($name) => self.$name = value, )*
                    other => return Err(PbpkError::UnknownParameter(other.to_string())),
                }
                Ok(())
            }

            /// All `(name, value)` pairs in declaration order
            pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
                [$( (stringify!($name), self.$name) ),*].into_iter()
            }
        }
    };
}

parameters! {
    /// Adipose volume
    vad = 18.2,
    /// Bone volume
    vbo = 10.5,
    /// Brain volume
    vbr = 1.45,
    /// Gut wall volume
    vgu_wall = 0.65,
    /// Gut lumen volume
    vgu_lumen = 0.35,
    /// Heart volume
    vhe = 0.33,
    /// Kidney volume
    vki = 0.31,
    /// Liver volume
    vli = 1.8,
    /// Lung volume
    vlu = 0.5,
    /// Muscle volume
    vmu = 29.0,
    /// Spleen volume
    vsp = 0.15,
    /// Total blood volume
    vbl = 5.6,
    /// Skin volume
    vsk = 3.3,
    /// Volume of distribution per body weight (L/kg)
    vss = 0.99,

    qad = 0.05 * CARDIAC_OUTPUT,
    qbo = 0.05 * CARDIAC_OUTPUT,
    qbr = 0.12 * CARDIAC_OUTPUT,
    qgu = 0.15 * CARDIAC_OUTPUT,
    qhe = 0.04 * CARDIAC_OUTPUT,
    qki = 0.19 * CARDIAC_OUTPUT,
    qmu = 0.17 * CARDIAC_OUTPUT,
    qsp = 0.03 * CARDIAC_OUTPUT,
    /// Hepatic artery flow
    qha = 0.065 * CARDIAC_OUTPUT,
    /// Lung flow, equal to cardiac output
    qlu = CARDIAC_OUTPUT,
    qsk = 0.05 * CARDIAC_OUTPUT,

    /// Adipose:plasma partition coefficient
    kpad = 0.191,
    kpbo = 0.466,
    kpbr = 0.856,
    kpgu = 0.771,
    kphe = 0.813,
    kpki = 0.84,
    kpli = 0.812,
    kplu = 0.863,
    kpmu = 0.809,
    kpsp = 0.848,
    kpsk = 0.767,
    /// Blood:plasma concentration ratio
    bp = 1.0,

    /// Body weight (kg)
    weight = 73.0,
    /// Fraction unbound in plasma
    fup = 1.0,
    /// First-order absorption rate constant
    ka = 0.27,
    /// Fraction of the gut lumen amount available for absorption
    fa = 1.0,
    /// Glomerular filtration rate
    gfr = 6.0,
    renal_secretion = 2.0,
    /// Scaling factor on renal clearance
    renal_scaling = 1.0,
    /// Scaling factor on hepatic intrinsic clearance
    hepatic_scaling = 1.0,
}

fn positive(name: &'static str, value: f64) -> Result<(), PbpkError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(PbpkError::InvalidParameter {
            name,
            value,
            reason: "must be positive",
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), PbpkError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(PbpkError::InvalidParameter {
            name,
            value,
            reason: "must be non-negative",
        })
    }
}

impl Parameters {
    /// Reference parameters with the given overrides applied
    pub fn from_map(overrides: &HashMap<String, f64>) -> Result<Self, PbpkError> {
        let mut params = Parameters::default();
        for (name, &value) in overrides {
            params.set(name, value)?;
        }
        Ok(params)
    }

    /// Parse a JSON object; missing keys keep their reference value
    pub fn from_json_str(json: &str) -> Result<Self, PbpkError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PbpkError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Read a table of parameter sets.
    ///
    /// The header row holds parameter names and each following row is one
    /// parameter set. Columns that are not present keep their reference value.
    pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Self>, PbpkError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut sets = Vec::new();
        for record in reader.deserialize() {
            let params: Parameters = record?;
            sets.push(params);
        }
        Ok(sets)
    }

    pub fn read_csv_file(path: impl AsRef<Path>) -> Result<Vec<Self>, PbpkError> {
        let file = std::fs::File::open(path)?;
        Self::read_csv(file)
    }

    /// Check the physiological validity of each parameter on its own.
    ///
    /// Checks on quantities derived from several parameters live in
    /// [crate::model::derived::Derived::new].
    pub fn validate(&self) -> Result<(), PbpkError> {
        for (name, value) in self.iter() {
            if !value.is_finite() {
                return Err(PbpkError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
        }

        positive("vad", self.vad)?;
        positive("vbo", self.vbo)?;
        positive("vbr", self.vbr)?;
        positive("vgu_wall", self.vgu_wall)?;
        positive("vgu_lumen", self.vgu_lumen)?;
        positive("vhe", self.vhe)?;
        positive("vki", self.vki)?;
        positive("vli", self.vli)?;
        positive("vlu", self.vlu)?;
        positive("vmu", self.vmu)?;
        positive("vsp", self.vsp)?;
        positive("vbl", self.vbl)?;
        positive("vsk", self.vsk)?;
        positive("vss", self.vss)?;
        positive("weight", self.weight)?;

        non_negative("qad", self.qad)?;
        non_negative("qbo", self.qbo)?;
        non_negative("qbr", self.qbr)?;
        non_negative("qgu", self.qgu)?;
        non_negative("qhe", self.qhe)?;
        non_negative("qki", self.qki)?;
        non_negative("qmu", self.qmu)?;
        non_negative("qsp", self.qsp)?;
        non_negative("qha", self.qha)?;
        non_negative("qsk", self.qsk)?;
        positive("qlu", self.qlu)?;

        positive("kpad", self.kpad)?;
        positive("kpbo", self.kpbo)?;
        positive("kpbr", self.kpbr)?;
        positive("kpgu", self.kpgu)?;
        positive("kphe", self.kphe)?;
        positive("kpki", self.kpki)?;
        positive("kpli", self.kpli)?;
        positive("kplu", self.kplu)?;
        positive("kpmu", self.kpmu)?;
        positive("kpsp", self.kpsp)?;
        positive("kpsk", self.kpsk)?;
        positive("bp", self.bp)?;

        non_negative("ka", self.ka)?;
        non_negative("gfr", self.gfr)?;
        non_negative("renal_secretion", self.renal_secretion)?;
        non_negative("renal_scaling", self.renal_scaling)?;
        non_negative("hepatic_scaling", self.hepatic_scaling)?;

        if !(self.fup > 0.0 && self.fup <= 1.0) {
            return Err(PbpkError::InvalidParameter {
                name: "fup",
                value: self.fup,
                reason: "must lie in (0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.fa) {
            return Err(PbpkError::InvalidParameter {
                name: "fa",
                value: self.fa,
                reason: "must lie in [0, 1]",
            });
        }
        Ok(())
    }
}
