pub mod compartment;
pub mod derived;
pub mod parameters;
pub mod rhs;

pub use compartment::{Compartment, CompartmentKind, NCAPTURED, NSTATES};
pub use derived::{Circulation, Derived};
pub use parameters::Parameters;
pub use rhs::Concentrations;

use crate::PbpkError;

#[inline]
fn check_len(what: &str, len: usize) {
    assert!(
        len >= NSTATES,
        "{} slice holds {} values, the model has {} states",
        what,
        len,
        NSTATES
    );
}

/// A validated, immutable model instance.
///
/// Holds the run parameters together with the quantities derived from them,
/// so the derivative can be evaluated without recomputing anything. Cloning is
/// cheap and instances can be shared freely between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Pbpk {
    params: Parameters,
    derived: Derived,
}

impl Pbpk {
    /// Validate `params` and derive the per-run quantities
    pub fn new(params: Parameters) -> Result<Self, PbpkError> {
        params.validate()?;
        let derived = Derived::new(&params)?;
        Ok(Pbpk { params, derived })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    /// Flow totals around the circulatory loop
    pub fn circulation(&self) -> Circulation {
        self.derived.circulation(&self.params)
    }

    /// Evaluate `dx = f(t, x)`
    ///
    /// # Panics
    ///
    /// Panics if `x` or `dx` holds fewer than [NSTATES] values.
    #[inline]
    pub fn derivative(&self, t: f64, x: &[f64], dx: &mut [f64]) {
        check_len("state", x.len());
        check_len("derivative", dx.len());
        rhs::derivative(t, x, &self.params, &self.derived, dx);
    }

    /// Concentrations of the captured compartments for state `x`
    ///
    /// # Panics
    ///
    /// Panics if `x` holds fewer than [NSTATES] values.
    pub fn concentrations(&self, x: &[f64]) -> Concentrations {
        check_len("state", x.len());
        Concentrations::new(x, &self.params, &self.derived)
    }

    /// Volume a compartment's amount is divided by, `None` for accumulators
    pub fn volume(&self, compartment: Compartment) -> Option<f64> {
        let p = &self.params;
        let d = &self.derived;
        let v = match compartment {
            Compartment::GutLumen => p.vgu_lumen,
            Compartment::Gut => p.vgu_wall,
            Compartment::Adipose => p.vad,
            Compartment::Brain => p.vbr,
            Compartment::Heart => p.vhe,
            Compartment::Bone => p.vbo,
            Compartment::Kidney => p.vki,
            Compartment::Liver => p.vli,
            Compartment::Lung => p.vlu,
            Compartment::Muscle => p.vmu,
            Compartment::Spleen => p.vsp,
            Compartment::Rest => d.vre,
            Compartment::Arterial => d.var,
            Compartment::Venous => d.vve,
            Compartment::Skin => p.vsk,
            Compartment::Urine | Compartment::Auc => return None,
        };
        Some(v)
    }

    /// Drug amount still in the body (lumen, tissues and blood)
    ///
    /// # Panics
    ///
    /// Panics if `x` holds fewer than [NSTATES] values.
    pub fn body_amount(x: &[f64]) -> f64 {
        check_len("state", x.len());
        Compartment::ALL
            .iter()
            .filter(|c| c.kind() == CompartmentKind::Physiological)
            .map(|c| x[c.index()])
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameters_fail_fast() {
        let p = Parameters {
            vbl: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            Pbpk::new(p),
            Err(PbpkError::InvalidParameter { name: "vbl", .. })
        ));

        let p = Parameters {
            vss: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            Pbpk::new(p),
            Err(PbpkError::NonPositiveRestVolume(_))
        ));
    }

    #[test]
    fn test_volumes_match_concentrations() {
        let model = Pbpk::new(Parameters::default()).unwrap();
        let mut x = [0.0; NSTATES];
        for c in Compartment::ALL {
            x[c.index()] = 1.0;
        }
        let conc = model.concentrations(&x).to_array();
        for c in Compartment::CAPTURED {
            let v = model.volume(c).unwrap();
            assert_eq!(conc[c.capture_index().unwrap()], 1.0 / v);
        }
        assert_eq!(model.volume(Compartment::Urine), None);
    }

    #[test]
    fn test_body_amount_excludes_accumulators() {
        let mut x = [1.0; NSTATES];
        x[Compartment::Urine.index()] = 50.0;
        x[Compartment::Auc.index()] = 50.0;
        assert_eq!(Pbpk::body_amount(&x), 15.0);
    }

    #[test]
    #[should_panic(expected = "state slice holds 3 values")]
    fn test_short_state_is_rejected() {
        let model = Pbpk::new(Parameters::default()).unwrap();
        let mut dx = [0.0; NSTATES];
        model.derivative(0.0, &[1.0; 3], &mut dx);
    }

    #[test]
    #[should_panic(expected = "derivative slice holds 16 values")]
    fn test_short_derivative_is_rejected() {
        let model = Pbpk::new(Parameters::default()).unwrap();
        let mut dx = [0.0; NSTATES - 1];
        model.derivative(0.0, &[1.0; NSTATES], &mut dx);
    }

    #[test]
    fn test_derived_quantities_are_read_only_views() {
        let model = Pbpk::new(Parameters::default()).unwrap();
        let d = model.derived();
        assert_eq!(d.vre(), d.vre);
        assert_eq!(d.qre(), d.qre);
        assert_eq!(d.cl_renal(), 8.0);
        assert_eq!(d.cl_int_hep(), 6.0);
        assert_eq!(model.volume(Compartment::Rest), Some(d.vre()));
        assert_eq!(model.volume(Compartment::Venous), Some(d.vve()));
        assert_eq!(model.volume(Compartment::Arterial), Some(d.var()));
    }
}
