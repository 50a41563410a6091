use serde::Serialize;

use super::parameters::Parameters;
use crate::PbpkError;

/// Hepatic intrinsic clearance before scaling (L/h)
pub const HEPATIC_CLINT_BASELINE: f64 = 6.0;

/// Share of the blood volume in the venous pool
pub const VENOUS_BLOOD_FRACTION: f64 = 0.705;
/// Share of the blood volume in the arterial pool
pub const ARTERIAL_BLOOD_FRACTION: f64 = 0.295;

const BALANCE_TOLERANCE: f64 = 1e-9;

/// Quantities computed once per run from [Parameters].
///
/// Only [Derived::new] builds one, so every instance has passed the volume,
/// flow and circulation checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derived {
    /// Partition coefficient of the rest of the body
    pub(crate) kpre: f64,
    /// Venous blood volume
    pub(crate) vve: f64,
    /// Arterial blood volume
    pub(crate) var: f64,
    /// Rest-of-body volume
    pub(crate) vre: f64,
    /// Liver outflow: portal (gut + spleen) plus hepatic artery
    pub(crate) qli: f64,
    /// Sum of all explicitly modelled venous returns
    pub(crate) qtot: f64,
    /// Rest-of-body flow
    pub(crate) qre: f64,
    /// Renal clearance (L/h)
    pub(crate) cl_renal: f64,
    /// Hepatic intrinsic clearance (L/h)
    pub(crate) cl_int_hep: f64,
}

impl Derived {
    /// Derive and validate the per-run quantities.
    ///
    /// Fails if the rest-of-body volume is not positive, if the rest-of-body flow
    /// is negative or if the circulation does not close.
    pub fn new(p: &Parameters) -> Result<Self, PbpkError> {
        let kpre = (p.kpbo
            + p.kpbr
            + p.kpgu
            + p.kphe
            + p.kpki
            + p.kpli
            + p.kplu
            + p.kpmu
            + p.kpsp
            + p.kpsk)
            / 10.0;

        let vve = VENOUS_BLOOD_FRACTION * p.vbl;
        let var = ARTERIAL_BLOOD_FRACTION * p.vbl;
        let vre = p.vss * p.weight
            - (p.vli
                + p.vki
                + p.vsp
                + p.vhe
                + p.vlu
                + p.vbo
                + p.vbr
                + p.vmu
                + p.vad
                + p.vgu_wall
                + p.vsk
                + p.vbl);
        if vre <= 0.0 || !vre.is_finite() {
            return Err(PbpkError::NonPositiveRestVolume(vre));
        }

        let qli = p.qgu + p.qsp + p.qha;
        let qtot = qli + p.qki + p.qbo + p.qhe + p.qmu + p.qad + p.qbr + p.qsk;
        let qre = p.qlu - qtot;
        if qre < 0.0 || !qre.is_finite() {
            return Err(PbpkError::NegativeRestFlow(qre));
        }

        let cl_renal = (p.gfr + p.renal_secretion) * p.renal_scaling;
        let cl_int_hep = HEPATIC_CLINT_BASELINE * p.hepatic_scaling;

        let derived = Derived {
            kpre,
            vve,
            var,
            vre,
            qli,
            qtot,
            qre,
            cl_renal,
            cl_int_hep,
        };
        derived.circulation(p).check()?;

        tracing::debug!(
            kpre,
            vve,
            var,
            vre,
            qli,
            qre,
            cl_renal,
            cl_int_hep,
            "derived model quantities"
        );
        Ok(derived)
    }

    pub fn kpre(&self) -> f64 {
        self.kpre
    }

    pub fn vve(&self) -> f64 {
        self.vve
    }

    pub fn var(&self) -> f64 {
        self.var
    }

    pub fn vre(&self) -> f64 {
        self.vre
    }

    pub fn qli(&self) -> f64 {
        self.qli
    }

    pub fn qtot(&self) -> f64 {
        self.qtot
    }

    pub fn qre(&self) -> f64 {
        self.qre
    }

    /// Scaled renal clearance (L/h)
    pub fn cl_renal(&self) -> f64 {
        self.cl_renal
    }

    /// Scaled hepatic intrinsic clearance (L/h)
    pub fn cl_int_hep(&self) -> f64 {
        self.cl_int_hep
    }

    /// Flows leaving the arterial pool and entering the venous pool
    pub fn circulation(&self, p: &Parameters) -> Circulation {
        let arterial_outflow = p.qgu
            + p.qsp
            + p.qha
            + p.qki
            + p.qbo
            + p.qhe
            + p.qmu
            + p.qad
            + p.qbr
            + p.qsk
            + self.qre;
        let venous_return = self.qli
            + p.qki
            + p.qbo
            + p.qhe
            + p.qmu
            + p.qad
            + p.qbr
            + p.qsk
            + self.qre;
        Circulation {
            cardiac_output: p.qlu,
            arterial_outflow,
            venous_return,
        }
    }
}

/// Flow totals around the closed circulatory loop (L/h)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circulation {
    /// Flow through the lungs
    pub cardiac_output: f64,
    /// Sum of all branch flows supplied by the arterial pool
    pub arterial_outflow: f64,
    /// Sum of all organ outflows reaching the venous pool
    pub venous_return: f64,
}

impl Circulation {
    pub fn is_closed(&self) -> bool {
        self.check().is_ok()
    }

    pub(crate) fn check(&self) -> Result<(), PbpkError> {
        let tol = BALANCE_TOLERANCE * self.cardiac_output.abs().max(1.0);
        if (self.arterial_outflow - self.cardiac_output).abs() > tol {
            return Err(PbpkError::FlowImbalance {
                side: "arterial",
                flow: self.arterial_outflow,
                cardiac_output: self.cardiac_output,
            });
        }
        if (self.venous_return - self.cardiac_output).abs() > tol {
            return Err(PbpkError::FlowImbalance {
                side: "venous",
                flow: self.venous_return,
                cardiac_output: self.cardiac_output,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_derivation() {
        let p = Parameters::default();
        let d = Derived::new(&p).unwrap();

        assert_relative_eq!(d.qli, 95.55, epsilon = 1e-9);
        assert_relative_eq!(d.qtot, 356.85, epsilon = 1e-9);
        assert_relative_eq!(d.qre, 33.15, epsilon = 1e-9);
        assert_relative_eq!(d.vve, 3.948, epsilon = 1e-12);
        assert_relative_eq!(d.var, 1.652, epsilon = 1e-12);
        // 0.99 * 73 - 71.79
        assert_relative_eq!(d.vre, 0.48, epsilon = 1e-9);
        assert_relative_eq!(d.kpre, 7.845 / 10.0, epsilon = 1e-12);
        assert_relative_eq!(d.cl_renal, 8.0);
        assert_relative_eq!(d.cl_int_hep, 6.0);
    }

    #[test]
    fn test_literal_flow_balance() {
        let (qad, qbo, qbr, qgu, qhe, qki, qmu, qsp, qha, qsk) =
            (19.5, 19.5, 46.8, 58.5, 15.6, 74.1, 66.3, 11.7, 25.35, 19.5);
        let qli = qgu + qsp + qha;
        let total = qli + qki + qbo + qhe + qmu + qad + qbr + qsk;
        let qre: f64 = 390.0 - total;
        assert_relative_eq!(qli, 95.55, epsilon = 1e-9);
        assert_relative_eq!(total, 356.85, epsilon = 1e-9);
        assert_relative_eq!(qre, 33.15, epsilon = 1e-9);
        assert!(qre >= 0.0);
    }

    #[test]
    fn test_circulation_is_closed() {
        let p = Parameters::default();
        let d = Derived::new(&p).unwrap();
        let c = d.circulation(&p);
        assert!(c.is_closed());
        assert_relative_eq!(c.arterial_outflow, 390.0, epsilon = 1e-9);
        assert_relative_eq!(c.venous_return, 390.0, epsilon = 1e-9);
    }

    #[test]
    fn test_scaled_clearances() {
        let p = Parameters {
            renal_scaling: 0.5,
            hepatic_scaling: 2.0,
            ..Default::default()
        };
        let d = Derived::new(&p).unwrap();
        assert_relative_eq!(d.cl_renal, 4.0);
        assert_relative_eq!(d.cl_int_hep, 12.0);
    }

    #[test]
    fn test_rest_volume_must_be_positive() {
        let p = Parameters {
            weight: 60.0,
            ..Default::default()
        };
        assert!(matches!(
            Derived::new(&p),
            Err(PbpkError::NonPositiveRestVolume(v)) if v < 0.0
        ));
    }

    #[test]
    fn test_rest_flow_must_be_non_negative() {
        let p = Parameters {
            qmu: 120.0,
            ..Default::default()
        };
        assert!(matches!(
            Derived::new(&p),
            Err(PbpkError::NegativeRestFlow(q)) if q < 0.0
        ));
    }

    #[test]
    fn test_open_circulation_is_detected() {
        let p = Parameters::default();
        let mut d = Derived::new(&p).unwrap();
        d.qre += 1.0;
        assert!(!d.circulation(&p).is_closed());
    }
}
