//! Right-hand side of the model.
//!
//! Everything here is pure arithmetic over a state slice, the run parameters
//! and the derived quantities. Rates are split in two passes: [transport]
//! writes every physiological and excretion slot, [observe] writes the
//! observer slots. The observer pass reads the state but nothing reads the
//! observer slots, so they cannot feed back into the kinetics.

use serde::Serialize;

use super::compartment::{Compartment as C, NCAPTURED, NSTATES};
use super::derived::Derived;
use super::parameters::Parameters;

/// Concentrations derived from one state vector (mg/L for amounts in mg)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Concentrations {
    pub adipose: f64,
    pub bone: f64,
    pub brain: f64,
    pub heart: f64,
    pub kidney: f64,
    pub liver: f64,
    pub lung: f64,
    pub muscle: f64,
    pub spleen: f64,
    pub rest: f64,
    pub arterial: f64,
    pub venous: f64,
    pub gut_lumen: f64,
    pub gut: f64,
    pub skin: f64,
}

impl Concentrations {
    pub(crate) fn new(x: &[f64], p: &Parameters, d: &Derived) -> Self {
        Concentrations {
            adipose: x[C::Adipose as usize] / p.vad,
            bone: x[C::Bone as usize] / p.vbo,
            brain: x[C::Brain as usize] / p.vbr,
            heart: x[C::Heart as usize] / p.vhe,
            kidney: x[C::Kidney as usize] / p.vki,
            liver: x[C::Liver as usize] / p.vli,
            lung: x[C::Lung as usize] / p.vlu,
            muscle: x[C::Muscle as usize] / p.vmu,
            spleen: x[C::Spleen as usize] / p.vsp,
            rest: x[C::Rest as usize] / d.vre,
            arterial: x[C::Arterial as usize] / d.var,
            venous: x[C::Venous as usize] / d.vve,
            gut_lumen: x[C::GutLumen as usize] / p.vgu_lumen,
            gut: x[C::Gut as usize] / p.vgu_wall,
            skin: x[C::Skin as usize] / p.vsk,
        }
    }

    /// Values in the order of [C::CAPTURED]
    pub fn to_array(&self) -> [f64; NCAPTURED] {
        [
            self.adipose,
            self.bone,
            self.brain,
            self.heart,
            self.kidney,
            self.liver,
            self.lung,
            self.muscle,
            self.spleen,
            self.rest,
            self.arterial,
            self.venous,
            self.gut_lumen,
            self.gut,
            self.skin,
        ]
    }

    /// Unbound liver concentration, the one hepatic clearance acts on
    #[inline]
    pub fn liver_free(&self, p: &Parameters) -> f64 {
        p.fup * self.liver
    }

    /// Unbound kidney concentration, the one renal clearance acts on
    #[inline]
    pub fn kidney_free(&self, p: &Parameters) -> f64 {
        p.fup * self.kidney
    }
}

/// Rate of urinary excretion for the given concentrations
#[inline]
fn renal_elimination(c: &Concentrations, p: &Parameters, d: &Derived) -> f64 {
    d.cl_renal * (c.kidney_free(p) / (p.kpki / p.bp))
}

/// Rate of hepatic elimination for the given concentrations
#[inline]
fn hepatic_elimination(c: &Concentrations, p: &Parameters, d: &Derived) -> f64 {
    d.cl_int_hep * (c.liver_free(p) / (p.kpli / p.bp))
}

/// Flow-limited distribution rates for every non-observer slot.
///
/// `x` and `dx` must hold [NSTATES] values. Observer slots of `dx` are left
/// untouched.
pub(crate) fn transport(x: &[f64], p: &Parameters, d: &Derived, dx: &mut [f64]) {
    debug_assert!(x.len() >= NSTATES && dx.len() >= NSTATES);
    let c = Concentrations::new(x, p, d);
    let bp = p.bp;

    // Venous-equivalent outflow concentrations, tissue / (Kp / BP)
    let out_ad = c.adipose / (p.kpad / bp);
    let out_bo = c.bone / (p.kpbo / bp);
    let out_br = c.brain / (p.kpbr / bp);
    let out_gu = c.gut / (p.kpgu / bp);
    let out_he = c.heart / (p.kphe / bp);
    let out_ki = c.kidney / (p.kpki / bp);
    let out_li = c.liver / (p.kpli / bp);
    let out_lu = c.lung / (p.kplu / bp);
    let out_mu = c.muscle / (p.kpmu / bp);
    let out_sp = c.spleen / (p.kpsp / bp);
    let out_sk = c.skin / (p.kpsk / bp);
    let out_re = c.rest / (d.kpre / bp);

    let absorption = p.ka * p.fa * x[C::GutLumen as usize];
    let renal = renal_elimination(&c, p, d);
    let hepatic = hepatic_elimination(&c, p, d);
    let cart = c.arterial;

    dx[C::GutLumen as usize] = -absorption;
    dx[C::Gut as usize] = p.qgu * (cart - out_gu) + absorption;
    dx[C::Adipose as usize] = p.qad * (cart - out_ad);
    dx[C::Brain as usize] = p.qbr * (cart - out_br);
    dx[C::Heart as usize] = p.qhe * (cart - out_he);
    dx[C::Kidney as usize] = p.qki * (cart - out_ki) - renal;
    dx[C::Liver as usize] =
        p.qgu * out_gu + p.qsp * out_sp + p.qha * cart - d.qli * out_li - hepatic;
    dx[C::Lung as usize] = p.qlu * (c.venous - out_lu);
    dx[C::Muscle as usize] = p.qmu * (cart - out_mu);
    dx[C::Spleen as usize] = p.qsp * (cart - out_sp);
    dx[C::Bone as usize] = p.qbo * (cart - out_bo);
    dx[C::Skin as usize] = p.qsk * (cart - out_sk);
    dx[C::Rest as usize] = d.qre * (cart - out_re);

    // Confluence of every organ outflow except gut and spleen, which drain
    // through the liver
    dx[C::Venous as usize] = p.qad * out_ad
        + p.qbr * out_br
        + p.qhe * out_he
        + p.qki * out_ki
        + d.qli * out_li
        + p.qmu * out_mu
        + p.qbo * out_bo
        + p.qsk * out_sk
        + d.qre * out_re
        - p.qlu * c.venous;
    dx[C::Arterial as usize] = p.qlu * (out_lu - cart);

    dx[C::Urine as usize] = renal;
}

/// Rates of the observer slots
pub(crate) fn observe(x: &[f64], p: &Parameters, d: &Derived, dx: &mut [f64]) {
    let cven = x[C::Venous as usize] / d.vve;
    dx[C::Auc as usize] = cven / p.bp;
}

/// Full derivative `dx = f(t, x)`.
///
/// The model is autonomous, `t` is accepted to match the integrator's
/// signature.
pub(crate) fn derivative(_t: f64, x: &[f64], p: &Parameters, d: &Derived, dx: &mut [f64]) {
    transport(x, p, d, dx);
    observe(x, p, d, dx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> (Parameters, Derived) {
        let p = Parameters::default();
        let d = Derived::new(&p).unwrap();
        (p, d)
    }

    /// State where every tissue is at equilibrium with arterial blood
    fn equilibrium_state(p: &Parameters, d: &Derived, cart: f64) -> [f64; NSTATES] {
        let mut x = [0.0; NSTATES];
        let tissue = |kp: f64| cart * kp / p.bp;
        x[C::Adipose as usize] = tissue(p.kpad) * p.vad;
        x[C::Bone as usize] = tissue(p.kpbo) * p.vbo;
        x[C::Brain as usize] = tissue(p.kpbr) * p.vbr;
        x[C::Gut as usize] = tissue(p.kpgu) * p.vgu_wall;
        x[C::Heart as usize] = tissue(p.kphe) * p.vhe;
        x[C::Kidney as usize] = tissue(p.kpki) * p.vki;
        x[C::Liver as usize] = tissue(p.kpli) * p.vli;
        x[C::Lung as usize] = tissue(p.kplu) * p.vlu;
        x[C::Muscle as usize] = tissue(p.kpmu) * p.vmu;
        x[C::Spleen as usize] = tissue(p.kpsp) * p.vsp;
        x[C::Skin as usize] = tissue(p.kpsk) * p.vsk;
        x[C::Rest as usize] = tissue(d.kpre) * d.vre;
        x[C::Arterial as usize] = cart * d.var;
        x[C::Venous as usize] = cart * d.vve;
        x
    }

    #[test]
    fn test_zero_state_has_zero_rates() {
        let (p, d) = reference();
        let x = [0.0; NSTATES];
        let mut dx = [1.0; NSTATES];
        derivative(0.0, &x, &p, &d, &mut dx);
        assert!(dx.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_gut_lumen_absorption() {
        let (p, d) = reference();
        let mut x = [0.0; NSTATES];
        x[C::GutLumen as usize] = 100.0;
        let mut dx = [0.0; NSTATES];
        derivative(0.0, &x, &p, &d, &mut dx);
        assert_relative_eq!(dx[C::GutLumen as usize], -27.0, epsilon = 1e-12);
        assert_relative_eq!(dx[C::Gut as usize], 27.0, epsilon = 1e-12);
        assert_eq!(dx[C::Liver as usize], 0.0);
    }

    #[test]
    fn test_equilibrium_without_clearance_is_stationary() {
        let p = Parameters {
            renal_scaling: 0.0,
            hepatic_scaling: 0.0,
            ..Default::default()
        };
        let d = Derived::new(&p).unwrap();
        let x = equilibrium_state(&p, &d, 2.5);
        let mut dx = [0.0; NSTATES];
        transport(&x, &p, &d, &mut dx);
        for c in C::ALL {
            if c == C::Auc {
                continue;
            }
            assert!(
                dx[c.index()].abs() < 1e-9,
                "{} is not stationary: {}",
                c,
                dx[c.index()]
            );
        }
    }

    #[test]
    fn test_rates_conserve_mass_without_clearance() {
        let p = Parameters {
            renal_scaling: 0.0,
            hepatic_scaling: 0.0,
            ..Default::default()
        };
        let d = Derived::new(&p).unwrap();
        let mut x = [0.0; NSTATES];
        for (i, value) in x.iter_mut().enumerate().take(C::Skin as usize + 1) {
            *value = 1.0 + i as f64;
        }
        let mut dx = [0.0; NSTATES];
        derivative(0.0, &x, &p, &d, &mut dx);
        let net: f64 = dx[..=C::Skin as usize].iter().sum();
        assert!(net.abs() < 1e-9, "net rate {}", net);
        assert_eq!(dx[C::Urine as usize], 0.0);
    }

    #[test]
    fn test_clearance_matches_excretion() {
        let (p, d) = reference();
        let x = equilibrium_state(&p, &d, 1.0);
        let mut dx = [0.0; NSTATES];
        derivative(0.0, &x, &p, &d, &mut dx);

        let c = Concentrations::new(&x, &p, &d);
        let renal = renal_elimination(&c, &p, &d);
        let hepatic = hepatic_elimination(&c, &p, &d);
        assert_relative_eq!(dx[C::Urine as usize], renal, epsilon = 1e-12);
        // Body loses exactly what the kidney and liver clear
        let body: f64 = dx[..=C::Skin as usize].iter().sum();
        assert_relative_eq!(body, -(renal + hepatic), epsilon = 1e-9);
        // At Ckidney = Kpki * Cart, renal elimination is CLrenal * Cart
        assert_relative_eq!(renal, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_observer_does_not_feed_back() {
        let (p, d) = reference();
        let mut x = equilibrium_state(&p, &d, 1.0);
        let mut dx_a = [0.0; NSTATES];
        transport(&x, &p, &d, &mut dx_a);
        x[C::Auc as usize] = 1.0e6;
        let mut dx_b = [0.0; NSTATES];
        transport(&x, &p, &d, &mut dx_b);
        assert_eq!(dx_a, dx_b);

        let mut dx = [0.0; NSTATES];
        observe(&x, &p, &d, &mut dx);
        assert_relative_eq!(dx[C::Auc as usize], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unbound_fraction_scales_clearance() {
        let p = Parameters {
            fup: 0.25,
            ..Default::default()
        };
        let d = Derived::new(&p).unwrap();
        let x = equilibrium_state(&p, &d, 1.0);
        let mut dx = [0.0; NSTATES];
        derivative(0.0, &x, &p, &d, &mut dx);
        assert_relative_eq!(dx[C::Urine as usize], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_concentrations() {
        let (p, d) = reference();
        let mut x = [0.0; NSTATES];
        x[C::Liver as usize] = 3.6;
        x[C::Venous as usize] = d.vve;
        let c = Concentrations::new(&x, &p, &d);
        assert_relative_eq!(c.liver, 2.0);
        assert_relative_eq!(c.venous, 1.0);
        assert_eq!(c.to_array()[C::Liver.capture_index().unwrap()], 2.0);
    }
}
