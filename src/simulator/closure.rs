use diffsol::{
    ConstantOp, NonLinearOp, NonLinearOpJacobian, OdeEquations, OdeEquationsRef, Op,
    UnitCallable, Vector, VectorHost,
};

use super::{C, M, T, V};
use crate::data::Infusion;
use crate::model::{Pbpk, NSTATES};

pub struct PbpkRhs<'a> {
    model: &'a Pbpk,
    infusions: &'a [Infusion],
    ctx: &'a C,
}

impl Op for PbpkRhs<'_> {
    type T = T;
    type V = V;
    type M = M;
    type C = C;
    fn nstates(&self) -> usize {
        NSTATES
    }
    fn nout(&self) -> usize {
        NSTATES
    }
    fn nparams(&self) -> usize {
        0
    }
    fn context(&self) -> &Self::C {
        self.ctx
    }
}

impl NonLinearOp for PbpkRhs<'_> {
    fn call_inplace(&self, x: &Self::V, t: Self::T, y: &mut Self::V) {
        let dx = y.as_mut_slice();
        self.model.derivative(t, x.as_slice(), dx);
        for infusion in self.infusions {
            if infusion.is_active(t) {
                dx[infusion.input().index()] += infusion.rate();
            }
        }
    }
}

impl NonLinearOpJacobian for PbpkRhs<'_> {
    // The kinetics are linear and homogeneous in the state, so J * v = f(v)
    // once the infusion inputs are left out.
    fn jac_mul_inplace(&self, _x: &Self::V, t: Self::T, v: &Self::V, y: &mut Self::V) {
        self.model.derivative(t, v.as_slice(), y.as_mut_slice());
    }
}

pub struct PbpkInit<'a> {
    y0: &'a V,
    ctx: &'a C,
}

impl Op for PbpkInit<'_> {
    type T = T;
    type V = V;
    type M = M;
    type C = C;
    fn nstates(&self) -> usize {
        NSTATES
    }
    fn nout(&self) -> usize {
        NSTATES
    }
    fn nparams(&self) -> usize {
        0
    }
    fn context(&self) -> &Self::C {
        self.ctx
    }
}

impl ConstantOp for PbpkInit<'_> {
    fn call_inplace(&self, _t: Self::T, y: &mut Self::V) {
        y.copy_from(self.y0);
    }
}

/// One run of the model as seen by the integrator: the validated model, the
/// infusions feeding it and the initial state.
pub struct PbpkProblem {
    model: Pbpk,
    infusions: Vec<Infusion>,
    y0: V,
    p: V,
    ctx: C,
}

impl PbpkProblem {
    pub fn new(model: Pbpk, infusions: Vec<Infusion>, y0: &[f64]) -> Self {
        let ctx = C::default();
        let y0 = V::from_vec(y0.to_vec(), ctx.clone());
        let p = V::zeros(0, ctx.clone());
        Self {
            model,
            infusions,
            y0,
            p,
            ctx,
        }
    }
}

impl Op for PbpkProblem {
    type T = T;
    type V = V;
    type M = M;
    type C = C;
    fn nstates(&self) -> usize {
        NSTATES
    }
    fn nout(&self) -> usize {
        NSTATES
    }
    fn nparams(&self) -> usize {
        0
    }
    fn context(&self) -> &Self::C {
        &self.ctx
    }
}

impl<'a> OdeEquationsRef<'a> for PbpkProblem {
    type Rhs = PbpkRhs<'a>;
    type Mass = UnitCallable<M>;
    type Init = PbpkInit<'a>;
    type Root = UnitCallable<M>;
    type Out = UnitCallable<M>;
}

impl OdeEquations for PbpkProblem {
    fn rhs(&self) -> PbpkRhs<'_> {
        PbpkRhs {
            model: &self.model,
            infusions: &self.infusions,
            ctx: &self.ctx,
        }
    }

    fn mass(&self) -> Option<UnitCallable<M>> {
        None
    }

    fn root(&self) -> Option<UnitCallable<M>> {
        None
    }

    fn out(&self) -> Option<UnitCallable<M>> {
        None
    }

    fn init(&self) -> PbpkInit<'_> {
        PbpkInit {
            y0: &self.y0,
            ctx: &self.ctx,
        }
    }

    fn set_params(&mut self, p: &Self::V) {
        self.p.copy_from(p);
    }

    fn get_params(&self, p: &mut Self::V) {
        p.copy_from(&self.p);
    }
}
