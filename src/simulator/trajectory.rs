use ndarray::{Array2, ArrayView1, Axis};
use serde::Serialize;

use crate::data::auc;
use crate::model::{Compartment, Pbpk, NCAPTURED, NSTATES};

/// One output row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub time: f64,
    /// Amounts in state-vector order, see [Compartment::ALL]
    pub amounts: Vec<f64>,
    /// Concentrations in capture order, see [Compartment::CAPTURED]
    pub concentrations: Vec<f64>,
}

/// Simulated time course, one row per requested output time
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Vec<f64>,
    states: Array2<f64>,
    concentrations: Array2<f64>,
    filled: usize,
}

impl Trajectory {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Trajectory {
            times: Vec::with_capacity(n),
            states: Array2::zeros((n, NSTATES)),
            concentrations: Array2::zeros((n, NCAPTURED)),
            filled: 0,
        }
    }

    pub(crate) fn push(&mut self, time: f64, state: &[f64], model: &Pbpk) {
        let row = self.filled;
        self.times.push(time);
        self.states
            .row_mut(row)
            .assign(&ArrayView1::from(&state[..NSTATES]));
        self.concentrations
            .row_mut(row)
            .assign(&ArrayView1::from(&model.concentrations(state).to_array()[..]));
        self.filled += 1;
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Amounts, one row per output time and one column per [Compartment]
    pub fn states(&self) -> &Array2<f64> {
        &self.states
    }

    /// Concentrations, one column per entry of [Compartment::CAPTURED]
    pub fn concentration_table(&self) -> &Array2<f64> {
        &self.concentrations
    }

    /// Amount time course of one compartment
    pub fn amounts(&self, compartment: Compartment) -> ArrayView1<'_, f64> {
        self.states.column(compartment.index())
    }

    /// Concentration time course, `None` for URINE and AUC
    pub fn concentrations(&self, compartment: Compartment) -> Option<ArrayView1<'_, f64>> {
        compartment
            .capture_index()
            .map(|i| self.concentrations.column(i))
    }

    pub fn record(&self, row: usize) -> Option<Record> {
        if row >= self.filled {
            return None;
        }
        Some(Record {
            time: self.times[row],
            amounts: self.states.row(row).to_vec(),
            concentrations: self.concentrations.row(row).to_vec(),
        })
    }

    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        (0..self.filled).filter_map(|row| self.record(row))
    }

    pub fn final_state(&self) -> Option<Vec<f64>> {
        self.filled
            .checked_sub(1)
            .map(|row| self.states.row(row).to_vec())
    }

    /// Amount remaining in the body at each output time
    pub fn body_amounts(&self) -> Vec<f64> {
        self.states
            .axis_iter(Axis(0))
            .map(|row| Pbpk::body_amount(&row.to_vec()))
            .collect()
    }

    /// Trapezoidal AUC of a compartment's sampled concentration
    pub fn trapezoidal_auc(&self, compartment: Compartment) -> Option<f64> {
        let values = self.concentrations(compartment)?.to_vec();
        auc::auc(&self.times, &values).ok()
    }

    /// Column headers matching [Record]: time, state names, concentration names
    pub fn headers() -> Vec<&'static str> {
        std::iter::once("time")
            .chain(Compartment::ALL.iter().map(|c| c.name()))
            .chain(
                Compartment::CAPTURED
                    .iter()
                    .filter_map(|c| c.concentration_name()),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Parameters;

    #[test]
    fn test_push_and_access() {
        let model = Pbpk::new(Parameters::default()).unwrap();
        let mut trajectory = Trajectory::with_capacity(2);
        let mut x = [0.0; NSTATES];
        x[Compartment::Liver.index()] = 1.8;
        trajectory.push(0.0, &x, &model);
        x[Compartment::Liver.index()] = 3.6;
        x[Compartment::Urine.index()] = 4.0;
        trajectory.push(1.0, &x, &model);

        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.times(), &[0.0, 1.0]);
        let liver = trajectory.concentrations(Compartment::Liver).unwrap();
        assert_eq!(liver.to_vec(), vec![1.0, 2.0]);
        assert!(trajectory.concentrations(Compartment::Urine).is_none());
        assert_eq!(trajectory.amounts(Compartment::Urine).to_vec(), vec![0.0, 4.0]);
        assert_eq!(trajectory.body_amounts(), vec![1.8, 3.6]);
        let table = trajectory.concentration_table();
        assert_eq!(table.dim(), (2, NCAPTURED));
        let liver_column = Compartment::Liver.capture_index().unwrap();
        assert_eq!(table[[1, liver_column]], 2.0);
        assert_eq!(trajectory.trapezoidal_auc(Compartment::Liver), Some(1.5));

        let last = trajectory.final_state().unwrap();
        assert_eq!(last[Compartment::Urine.index()], 4.0);
        let record = trajectory.record(1).unwrap();
        assert_eq!(record.time, 1.0);
        assert_eq!(record.amounts.len(), NSTATES);
        assert_eq!(record.concentrations.len(), NCAPTURED);
        assert!(trajectory.record(2).is_none());
        assert_eq!(trajectory.records().count(), 2);
    }

    #[test]
    fn test_headers() {
        let headers = Trajectory::headers();
        assert_eq!(headers.len(), 1 + NSTATES + NCAPTURED);
        assert_eq!(headers[0], "time");
        assert_eq!(headers[1], "GUTLUMEN");
        assert_eq!(headers[1 + NSTATES], "Cadipose");
    }

    #[test]
    fn test_empty() {
        let trajectory = Trajectory::with_capacity(0);
        assert!(trajectory.is_empty());
        assert!(trajectory.final_state().is_none());
    }
}
