//! Trapezoidal AUC over sampled profiles.
//!
//! Used to cross-check the AUC observer slot of a simulation against the
//! sampled venous profile. All functions work on raw `&[f64]` slices.
//!
//! ```rust
//! use pbpk::data::auc::auc;
//!
//! let times = [0.0, 1.0, 2.0, 4.0];
//! let concs = [0.0, 10.0, 8.0, 4.0];
//! let result = auc(&times, &concs).unwrap();
//! // (0+10)/2*1 + (10+8)/2*1 + (8+4)/2*2 = 5 + 9 + 12 = 26
//! assert!((result - 26.0).abs() < 1e-10);
//! ```

use crate::PbpkError;

/// Linear trapezoidal AUC for a single segment
#[inline]
fn auc_linear(c1: f64, c2: f64, dt: f64) -> f64 {
    (c1 + c2) / 2.0 * dt
}

fn check(times: &[f64], values: &[f64]) -> Result<(), PbpkError> {
    if times.len() != values.len() {
        return Err(PbpkError::InvalidOutputTimes(format!(
            "{} times but {} values",
            times.len(),
            values.len()
        )));
    }
    if times.windows(2).any(|w| w[1] < w[0]) {
        return Err(PbpkError::InvalidOutputTimes(
            "times must be non-decreasing".to_string(),
        ));
    }
    Ok(())
}

/// Linear trapezoidal AUC from the first to the last time point
pub fn auc(times: &[f64], values: &[f64]) -> Result<f64, PbpkError> {
    check(times, values)?;
    Ok(times
        .windows(2)
        .zip(values.windows(2))
        .map(|(t, c)| auc_linear(c[0], c[1], t[1] - t[0]))
        .sum())
}

/// Running AUC, one value per time point starting at zero
pub fn cumulative_auc(times: &[f64], values: &[f64]) -> Result<Vec<f64>, PbpkError> {
    check(times, values)?;
    let mut acc = 0.0;
    let mut out = Vec::with_capacity(times.len());
    if !times.is_empty() {
        out.push(0.0);
    }
    for (t, c) in times.windows(2).zip(values.windows(2)) {
        acc += auc_linear(c[0], c[1], t[1] - t[0]);
        out.push(acc);
    }
    Ok(out)
}

/// Maximum value and the first time it is reached
pub fn cmax(times: &[f64], values: &[f64]) -> Option<(f64, f64)> {
    times
        .iter()
        .zip(values.iter())
        .fold(None, |best: Option<(f64, f64)>, (&t, &c)| match best {
            Some((_, bc)) if bc >= c => best,
            _ => Some((t, c)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_auc_linear() {
        let times = [0.0, 1.0, 2.0, 4.0];
        let concs = [0.0, 10.0, 8.0, 4.0];
        assert_relative_eq!(auc(&times, &concs).unwrap(), 26.0);
        assert_eq!(
            cumulative_auc(&times, &concs).unwrap(),
            vec![0.0, 5.0, 14.0, 26.0]
        );
    }

    #[test]
    fn test_auc_of_exponential_converges() {
        let times: Vec<f64> = (0..=2000).map(|i| i as f64 * 0.01).collect();
        let concs: Vec<f64> = times.iter().map(|t| (-0.5 * t).exp()).collect();
        let expected = (1.0 - (-0.5f64 * 20.0).exp()) / 0.5;
        assert_relative_eq!(auc(&times, &concs).unwrap(), expected, max_relative = 1e-4);
    }

    #[test]
    fn test_rejects_mismatched_input() {
        assert!(auc(&[0.0, 1.0], &[1.0]).is_err());
        assert!(auc(&[1.0, 0.0], &[1.0, 1.0]).is_err());
        assert_eq!(auc(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_cmax() {
        let times = [0.0, 1.0, 2.0, 3.0];
        let concs = [0.0, 4.0, 4.0, 1.0];
        assert_eq!(cmax(&times, &concs), Some((1.0, 4.0)));
        assert_eq!(cmax(&[], &[]), None);
    }
}
