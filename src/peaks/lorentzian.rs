//! A closed-form fit of a Lorentzian peak-shape model to magnitude samples.

use std::f64::consts::PI;

use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Errors that may occur when constructing a [`MagnitudeLorentzian`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LorentzianFitError {
    /// Fewer than 3 samples with distinct x coordinates were supplied
    #[error("a Lorentzian fit requires at least 3 samples with distinct x values, received {0}")]
    InsufficientData(usize),
    /// Direct construction with the wrong coefficient count
    #[error("a magnitude Lorentzian takes exactly 3 coefficients, received {0}")]
    InvalidCoefficientCount(usize),
    /// The weighted normal equations did not determine a parabola
    #[error("the weighted normal equations for the fit are singular")]
    Degenerate,
}

/// Solve the weighted quadratic regression `y ≈ a·x² + b·x + c` over
/// `points` by the closed-form normal equations. Returns `None` when the
/// system is singular.
fn weighted_parabola(points: &[(f64, f64)], weights: &[f64]) -> Option<[f64; 3]> {
    let mut moments = [0.0f64; 5];
    let mut projections = [0.0f64; 3];
    for (&(x, y), &w) in points.iter().zip(weights) {
        let mut xk = w;
        for moment in moments.iter_mut() {
            *moment += xk;
            xk *= x;
        }
        let mut xk = w * y;
        for projection in projections.iter_mut() {
            *projection += xk;
            xk *= x;
        }
    }

    let normal = Matrix3::new(
        moments[4], moments[3], moments[2],
        moments[3], moments[2], moments[1],
        moments[2], moments[1], moments[0],
    );
    let target = Vector3::new(projections[2], projections[1], projections[0]);
    let solution = normal.lu().solve(&target)?;
    Some([solution[0], solution[1], solution[2]])
}

fn count_distinct_x(samples: &[(f64, f64)]) -> usize {
    let mut xs: Vec<f64> = samples.iter().map(|&(x, _)| x).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    xs.len()
}

/**
A Lorentzian magnitude profile `magnitude(x) = 1/√(a·x² + b·x + c)`, held as
the coefficients of the linearized relation `1/magnitude² ≈ a·x² + b·x + c`.

Fitting from samples transforms each `(x, magnitude)` observation to
`(x, 1/magnitude²)` and solves a weighted quadratic regression over the
transformed points. The weight `magnitude⁶ / 4` is the analytic propagation
of measurement uncertainty through the transform, which keeps the reported
residual meaningful back in the untransformed magnitude domain.

A model is immutable once constructed: either a fully valid model is
produced or an error is, and the residual is set exactly once.
*/
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagnitudeLorentzian {
    coefficients: [f64; 3],
    least_squares_error: f64,
}

impl MagnitudeLorentzian {
    /// Construct directly from known coefficients
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self {
            coefficients: [a, b, c],
            least_squares_error: 0.0,
        }
    }

    /// Construct from a previously stored coefficient set, which must hold
    /// exactly 3 values
    pub fn from_coefficients(coefficients: Vec<f64>) -> Result<Self, LorentzianFitError> {
        match <[f64; 3]>::try_from(coefficients) {
            Ok([a, b, c]) => Ok(Self::new(a, b, c)),
            Err(coefficients) => Err(LorentzianFitError::InvalidCoefficientCount(
                coefficients.len(),
            )),
        }
    }

    /**
    Fit the model to ordered `(x, magnitude)` samples.

    Magnitudes must be strictly positive, and at least 3 samples with
    distinct `x` are required. The fit is closed form; no iterative solver
    is involved, and the sample ordering does not affect the result.
    */
    pub fn fit(samples: &[(f64, f64)]) -> Result<Self, LorentzianFitError> {
        let distinct = count_distinct_x(samples);
        if distinct < 3 {
            return Err(LorentzianFitError::InsufficientData(distinct));
        }

        let transformed: Vec<(f64, f64)> = samples
            .iter()
            .map(|&(x, magnitude)| (x, (magnitude * magnitude).recip()))
            .collect();
        let weights: Vec<f64> = samples
            .iter()
            .map(|&(_, magnitude)| magnitude.powi(6) / 4.0)
            .collect();

        let coefficients =
            weighted_parabola(&transformed, &weights).ok_or(LorentzianFitError::Degenerate)?;

        let mut this = Self {
            coefficients,
            least_squares_error: 0.0,
        };
        // The residual lives in the original magnitude domain so that it
        // stays comparable across differently scaled peaks.
        this.least_squares_error = samples
            .iter()
            .map(|&(x, magnitude)| {
                let diff = magnitude - this.value(x);
                diff * diff
            })
            .sum();
        Ok(this)
    }

    /// Evaluate the modeled magnitude at `x`
    pub fn value(&self, x: f64) -> f64 {
        let [a, b, c] = self.coefficients;
        1.0 / (a * x * x + b * x + c).sqrt()
    }

    pub fn coefficients(&self) -> &[f64; 3] {
        &self.coefficients
    }

    /// The sum of squared magnitude-domain residuals recorded at fit time.
    /// Zero for directly constructed models.
    pub fn least_squares_error(&self) -> f64 {
        self.least_squares_error
    }

    /// The peak center `−b/(2a)`. Only meaningful when `a > 0`.
    pub fn center(&self) -> f64 {
        let [a, b, _] = self.coefficients;
        -b / (2.0 * a)
    }

    /// The peak width term `2π/√a`. Only meaningful when `a > 0`.
    pub fn alpha(&self) -> f64 {
        let [a, _, _] = self.coefficients;
        2.0 * PI / a.sqrt()
    }

    /// The normalized amplitude, the modeled apex magnitude over
    /// [`MagnitudeLorentzian::alpha`]. Only meaningful when `a > 0`.
    pub fn tau(&self) -> f64 {
        self.value(self.center()) / self.alpha()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const REFERENCE: [f64; 3] = [4.0, -8.0, 5.0];

    fn reference_samples(xs: &[f64]) -> Vec<(f64, f64)> {
        let model = MagnitudeLorentzian::new(REFERENCE[0], REFERENCE[1], REFERENCE[2]);
        xs.iter().map(|&x| (x, model.value(x))).collect()
    }

    #[test]
    fn test_fit_recovers_known_coefficients() {
        let samples = reference_samples(&[0.0, 0.5, 1.0, 1.5, 2.0]);
        let fitted = MagnitudeLorentzian::fit(&samples).unwrap();

        for (fitted, expected) in fitted.coefficients().iter().zip(REFERENCE) {
            assert!(
                (fitted - expected).abs() < 1e-9,
                "coefficient {fitted} != {expected}"
            );
        }
        assert!(fitted.least_squares_error() < 1e-18);
        assert!((fitted.center() - 1.0).abs() < 1e-9);
        assert!((fitted.alpha() - PI).abs() < 1e-9);
        assert!((fitted.tau() - 1.0 / PI).abs() < 1e-9);
    }

    #[test]
    fn test_fit_is_permutation_invariant() {
        let forward = reference_samples(&[0.0, 0.5, 1.0, 1.5, 2.0, 2.5]);
        let mut shuffled = forward.clone();
        shuffled.swap(0, 5);
        shuffled.swap(1, 3);
        shuffled.reverse();

        let a = MagnitudeLorentzian::fit(&forward).unwrap();
        let b = MagnitudeLorentzian::fit(&shuffled).unwrap();
        for (x, y) in a.coefficients().iter().zip(b.coefficients()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_insufficient_distinct_samples() {
        for samples in [
            Vec::new(),
            vec![(1.0, 0.5)],
            vec![(1.0, 0.5), (2.0, 0.25)],
            // Repeated x coordinates do not count as distinct
            vec![(1.0, 0.5), (1.0, 0.55), (2.0, 0.25)],
        ] {
            let distinct = samples
                .iter()
                .map(|&(x, _)| x as i64)
                .collect::<std::collections::HashSet<_>>()
                .len();
            let err = MagnitudeLorentzian::fit(&samples).unwrap_err();
            assert_eq!(err, LorentzianFitError::InsufficientData(distinct));
        }
    }

    #[test]
    fn test_exactly_three_distinct_samples_fit() {
        let samples = reference_samples(&[0.5, 1.0, 1.5]);
        let fitted = MagnitudeLorentzian::fit(&samples).unwrap();
        for (fitted, expected) in fitted.coefficients().iter().zip(REFERENCE) {
            assert!((fitted - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_direct_construction_validates_count() {
        assert_eq!(
            MagnitudeLorentzian::from_coefficients(vec![4.0, -8.0]).unwrap_err(),
            LorentzianFitError::InvalidCoefficientCount(2)
        );
        assert_eq!(
            MagnitudeLorentzian::from_coefficients(vec![4.0, -8.0, 5.0, 1.0]).unwrap_err(),
            LorentzianFitError::InvalidCoefficientCount(4)
        );

        let direct = MagnitudeLorentzian::from_coefficients(REFERENCE.to_vec()).unwrap();
        let fitted =
            MagnitudeLorentzian::fit(&reference_samples(&[0.0, 0.5, 1.0, 1.5, 2.0])).unwrap();
        for x in [0.0, 0.25, 1.0, 1.75] {
            assert!((direct.value(x) - fitted.value(x)).abs() < 1e-9);
        }
        assert_eq!(direct.least_squares_error(), 0.0);
    }
}
