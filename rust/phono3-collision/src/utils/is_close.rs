use nalgebra::Matrix3;
use ndarray::{ArrayBase, Data, Dimension};

/// Element-wise closeness check returning a readable report of every
/// offending element, for use in tests and sanity checks.
pub trait IsClose<Rhs = Self> {
    fn is_close(&self, other: &Rhs, abs_tol: f64, rel_tol: f64) -> Result<(), String>;
}

fn tolerance(a: f64, b: f64, abs_tol: f64, rel_tol: f64) -> f64 {
    rel_tol.mul_add(a.abs().max(b.abs()), abs_tol).max(abs_tol)
}

impl<S1, S2, D> IsClose<ArrayBase<S2, D>> for ArrayBase<S1, D>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    fn is_close(&self, other: &ArrayBase<S2, D>, abs_tol: f64, rel_tol: f64) -> Result<(), String> {
        if self.shape() != other.shape() {
            return Err(format!(
                "Array shapes differ: actual {:?}, expected {:?}",
                self.shape(),
                other.shape()
            ));
        }
        let mut errors = Vec::new();
        for ((idx, a), b) in self.indexed_iter().zip(other.iter()) {
            let abs_diff = (a - b).abs();
            let tol = tolerance(*a, *b, abs_tol, rel_tol);
            if abs_diff > tol || abs_diff.is_nan() {
                errors.push(format!(
                    "Element at index {:?} differs: actual {}, expected {}, abs_diff {}, tolerance {}",
                    idx,
                    a,
                    b,
                    abs_diff,
                    tol
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}

impl IsClose<Matrix3<f64>> for Matrix3<f64> {
    fn is_close(&self, other: &Matrix3<f64>, abs_tol: f64, rel_tol: f64) -> Result<(), String> {
        let mut errors = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                let (a, b) = (self[(i, j)], other[(i, j)]);
                let tol = tolerance(a, b, abs_tol, rel_tol);
                if (a - b).abs() > tol || (a - b).is_nan() {
                    errors.push(format!(
                        "Element ({i}, {j}) differs: actual {a}, expected {b}, tolerance {tol}"
                    ));
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}

impl IsClose<f64> for f64 {
    fn is_close(&self, other: &f64, abs_tol: f64, rel_tol: f64) -> Result<(), String> {
        let abs_diff = (self - other).abs();
        let tol = tolerance(*self, *other, abs_tol, rel_tol);
        if abs_diff > tol || abs_diff.is_nan() {
            return Err(format!(
                "Scalar differs: actual {}, expected {}, abs_diff {}, tolerance {}",
                self, other, abs_diff, tol
            ));
        }
        Ok(())
    }
}
