use nalgebra::Matrix3;

use super::SymmetryError;

/// Computes $P M P^{-1}$.
///
/// Returns `None` when `p` is singular.
pub fn similarity_transformation(p: &Matrix3<f64>, m: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    p.try_inverse().map(|p_inv| p * m * p_inv)
}

/// Point-group operations held in two bases with index correspondence:
/// integer matrices acting on fractional reciprocal coordinates (grid
/// addresses), and the same operations as real matrices acting on Cartesian
/// vectors.
///
/// Both lists are produced together, so they always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationSet {
    lattice: Vec<Matrix3<i32>>,
    cartesian: Vec<Matrix3<f64>>,
}

impl RotationSet {
    /// Builds the set from reciprocal-basis rotations and the real-space cell.
    ///
    /// `cell` holds the lattice vectors as rows, so `inv(cell)` holds the
    /// reciprocal basis vectors as columns, and the Cartesian form of `R` is
    /// `inv(cell) · R · cell`.
    pub fn try_new(rotations: Vec<Matrix3<i32>>, cell: &Matrix3<f64>) -> Result<Self, SymmetryError> {
        if rotations.is_empty() {
            return Err(SymmetryError::EmptyRotationSet);
        }
        if cell.determinant().abs() <= f64::EPSILON {
            return Err(SymmetryError::DegenerateLattice);
        }
        for (index, r) in rotations.iter().enumerate() {
            let determinant = r.map(|x| x as f64).determinant().round() as i32;
            if determinant.abs() != 1 {
                return Err(SymmetryError::NonUnimodularRotation { index, determinant });
            }
        }
        let reciprocal_lattice = cell.try_inverse().ok_or(SymmetryError::DegenerateLattice)?;
        let cartesian = rotations
            .iter()
            .map(|r| {
                similarity_transformation(&reciprocal_lattice, &r.map(|x| x as f64))
                    .ok_or(SymmetryError::DegenerateLattice)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            lattice: rotations,
            cartesian,
        })
    }

    /// Identity-only set; its Cartesian form is the identity for any cell.
    pub fn identity() -> Self {
        Self {
            lattice: vec![Matrix3::identity()],
            cartesian: vec![Matrix3::identity()],
        }
    }

    pub fn len(&self) -> usize {
        self.lattice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lattice.is_empty()
    }

    pub fn lattice(&self) -> &[Matrix3<i32>] {
        &self.lattice
    }

    pub fn cartesian(&self) -> &[Matrix3<f64>] {
        &self.cartesian
    }

    /// Iterates `(lattice, cartesian)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Matrix3<i32>, &Matrix3<f64>)> {
        self.lattice.iter().zip(self.cartesian.iter())
    }
}
