use nalgebra::Matrix3;

use super::{RotationSet, SymmetryError};
use crate::grid::Mesh;

/// Point-group data of a crystal as consumed by the collision matrix.
///
/// * `pointgroup_operations`: real-space rotations in fractional lattice
///   coordinates, used to reduce the mesh to irreducible grid points.
/// * `reciprocal_operations`: the same group acting on reciprocal fractional
///   coordinates (grid addresses), paired with its Cartesian form. These are
///   the operations summed over when assembling the matrix.
#[derive(Debug, Clone)]
pub struct Symmetry {
    pointgroup_operations: Vec<Matrix3<i32>>,
    reciprocal_operations: RotationSet,
    is_time_reversal: bool,
}

impl Symmetry {
    /// Creates a symmetry from explicitly supplied operation sets.
    pub fn try_new(
        pointgroup_operations: Vec<Matrix3<i32>>,
        reciprocal_operations: Vec<Matrix3<i32>>,
        cell: &Matrix3<f64>,
        is_time_reversal: bool,
    ) -> Result<Self, SymmetryError> {
        if pointgroup_operations.is_empty() {
            return Err(SymmetryError::EmptyRotationSet);
        }
        Ok(Self {
            pointgroup_operations,
            reciprocal_operations: RotationSet::try_new(reciprocal_operations, cell)?,
            is_time_reversal,
        })
    }

    /// Derives the reciprocal operations from the real-space point group:
    /// each rotation is transposed, and with time reversal its negative is
    /// added. Duplicates are removed, first occurrence wins.
    pub fn from_pointgroup_operations(
        pointgroup_operations: Vec<Matrix3<i32>>,
        cell: &Matrix3<f64>,
        is_time_reversal: bool,
    ) -> Result<Self, SymmetryError> {
        let reciprocal = reciprocal_rotations(pointgroup_operations.iter(), is_time_reversal);
        Self::try_new(pointgroup_operations, reciprocal, cell, is_time_reversal)
    }

    /// Identity-only symmetry (P1 without time reversal).
    pub fn identity() -> Self {
        Self {
            pointgroup_operations: vec![Matrix3::identity()],
            reciprocal_operations: RotationSet::identity(),
            is_time_reversal: false,
        }
    }

    pub fn pointgroup_operations(&self) -> &[Matrix3<i32>] {
        &self.pointgroup_operations
    }

    pub fn reciprocal_operations(&self) -> &RotationSet {
        &self.reciprocal_operations
    }

    pub fn is_time_reversal(&self) -> bool {
        self.is_time_reversal
    }

    /// Reciprocal-basis rotations of the real-space operations that map the
    /// mesh onto itself, with time reversal applied when enabled.
    pub fn reciprocal_mesh_rotations(&self, mesh: &Mesh) -> Vec<Matrix3<i32>> {
        let preserving = self
            .pointgroup_operations
            .iter()
            .filter(|r| mesh.is_preserved_by(&r.transpose()));
        reciprocal_rotations(preserving, self.is_time_reversal)
    }
}

fn reciprocal_rotations<'a>(
    rotations: impl Iterator<Item = &'a Matrix3<i32>>,
    is_time_reversal: bool,
) -> Vec<Matrix3<i32>> {
    let mut out: Vec<Matrix3<i32>> = Vec::new();
    let mut push_unique = |r: Matrix3<i32>| {
        if !out.contains(&r) {
            out.push(r);
        }
    };
    let transposed: Vec<Matrix3<i32>> = rotations.map(|r| r.transpose()).collect();
    for r in &transposed {
        push_unique(*r);
    }
    if is_time_reversal {
        for r in &transposed {
            push_unique(-*r);
        }
    }
    out
}
