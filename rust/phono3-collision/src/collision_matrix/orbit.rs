use nalgebra::Matrix3;

use super::CollisionMatrixError;
use crate::grid::{GridAddress, Mesh};
use crate::symmetry::RotationSet;

/// Images of one irreducible q-point under every operation, grouped by the
/// triplet representative they fall on.
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    /// `R · a mod mesh` for each operation, in operation order.
    pub rotated_grid_points: Vec<usize>,
    /// Distinct triplet representatives in ascending order, each with the sum
    /// of the Cartesian operations whose image falls on it.
    pub rotation_sums: Vec<(usize, Matrix3<f64>)>,
    /// Number of distinct grid points in `rotated_grid_points`.
    pub num_distinct_grid_points: usize,
}

impl Orbit {
    pub fn build(
        address: &GridAddress,
        mesh: &Mesh,
        rotations: &RotationSet,
        triplets_map: &[usize],
    ) -> Result<Self, CollisionMatrixError> {
        let rotated_grid_points: Vec<usize> = rotations
            .lattice()
            .iter()
            .map(|r| mesh.grid_point(&(r * address)))
            .collect();

        let representatives = rotated_grid_points
            .iter()
            .map(|&gp| {
                triplets_map.get(gp).copied().ok_or_else(|| {
                    CollisionMatrixError::SymmetryInconsistency(format!(
                        "rotated grid point {gp} is outside the triplet map"
                    ))
                })
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let mut distinct_reps = representatives.clone();
        distinct_reps.sort_unstable();
        distinct_reps.dedup();

        let rotation_sums = distinct_reps
            .into_iter()
            .map(|rep| {
                let sum_rots = representatives
                    .iter()
                    .zip(rotations.cartesian())
                    .filter(|&(&r, _)| r == rep)
                    .fold(Matrix3::<f64>::zeros(), |acc, (_, rot)| acc + rot);
                (rep, sum_rots)
            })
            .collect();

        let mut distinct_gps = rotated_grid_points.clone();
        distinct_gps.sort_unstable();
        distinct_gps.dedup();

        Ok(Self {
            rotated_grid_points,
            rotation_sums,
            num_distinct_grid_points: distinct_gps.len(),
        })
    }

    /// Factor each slab is divided by: the number of operations per distinct
    /// image, i.e. the order of the stabilizer of the q-point.
    pub fn normalization(&self) -> f64 {
        self.rotated_grid_points.len() as f64 / self.num_distinct_grid_points as f64
    }
}
