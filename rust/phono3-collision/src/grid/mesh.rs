use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::GridError;

/// Integer address of a grid point in units of the mesh spacing.
pub type GridAddress = Vector3<i32>;

/// Sampling mesh `(n1, n2, n3)` of the reciprocal unit cell.
///
/// Grid points are numbered with the first axis running fastest:
/// `gp = a0 + a1 * n1 + a2 * n1 * n2`, addresses taken modulo the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mesh([usize; 3]);

impl Mesh {
    pub fn try_new(dims: [usize; 3]) -> Result<Self, GridError> {
        if dims.iter().any(|&n| n == 0) {
            return Err(GridError::InvalidMesh(dims));
        }
        Ok(Self(dims))
    }

    pub fn dims(&self) -> [usize; 3] {
        self.0
    }

    pub fn num_grid_points(&self) -> usize {
        self.0.iter().product()
    }

    /// Grid point index of an address, wrapping it into the mesh first.
    #[inline]
    pub fn grid_point(&self, address: &GridAddress) -> usize {
        let [n0, n1, n2] = self.0;
        let wrap = |a: i32, n: usize| a.rem_euclid(n as i32) as usize;
        wrap(address[0], n0) + wrap(address[1], n1) * n0 + wrap(address[2], n2) * n0 * n1
    }

    /// Address table in grid-point order. Components larger than `n / 2` are
    /// shifted by `-n`, so addresses are centred on Γ.
    pub fn grid_addresses(&self) -> Vec<GridAddress> {
        let [n0, n1, _] = self.0;
        (0..self.num_grid_points())
            .map(|gp| {
                let raw = [gp % n0, (gp / n0) % n1, gp / (n0 * n1)];
                GridAddress::from_fn(|i, _| {
                    let n = self.0[i];
                    if raw[i] > n / 2 {
                        raw[i] as i32 - n as i32
                    } else {
                        raw[i] as i32
                    }
                })
            })
            .collect()
    }

    /// Whether a reciprocal-basis rotation maps mesh points onto mesh points.
    ///
    /// `a'_i = n_i Σ_j R_ij a_j / n_j` is integral for every address exactly
    /// when each `R_ij n_i` is divisible by `n_j`.
    pub fn is_preserved_by(&self, rotation: &Matrix3<i32>) -> bool {
        (0..3).all(|i| {
            (0..3).all(|j| (rotation[(i, j)] * self.0[i] as i32) % self.0[j] as i32 == 0)
        })
    }

    pub fn check_grid_point(&self, grid_point: usize) -> Result<(), GridError> {
        let num_grid_points = self.num_grid_points();
        if grid_point >= num_grid_points {
            return Err(GridError::GridPointOutOfRange {
                grid_point,
                num_grid_points,
            });
        }
        Ok(())
    }
}

impl TryFrom<[usize; 3]> for Mesh {
    type Error = GridError;

    fn try_from(dims: [usize; 3]) -> Result<Self, Self::Error> {
        Self::try_new(dims)
    }
}
