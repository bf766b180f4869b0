use nalgebra::Matrix3;

use super::{GridError, Mesh};

/// Irreducible part of a mesh under a group of reciprocal-basis rotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrGridPoints {
    /// Representatives in ascending order.
    pub grid_points: Vec<usize>,
    /// Orbit size of each representative; sums to the mesh volume.
    pub weights: Vec<usize>,
    /// Representative of every grid point.
    pub mapping: Vec<usize>,
}

/// Reduces `mesh` by `rotations`, choosing the smallest grid point index of
/// each orbit as its representative.
pub fn ir_grid_points(mesh: &Mesh, rotations: &[Matrix3<i32>]) -> Result<IrGridPoints, GridError> {
    if rotations.is_empty() {
        return Err(GridError::EmptyRotations);
    }
    let addresses = mesh.grid_addresses();
    let mapping: Vec<usize> = addresses
        .iter()
        .enumerate()
        .map(|(gp, address)| {
            rotations
                .iter()
                .map(|r| mesh.grid_point(&(r * address)))
                .fold(gp, usize::min)
        })
        .collect();

    let mut weights_by_gp = vec![0usize; mapping.len()];
    for &rep in &mapping {
        weights_by_gp[rep] += 1;
    }
    let (grid_points, weights) = weights_by_gp
        .into_iter()
        .enumerate()
        .filter(|&(_, w)| w > 0)
        .unzip();

    Ok(IrGridPoints {
        grid_points,
        weights,
        mapping,
    })
}
