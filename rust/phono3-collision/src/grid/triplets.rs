use nalgebra::Matrix3;

use super::{GridError, Mesh, ir_grid_points};

/// Momentum-conserving triplets `(q0, q1, q2)` for a fixed `q0`, reduced by
/// the little group of `q0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripletsAtQ {
    /// One triplet per representative `q1`, ordered by that representative.
    pub triplets: Vec<[usize; 3]>,
    /// Number of `q1` points each triplet stands for.
    pub weights: Vec<usize>,
    /// Representative `q1` of every grid point.
    pub map: Vec<usize>,
}

impl TripletsAtQ {
    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }
}

/// Rotations that leave the address of `grid_point` invariant modulo the mesh.
pub fn little_group(
    grid_point: usize,
    mesh: &Mesh,
    rotations: &[Matrix3<i32>],
) -> Result<Vec<Matrix3<i32>>, GridError> {
    mesh.check_grid_point(grid_point)?;
    let address = mesh.grid_addresses()[grid_point];
    Ok(rotations
        .iter()
        .filter(|r| mesh.grid_point(&(*r * address)) == grid_point)
        .copied()
        .collect())
}

/// Enumerates triplets at `grid_point`: every `q1` on the mesh is mapped to the
/// representative of its orbit under the little group, and `q2 = -q0 - q1`.
pub fn triplets_at_q(
    grid_point: usize,
    mesh: &Mesh,
    rotations: &[Matrix3<i32>],
) -> Result<TripletsAtQ, GridError> {
    let little = little_group(grid_point, mesh, rotations)?;
    let reduced = ir_grid_points(mesh, &little)?;
    let addresses = mesh.grid_addresses();
    let q0 = addresses[grid_point];
    let triplets = reduced
        .grid_points
        .iter()
        .map(|&q1| {
            let q2 = mesh.grid_point(&(-q0 - addresses[q1]));
            [grid_point, q1, q2]
        })
        .collect();

    Ok(TripletsAtQ {
        triplets,
        weights: reduced.weights,
        map: reduced.mapping,
    })
}
