#![allow(dead_code)]

use nalgebra::Matrix3;
use ndarray::{Array2, Array4, Array5};
use phono3_collision::grid::{Mesh, triplets_at_q};
use phono3_collision::interaction::PrecomputedInteraction;

pub const ABS_TOL: f64 = 1e-12;
pub const REL_TOL: f64 = 1e-10;

/// Interaction on `mesh` where every mode has the same frequency and every
/// triplet the same interaction strength and integration weight.
pub fn uniform_interaction(
    mesh: [usize; 3],
    grid_point: usize,
    rotations: &[Matrix3<i32>],
    band_indices: Vec<usize>,
    num_band: usize,
    frequency: f64,
    fc3_value: f64,
    g_value: f64,
) -> PrecomputedInteraction {
    let mesh = Mesh::try_new(mesh).expect("valid mesh");
    let triplets = triplets_at_q(grid_point, &mesh, rotations).expect("triplets");
    let num_triplets = triplets.len();
    let num_band0 = band_indices.len();
    PrecomputedInteraction::try_new(
        mesh,
        Array2::from_elem((mesh.num_grid_points(), num_band), frequency),
        band_indices,
        grid_point,
        triplets,
        Array4::from_elem((num_triplets, num_band0, num_band, num_band), fc3_value),
        Array5::from_elem((3, num_triplets, num_band0, num_band, num_band), g_value),
    )
    .expect("consistent interaction arrays")
}

/// Twofold rotation about the c axis in fractional coordinates.
pub fn c2z() -> Matrix3<i32> {
    Matrix3::new(-1, 0, 0, 0, -1, 0, 0, 0, 1)
}

/// Tetragonal cell with lattice vectors as rows.
pub fn tetragonal_cell() -> Matrix3<f64> {
    Matrix3::new(3.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 5.0)
}
