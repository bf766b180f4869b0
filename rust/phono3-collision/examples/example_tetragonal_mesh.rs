use std::error::Error;

use nalgebra::Matrix3;
use ndarray::{Array2, Array4, Array5, s};
use phono3_collision::collision_matrix::{CollisionMatrix, CollisionMatrixParams};
use phono3_collision::grid::{Mesh, triplets_at_q};
use phono3_collision::interaction::PrecomputedInteraction;
use phono3_collision::symmetry::Symmetry;

fn main() -> Result<(), Box<dyn Error>> {
    let cell = Matrix3::new(3.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 5.0);
    let c4z = Matrix3::new(0, -1, 0, 1, 0, 0, 0, 0, 1);
    let point_group = vec![Matrix3::identity(), c4z, c4z * c4z, c4z * c4z * c4z];
    let symmetry = Symmetry::from_pointgroup_operations(point_group, &cell, true)?;

    let mesh = Mesh::try_new([4, 4, 2])?;
    let grid_point = 1;
    let triplets = triplets_at_q(grid_point, &mesh, &symmetry.reciprocal_mesh_rotations(&mesh))?;
    let num_triplets = triplets.len();
    let num_band = 3;

    let frequencies = Array2::from_shape_fn((mesh.num_grid_points(), num_band), |(gp, b)| {
        2.0 + b as f64 + 0.1 * gp as f64
    });
    let interaction = PrecomputedInteraction::try_new(
        mesh,
        frequencies,
        (0..num_band).collect(),
        grid_point,
        triplets,
        Array4::from_elem((num_triplets, num_band, num_band, num_band), 1e-3),
        Array5::from_elem((3, num_triplets, num_band, num_band, num_band), 0.5),
    )?;

    let mut collision_matrix = CollisionMatrix::new(
        interaction,
        symmetry,
        CollisionMatrixParams::default()
            .with_grid_point(grid_point)
            .with_temperature(300.0),
    )?;
    collision_matrix.run()?;

    dbg!(num_triplets);
    dbg!(collision_matrix.ir_grid_points());
    dbg!(collision_matrix.imag_self_energy());
    if let Some(matrix) = collision_matrix.collision_matrix() {
        dbg!(matrix.shape());
        dbg!(matrix.slice(s![0, .., 0, 0, ..]));
    }
    Ok(())
}
