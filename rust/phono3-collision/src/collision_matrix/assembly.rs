use ndarray::prelude::*;
use rayon::ThreadPool;
use rayon::prelude::*;

use super::{CollisionMatrixError, GridPointContext, Orbit};
use crate::symmetry::RotationSet;
use crate::units::PhysicalUnits;
use crate::utils::thermal::inverse_sinh_factors;

/// Borrowed inputs of the finite-temperature assembly.
pub(super) struct Assembly<'a> {
    pub context: &'a GridPointContext,
    pub rotations: &'a RotationSet,
    pub fc3_normal_squared: ArrayView4<'a, f64>,
    pub integration_weights: ArrayView5<'a, f64>,
    pub frequencies: ArrayView2<'a, f64>,
    pub band_indices: &'a [usize],
    pub imag_self_energy: ArrayView1<'a, f64>,
    pub temperature: f64,
    pub cutoff_frequency: f64,
    pub unit_conversion: f64,
    pub units: PhysicalUnits,
}

impl Assembly<'_> {
    /// Collision matrix of shape `(num_band0, 3, num_ir_grid_points, num_band, 3)`.
    ///
    /// Slabs along the irreducible q-point axis are independent and are
    /// computed in parallel on `thread_pool`.
    pub fn run(&self, thread_pool: &ThreadPool) -> Result<Array5<f64>, CollisionMatrixError> {
        let (_, num_band0, num_band, _) = self.fc3_normal_squared.dim();
        let num_ir = self.context.num_ir_grid_points();

        let slabs = thread_pool.install(|| {
            (0..num_ir)
                .into_par_iter()
                .map(|i| self.slab(i))
                .collect::<Result<Vec<Array4<f64>>, _>>()
        })?;

        let mut collision_matrix = Array5::zeros((num_band0, 3, num_ir, num_band, 3));
        for (i, slab) in slabs.iter().enumerate() {
            collision_matrix.index_axis_mut(Axis(2), i).assign(slab);
        }
        Ok(collision_matrix)
    }

    /// The `[:, :, i, :, :]` slab for the `i`-th irreducible q-point.
    fn slab(&self, i: usize) -> Result<Array4<f64>, CollisionMatrixError> {
        let (_, num_band0, num_band, _) = self.fc3_normal_squared.dim();
        let context = self.context;
        let ir_gp = context.ir_grid_points().grid_points[i];
        let orbit = Orbit::build(
            &context.grid_address()[ir_gp],
            context.mesh(),
            self.rotations,
            &context.triplets().map,
        )?;

        let mut slab = Array4::<f64>::zeros((num_band0, 3, num_band, 3));
        for (rep, sum_rots) in &orbit.rotation_sums {
            let ti = context.triplet_index(*rep)?;
            let q2 = context.triplets().triplets[ti][2];
            let inv_sinh = inverse_sinh_factors(
                self.frequencies.row(q2).iter().copied(),
                self.temperature,
                self.cutoff_frequency,
                &self.units,
            );
            for j in 0..num_band0 {
                for k in 0..num_band {
                    let collision = inv_sinh
                        .iter()
                        .enumerate()
                        .map(|(l, s)| {
                            self.fc3_normal_squared[[ti, j, k, l]]
                                * s
                                * self.integration_weights[[2, ti, j, k, l]]
                        })
                        .sum::<f64>()
                        * self.unit_conversion;
                    let mut block = slab.slice_mut(s![j, .., k, ..]);
                    for a in 0..3 {
                        for b in 0..3 {
                            block[[a, b]] += collision * sum_rots[(a, b)];
                        }
                    }
                }
            }
        }

        slab /= orbit.normalization();

        if ir_gp == context.grid_point() {
            for (j, &band) in self.band_indices.iter().enumerate() {
                for a in 0..3 {
                    slab[[j, a, band, a]] += self.imag_self_energy[j];
                }
            }
        }
        Ok(slab)
    }
}
