use std::sync::Arc;

use log::{debug, info, warn};
use ndarray::{Array1, Array2, Array4, Array5};
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::assembly::Assembly;
use super::state::BuilderState;
use super::{CollisionMatrixError, CollisionMatrixParams, GridPointContext, Stage};
use crate::grid::TripletsAtQ;
use crate::imag_self_energy::{ImagSelfEnergy, SelfEnergyInputs};
use crate::interaction::InteractionProvider;
use crate::symmetry::Symmetry;
use crate::units::PhysicalUnits;

/// Assembles the collision matrix
/// $\Omega_{j\alpha,\,i k\beta}$ of one grid point at one temperature:
///
/// $$
/// \Omega_{j\alpha, ik\beta} = \frac{N_{\mathrm{img}}(i)}{N_{\mathrm{ops}}}
///     \sum_{\mathrm{rep}} \Big(\sum_{R \mapsto \mathrm{rep}} R^{\mathrm{cart}}\Big)_{\alpha\beta}
///     \sum_l \frac{|\Phi_{t,jkl}|^2\, g^{(2)}_{t,jkl}}{\sinh(\hbar\omega_{q_2 l} / 2k_BT)}
///     + \delta_{q_i q_0}\,\delta_{jk}\,\delta_{\alpha\beta}\,\Gamma_j,
/// $$
///
/// where the outer sum runs over the triplet representatives reached by the
/// operations applied to the `i`-th irreducible q-point, `t` is the triplet of
/// each representative and $\Gamma_j$ the imaginary self-energy.
///
/// Stages: `Uninitialized → GridPointSet → InteractionComputed → MatrixBuilt`.
/// Setting a grid point restarts from `GridPointSet`; changing the
/// temperature, smearing width or units drops only the built matrix.
#[derive(Debug)]
pub struct CollisionMatrix<P>
where
    P: InteractionProvider,
{
    interaction: P,
    symmetry: Arc<Symmetry>,
    imag_self_energy: ImagSelfEnergy,
    sigma: Option<f64>,
    state: BuilderState,
    thread_pool: ThreadPool,
}

impl<P> CollisionMatrix<P>
where
    P: InteractionProvider,
{
    /// Creates a builder; when `params.grid_point` is set the grid point
    /// context is prepared immediately.
    pub fn new(
        interaction: P,
        symmetry: impl Into<Arc<Symmetry>>,
        params: CollisionMatrixParams,
    ) -> Result<Self, CollisionMatrixError> {
        let default_num_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(default_num_threads)
            .build()
            .map_err(CollisionMatrixError::ThreadPoolBuildError)?;

        let CollisionMatrixParams {
            grid_point,
            frequency_points,
            temperature,
            sigma,
            units,
        } = params;

        let mut collision_matrix = CollisionMatrix {
            interaction,
            symmetry: symmetry.into(),
            imag_self_energy: ImagSelfEnergy::new(temperature, frequency_points, units),
            sigma,
            state: BuilderState::Uninitialized,
            thread_pool,
        };
        collision_matrix.set_grid_point(grid_point)?;
        Ok(collision_matrix)
    }

    pub fn set_num_threads(&mut self, num_threads: usize) -> Result<(), CollisionMatrixError> {
        self.thread_pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(CollisionMatrixError::ThreadPoolBuildError)?;
        Ok(())
    }

    /// Re-targets the builder. `None` clears every derived quantity.
    ///
    /// On failure the builder is left `Uninitialized`.
    pub fn set_grid_point(&mut self, grid_point: Option<usize>) -> Result<(), CollisionMatrixError> {
        self.state = BuilderState::Uninitialized;
        if let Some(gp) = grid_point {
            let context = GridPointContext::build(&mut self.interaction, &self.symmetry, gp)?;
            self.state = BuilderState::GridPointSet { context };
        }
        Ok(())
    }

    pub fn set_temperature(&mut self, temperature: Option<f64>) {
        self.imag_self_energy.temperature = temperature;
        self.invalidate_matrix();
    }

    pub fn set_sigma(&mut self, sigma: Option<f64>) {
        self.sigma = sigma;
        self.invalidate_matrix();
    }

    pub fn set_frequency_points(&mut self, frequency_points: Option<Vec<f64>>) {
        self.imag_self_energy.frequency_points = frequency_points;
    }

    pub fn set_units(&mut self, units: PhysicalUnits) {
        self.imag_self_energy.units = units;
        self.invalidate_matrix();
    }

    fn invalidate_matrix(&mut self) {
        self.state = std::mem::take(&mut self.state).invalidate_matrix();
    }

    /// Computes the interaction tensor if the current stage lacks it.
    fn ensure_interaction(&mut self) -> Result<(), CollisionMatrixError> {
        match std::mem::take(&mut self.state) {
            BuilderState::GridPointSet { context } => {
                match self.run_interaction(&context) {
                    Ok(fc3_normal_squared) => {
                        self.state = BuilderState::InteractionComputed {
                            context,
                            fc3_normal_squared,
                        };
                        Ok(())
                    },
                    Err(e) => {
                        self.state = BuilderState::GridPointSet { context };
                        Err(e)
                    },
                }
            },
            BuilderState::Uninitialized => Err(CollisionMatrixError::InvalidGridPointState),
            other => {
                self.state = other;
                Ok(())
            },
        }
    }

    fn run_interaction(
        &mut self,
        context: &GridPointContext,
    ) -> Result<Array4<f64>, CollisionMatrixError> {
        let num_band0 = self.interaction.band_indices().len();
        let num_band = self.interaction.num_band();
        let num_gp = context.mesh().num_grid_points();
        let freq_shape = self.interaction.frequencies().shape().to_vec();
        if freq_shape != [num_gp, num_band] {
            return Err(CollisionMatrixError::ShapeMismatch(format!(
                "frequencies: expected [{num_gp}, {num_band}], got {freq_shape:?}"
            )));
        }
        if let Some(&band) = self
            .interaction
            .band_indices()
            .iter()
            .find(|&&b| b >= num_band)
        {
            return Err(CollisionMatrixError::ShapeMismatch(format!(
                "band index {band} out of range for {num_band} bands"
            )));
        }

        let fc3_normal_squared = self.interaction.run()?;
        let expected = [context.triplets().len(), num_band0, num_band, num_band];
        if fc3_normal_squared.shape() != expected {
            return Err(CollisionMatrixError::ShapeMismatch(format!(
                "fc3_normal_squared: expected {:?}, got {:?}",
                expected,
                fc3_normal_squared.shape()
            )));
        }
        debug!(
            "interaction computed for grid point {}: shape {:?}",
            context.grid_point(),
            expected
        );
        Ok(fc3_normal_squared)
    }

    /// Builds the collision matrix for the current grid point and temperature.
    ///
    /// At zero temperature the matrix is identically zero; negative or
    /// non-finite temperatures are rejected.
    pub fn run(&mut self) -> Result<(), CollisionMatrixError> {
        if matches!(self.state, BuilderState::Uninitialized) {
            return Err(CollisionMatrixError::InvalidGridPointState);
        }
        let temperature = self
            .imag_self_energy
            .temperature
            .ok_or_else(|| CollisionMatrixError::UninitializedField("temperature".to_string()))?;
        if !temperature.is_finite() || temperature < 0.0 {
            return Err(CollisionMatrixError::UndefinedThermalFactor { temperature });
        }

        self.ensure_interaction()?;
        let (imag_self_energy, collision_matrix) = {
            let (context, fc3_normal_squared) = self
                .state
                .interaction()
                .ok_or(CollisionMatrixError::InvalidGridPointState)?;
            self.build(context, fc3_normal_squared, temperature)?
        };
        self.state = std::mem::take(&mut self.state).with_matrix(imag_self_energy, collision_matrix);
        Ok(())
    }

    /// Imaginary self-energy sampled at the frequency points, shape
    /// `(num_frequency_points, num_band0)`.
    ///
    /// Computes the interaction tensor if needed but leaves a built collision
    /// matrix untouched.
    pub fn imag_self_energy_spectrum(&mut self) -> Result<Array2<f64>, CollisionMatrixError> {
        if matches!(self.state, BuilderState::Uninitialized) {
            return Err(CollisionMatrixError::InvalidGridPointState);
        }
        let frequency_points = self
            .imag_self_energy
            .frequency_points
            .clone()
            .ok_or_else(|| CollisionMatrixError::UninitializedField("frequency_points".to_string()))?;

        self.ensure_interaction()?;
        let (context, fc3_normal_squared) = self
            .state
            .interaction()
            .ok_or(CollisionMatrixError::InvalidGridPointState)?;
        let integration_weights =
            self.interaction
                .integration_weights(Some(&frequency_points), self.sigma, false)?;
        let spectrum = self.imag_self_energy.compute_spectrum(&SelfEnergyInputs {
            triplets: context.triplets(),
            frequencies: self.interaction.frequencies(),
            fc3_normal_squared: fc3_normal_squared.view(),
            integration_weights: integration_weights.view(),
            cutoff_frequency: self.interaction.cutoff_frequency(),
            unit_conversion: self.interaction.unit_conversion(),
        })?;
        debug!(
            "self-energy spectrum at grid point {}: {} frequency points",
            context.grid_point(),
            frequency_points.len()
        );
        Ok(spectrum)
    }

    fn build(
        &self,
        context: &GridPointContext,
        fc3_normal_squared: &Array4<f64>,
        temperature: f64,
    ) -> Result<(Array1<f64>, Array5<f64>), CollisionMatrixError> {
        let (num_triplets, num_band0, num_band, _) = fc3_normal_squared.dim();
        let num_ir = context.num_ir_grid_points();

        let integration_weights = self.interaction.integration_weights(None, self.sigma, true)?;
        let expected = [3, num_triplets, num_band0, num_band, num_band];
        if integration_weights.shape() != expected {
            return Err(CollisionMatrixError::ShapeMismatch(format!(
                "integration weights: expected {:?}, got {:?}",
                expected,
                integration_weights.shape()
            )));
        }

        let frequencies = self.interaction.frequencies();
        let cutoff_frequency = self.interaction.cutoff_frequency();
        let unit_conversion = self.interaction.unit_conversion();
        for &band in self.interaction.band_indices() {
            let frequency = frequencies[[context.grid_point(), band]];
            if frequency <= cutoff_frequency {
                warn!(
                    "band {band} at grid point {} has frequency {frequency} THz, at or below cutoff {cutoff_frequency}",
                    context.grid_point()
                );
            }
        }

        let imag_self_energy = self.imag_self_energy.compute(&SelfEnergyInputs {
            triplets: context.triplets(),
            frequencies: frequencies.view(),
            fc3_normal_squared: fc3_normal_squared.view(),
            integration_weights: integration_weights.view(),
            cutoff_frequency,
            unit_conversion,
        })?;

        let collision_matrix = if temperature > 0.0 {
            Assembly {
                context,
                rotations: self.symmetry.reciprocal_operations(),
                fc3_normal_squared: fc3_normal_squared.view(),
                integration_weights: integration_weights.view(),
                frequencies: frequencies.view(),
                band_indices: self.interaction.band_indices(),
                imag_self_energy: imag_self_energy.view(),
                temperature,
                cutoff_frequency,
                unit_conversion,
                units: self.imag_self_energy.units,
            }
            .run(&self.thread_pool)?
        } else {
            Array5::zeros((num_band0, 3, num_ir, num_band, 3))
        };

        info!(
            "collision matrix built for grid point {} at T = {} K: shape {:?}",
            context.grid_point(),
            temperature,
            collision_matrix.shape()
        );
        Ok((imag_self_energy, collision_matrix))
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    pub fn grid_point(&self) -> Option<usize> {
        self.state.context().map(GridPointContext::grid_point)
    }

    pub fn temperature(&self) -> Option<f64> {
        self.imag_self_energy.temperature
    }

    pub fn sigma(&self) -> Option<f64> {
        self.sigma
    }

    pub fn frequency_points(&self) -> Option<&[f64]> {
        self.imag_self_energy.frequency_points.as_deref()
    }

    pub fn context(&self) -> Option<&GridPointContext> {
        self.state.context()
    }

    pub fn ir_grid_points(&self) -> Option<&[usize]> {
        self.state
            .context()
            .map(|c| c.ir_grid_points().grid_points.as_slice())
    }

    pub fn triplets_at_q(&self) -> Option<&TripletsAtQ> {
        self.state.context().map(GridPointContext::triplets)
    }

    pub fn fc3_normal_squared(&self) -> Option<&Array4<f64>> {
        self.state.interaction().map(|(_, fc3)| fc3)
    }

    /// Result of the last `run`, shape
    /// `(num_band0, 3, num_ir_grid_points, num_band, 3)`. `None` until a matrix
    /// has been built for the current settings.
    pub fn collision_matrix(&self) -> Option<&Array5<f64>> {
        match &self.state {
            BuilderState::MatrixBuilt {
                collision_matrix, ..
            } => Some(collision_matrix),
            _ => None,
        }
    }

    /// Diagonal self-energy used by the last `run`, one value per band index.
    pub fn imag_self_energy(&self) -> Option<&Array1<f64>> {
        match &self.state {
            BuilderState::MatrixBuilt {
                imag_self_energy, ..
            } => Some(imag_self_energy),
            _ => None,
        }
    }

    pub fn interaction(&self) -> &P {
        &self.interaction
    }

    pub fn symmetry(&self) -> &Symmetry {
        &self.symmetry
    }
}
