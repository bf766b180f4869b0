use ndarray::{Array4, Array5, ArrayView2};

use super::{InteractionError, TripletsAtQ};
use crate::grid::{GridAddress, Mesh};

/// Source of three-phonon interaction data for one fixed grid point.
///
/// Implementors own the phonon frequencies on the whole mesh, enumerate the
/// triplets of the current grid point and produce the squared interaction
/// strengths and integration weights over those triplets.
pub trait InteractionProvider {
    fn mesh(&self) -> Mesh;

    /// Address of every grid point, in grid-point order.
    fn grid_address(&self) -> &[GridAddress];

    /// Bands of `q0` for which the interaction is evaluated (`num_band0` of them).
    fn band_indices(&self) -> &[usize];

    /// Total number of phonon bands.
    fn num_band(&self) -> usize;

    /// Converts `Σ |Φ|² g` into the energy unit of the self-energy.
    fn unit_conversion(&self) -> f64;

    /// Modes at or below this frequency (THz) are excluded from scattering.
    fn cutoff_frequency(&self) -> f64;

    /// Frequencies in THz, shape `(num_grid_points, num_band)`.
    fn frequencies(&self) -> ArrayView2<'_, f64>;

    /// Targets `grid_point` and returns its triplets, weights and triplet map.
    fn set_grid_point(&mut self, grid_point: usize) -> Result<TripletsAtQ, InteractionError>;

    /// Squared interaction strengths for the current triplets,
    /// shape `(num_triplets, num_band0, num_band, num_band)`.
    fn run(&mut self) -> Result<Array4<f64>, InteractionError>;

    /// Integration weights for the current triplets,
    /// shape `(3, num_triplets, n, num_band, num_band)`.
    ///
    /// Without `frequency_points`, `n = num_band0` and the weights are
    /// evaluated at the frequencies of `band_indices`; otherwise
    /// `n = frequency_points.len()`. `sigma` selects smearing instead of the
    /// tetrahedron method. Component 2 is only meaningful when
    /// `is_collision_matrix` is set.
    fn integration_weights(
        &self,
        frequency_points: Option<&[f64]>,
        sigma: Option<f64>,
        is_collision_matrix: bool,
    ) -> Result<Array5<f64>, InteractionError>;
}
