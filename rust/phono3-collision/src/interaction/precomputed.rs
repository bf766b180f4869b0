use ndarray::{Array2, Array4, Array5, ArrayView2};

use super::{InteractionError, InteractionProvider, TripletsAtQ};
use crate::grid::{GridAddress, Mesh};

/// Interaction provider over arrays computed elsewhere for a single grid
/// point.
///
/// Requests for any other grid point, smearing width or frequency sampling
/// than the ones the arrays were produced for are rejected.
#[derive(Debug, Clone)]
pub struct PrecomputedInteraction {
    mesh: Mesh,
    grid_address: Vec<GridAddress>,
    frequencies: Array2<f64>,
    band_indices: Vec<usize>,
    unit_conversion: f64,
    cutoff_frequency: f64,
    grid_point: usize,
    triplets: TripletsAtQ,
    fc3_normal_squared: Array4<f64>,
    integration_weights: Array5<f64>,
    sigma: Option<f64>,
    frequency_point_weights: Option<(Vec<f64>, Array5<f64>)>,
    current_grid_point: Option<usize>,
}

impl PrecomputedInteraction {
    /// * `frequencies` – shape `(num_grid_points, num_band)`
    /// * `fc3_normal_squared` – shape `(num_triplets, num_band0, num_band, num_band)`
    /// * `integration_weights` – shape `(3, num_triplets, num_band0, num_band, num_band)`
    pub fn try_new(
        mesh: Mesh,
        frequencies: Array2<f64>,
        band_indices: Vec<usize>,
        grid_point: usize,
        triplets: TripletsAtQ,
        fc3_normal_squared: Array4<f64>,
        integration_weights: Array5<f64>,
    ) -> Result<Self, InteractionError> {
        mesh.check_grid_point(grid_point)?;
        let num_gp = mesh.num_grid_points();
        let num_band = frequencies.ncols();
        let num_band0 = band_indices.len();
        let num_triplets = triplets.len();

        if frequencies.nrows() != num_gp {
            return Err(InteractionError::ArrayShapeMismatch(format!(
                "frequencies must have {} rows (one per grid point), got {}",
                num_gp,
                frequencies.nrows()
            )));
        }
        if let Some(&b) = band_indices.iter().find(|&&b| b >= num_band) {
            return Err(InteractionError::ArrayShapeMismatch(format!(
                "band index {b} out of range for {num_band} bands"
            )));
        }
        if triplets.map.len() != num_gp || triplets.weights.len() != num_triplets {
            return Err(InteractionError::ArrayShapeMismatch(format!(
                "triplet map must have {} entries and weights {}, got {} and {}",
                num_gp,
                num_triplets,
                triplets.map.len(),
                triplets.weights.len()
            )));
        }
        if let Some(tp) = triplets
            .triplets
            .iter()
            .find(|tp| tp[0] != grid_point || tp.iter().any(|&q| q >= num_gp))
        {
            return Err(InteractionError::ArrayShapeMismatch(format!(
                "triplet {tp:?} does not belong to grid point {grid_point}"
            )));
        }
        let expected_fc3 = [num_triplets, num_band0, num_band, num_band];
        if fc3_normal_squared.shape() != expected_fc3 {
            return Err(InteractionError::ArrayShapeMismatch(format!(
                "fc3_normal_squared: expected {:?}, got {:?}",
                expected_fc3,
                fc3_normal_squared.shape()
            )));
        }
        let expected_g = [3, num_triplets, num_band0, num_band, num_band];
        if integration_weights.shape() != expected_g {
            return Err(InteractionError::ArrayShapeMismatch(format!(
                "integration_weights: expected {:?}, got {:?}",
                expected_g,
                integration_weights.shape()
            )));
        }

        Ok(Self {
            mesh,
            grid_address: mesh.grid_addresses(),
            frequencies,
            band_indices,
            unit_conversion: 1.0,
            cutoff_frequency: 1e-4,
            grid_point,
            triplets,
            fc3_normal_squared,
            integration_weights,
            sigma: None,
            frequency_point_weights: None,
            current_grid_point: None,
        })
    }

    pub fn with_unit_conversion(mut self, unit_conversion: f64) -> Self {
        self.unit_conversion = unit_conversion;
        self
    }

    pub fn with_cutoff_frequency(mut self, cutoff_frequency: f64) -> Self {
        self.cutoff_frequency = cutoff_frequency;
        self
    }

    /// Records the smearing width the integration weights were computed with.
    pub fn with_sigma(mut self, sigma: Option<f64>) -> Self {
        self.sigma = sigma;
        self
    }

    /// Replaces the address table, e.g. with addresses shifted into the first
    /// Brillouin zone. Every address must still map onto its own index.
    pub fn with_grid_address(
        mut self,
        grid_address: Vec<GridAddress>,
    ) -> Result<Self, InteractionError> {
        if grid_address.len() != self.mesh.num_grid_points()
            || grid_address
                .iter()
                .enumerate()
                .any(|(gp, a)| self.mesh.grid_point(a) != gp)
        {
            return Err(InteractionError::ArrayShapeMismatch(
                "grid address table is not in grid-point order".to_string(),
            ));
        }
        self.grid_address = grid_address;
        Ok(self)
    }

    /// Adds integration weights sampled at `frequency_points`, shape
    /// `(3, num_triplets, frequency_points.len(), num_band, num_band)`.
    pub fn with_frequency_point_weights(
        mut self,
        frequency_points: Vec<f64>,
        weights: Array5<f64>,
    ) -> Result<Self, InteractionError> {
        let num_band = self.num_band();
        let expected = [3, self.triplets.len(), frequency_points.len(), num_band, num_band];
        if weights.shape() != expected {
            return Err(InteractionError::ArrayShapeMismatch(format!(
                "frequency point weights: expected {:?}, got {:?}",
                expected,
                weights.shape()
            )));
        }
        self.frequency_point_weights = Some((frequency_points, weights));
        Ok(self)
    }

    fn check_current(&self) -> Result<(), InteractionError> {
        match self.current_grid_point {
            None => Err(InteractionError::GridPointNotSet),
            Some(_) => Ok(()),
        }
    }
}

impl InteractionProvider for PrecomputedInteraction {
    fn mesh(&self) -> Mesh {
        self.mesh
    }

    fn grid_address(&self) -> &[GridAddress] {
        &self.grid_address
    }

    fn band_indices(&self) -> &[usize] {
        &self.band_indices
    }

    fn num_band(&self) -> usize {
        self.frequencies.ncols()
    }

    fn unit_conversion(&self) -> f64 {
        self.unit_conversion
    }

    fn cutoff_frequency(&self) -> f64 {
        self.cutoff_frequency
    }

    fn frequencies(&self) -> ArrayView2<'_, f64> {
        self.frequencies.view()
    }

    fn set_grid_point(&mut self, grid_point: usize) -> Result<TripletsAtQ, InteractionError> {
        if grid_point != self.grid_point {
            return Err(InteractionError::GridPointMismatch {
                available: self.grid_point,
                requested: grid_point,
            });
        }
        self.current_grid_point = Some(grid_point);
        Ok(self.triplets.clone())
    }

    fn run(&mut self) -> Result<Array4<f64>, InteractionError> {
        self.check_current()?;
        Ok(self.fc3_normal_squared.clone())
    }

    fn integration_weights(
        &self,
        frequency_points: Option<&[f64]>,
        sigma: Option<f64>,
        _is_collision_matrix: bool,
    ) -> Result<Array5<f64>, InteractionError> {
        self.check_current()?;
        if sigma != self.sigma {
            return Err(InteractionError::Unsupported(format!(
                "integration weights were computed for sigma={:?}, requested sigma={:?}",
                self.sigma, sigma
            )));
        }
        match (frequency_points, &self.frequency_point_weights) {
            (None, _) => Ok(self.integration_weights.clone()),
            (Some(points), Some((stored, weights))) if points == stored.as_slice() => {
                Ok(weights.clone())
            },
            (Some(_), _) => Err(InteractionError::Unsupported(
                "no integration weights stored for the requested frequency points".to_string(),
            )),
        }
    }
}
