use serde::{Deserialize, Serialize};

use crate::units::PhysicalUnits;

/// Optional settings a `CollisionMatrix` is constructed with. Everything can
/// also be set later through the builder's setters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionMatrixParams {
    pub grid_point: Option<usize>,
    /// Sampling points (THz) for the self-energy spectrum; the collision
    /// matrix itself always uses the band frequencies.
    pub frequency_points: Option<Vec<f64>>,
    /// Temperature in K.
    pub temperature: Option<f64>,
    /// Smearing width (THz); `None` selects the tetrahedron method.
    pub sigma: Option<f64>,
    pub units: PhysicalUnits,
}

impl CollisionMatrixParams {
    pub fn with_grid_point(mut self, grid_point: usize) -> Self {
        self.grid_point = Some(grid_point);
        self
    }

    pub fn with_frequency_points(mut self, frequency_points: Vec<f64>) -> Self {
        self.frequency_points = Some(frequency_points);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn with_units(mut self, units: PhysicalUnits) -> Self {
        self.units = units;
        self
    }
}
