//! Imaginary part of the phonon self-energy from three-phonon scattering,
//!
//! $$
//! \Gamma_j = \sum_t w_t \sum_{k,l} |\Phi_{t,jkl}|^2
//!     \left[(n_k + n_l + 1)\, g^{(0)}_{t,jkl} + (n_k - n_l)\, g^{(1)}_{t,jkl}\right],
//! $$
//!
//! where $n_k$, $n_l$ are the occupations of the second and third phonon of
//! triplet $t$. At zero temperature only the $g^{(0)}$ term survives.

use ndarray::{Array1, Array2, ArrayView2, ArrayView4, ArrayView5};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::TripletsAtQ;
use crate::units::PhysicalUnits;
use crate::utils::thermal::bose_einstein;

#[derive(Error, Debug)]
pub enum ImagSelfEnergyError {
    #[error("Field '{0}' is not initialized")]
    UninitializedField(String),

    #[error("Array shape mismatch: {0}")]
    ArrayShapeMismatch(String),

    #[error("Temperature must be finite and non-negative, got {0}")]
    InvalidTemperature(f64),
}

/// Arrays for one grid point, borrowed from whoever owns them.
#[derive(Debug, Clone, Copy)]
pub struct SelfEnergyInputs<'a> {
    pub triplets: &'a TripletsAtQ,
    /// Shape `(num_grid_points, num_band)`.
    pub frequencies: ArrayView2<'a, f64>,
    /// Shape `(num_triplets, num_band0, num_band, num_band)`.
    pub fc3_normal_squared: ArrayView4<'a, f64>,
    /// Shape `(>= 2, num_triplets, n, num_band, num_band)` where `n` is
    /// `num_band0` or the number of frequency points.
    pub integration_weights: ArrayView5<'a, f64>,
    pub cutoff_frequency: f64,
    pub unit_conversion: f64,
}

/// Imaginary self-energy calculator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagSelfEnergy {
    pub temperature: Option<f64>,
    pub frequency_points: Option<Vec<f64>>,
    pub units: PhysicalUnits,
}

impl ImagSelfEnergy {
    pub fn new(
        temperature: Option<f64>,
        frequency_points: Option<Vec<f64>>,
        units: PhysicalUnits,
    ) -> Self {
        Self {
            temperature,
            frequency_points,
            units,
        }
    }

    fn temperature(&self) -> Result<f64, ImagSelfEnergyError> {
        let t = self
            .temperature
            .ok_or_else(|| ImagSelfEnergyError::UninitializedField("temperature".to_string()))?;
        if !t.is_finite() || t < 0.0 {
            return Err(ImagSelfEnergyError::InvalidTemperature(t));
        }
        Ok(t)
    }

    /// $\Gamma_j$ for each band of `q0`, shape `(num_band0,)`.
    ///
    /// The integration weights must be evaluated at the frequencies of the
    /// band indices.
    pub fn compute(&self, inputs: &SelfEnergyInputs) -> Result<Array1<f64>, ImagSelfEnergyError> {
        let num_band0 = inputs.fc3_normal_squared.shape()[1];
        let gamma = self.accumulate(inputs, 1, num_band0, |j, _| j)?;
        Ok(gamma.row(0).to_owned())
    }

    /// $\Gamma_j(\omega)$ at every frequency point, shape
    /// `(num_frequency_points, num_band0)`.
    ///
    /// The integration weights must be evaluated at `frequency_points`, and
    /// are shared by every band of `q0`.
    pub fn compute_spectrum(
        &self,
        inputs: &SelfEnergyInputs,
    ) -> Result<Array2<f64>, ImagSelfEnergyError> {
        let num_points = self
            .frequency_points
            .as_ref()
            .ok_or_else(|| ImagSelfEnergyError::UninitializedField("frequency_points".to_string()))?
            .len();
        self.accumulate(inputs, num_points, num_points, |_, p| p)
    }

    /// Sums over triplets into a `(n_rows, num_band0)` array, where
    /// `g_index(j, row)` selects the slice on the third axis of `g` (of
    /// length `n_g`). With band indices there is a single row and the slice
    /// is the band itself.
    fn accumulate(
        &self,
        inputs: &SelfEnergyInputs,
        n_rows: usize,
        n_g: usize,
        g_index: impl Fn(usize, usize) -> usize,
    ) -> Result<Array2<f64>, ImagSelfEnergyError> {
        let temperature = self.temperature()?;
        let fc3 = &inputs.fc3_normal_squared;
        let g = &inputs.integration_weights;
        let freqs = &inputs.frequencies;
        let triplets = inputs.triplets;
        let (num_triplets, num_band0, num_band, _) = fc3.dim();

        check_shapes(inputs, n_g)?;
        if triplets.len() != num_triplets {
            return Err(ImagSelfEnergyError::ArrayShapeMismatch(format!(
                "{} triplets but fc3_normal_squared has {}",
                triplets.len(),
                num_triplets
            )));
        }

        let cutoff = inputs.cutoff_frequency;
        let mut gamma = Array2::<f64>::zeros((n_rows, num_band0));
        for (t, (tp, &weight)) in triplets.triplets.iter().zip(&triplets.weights).enumerate() {
            let w = weight as f64;
            for k in 0..num_band {
                let f1 = freqs[[tp[1], k]];
                if f1 <= cutoff {
                    continue;
                }
                for l in 0..num_band {
                    let f2 = freqs[[tp[2], l]];
                    if f2 <= cutoff {
                        continue;
                    }
                    let (n_sum, n_diff) = if temperature > 0.0 {
                        let n2 = bose_einstein(f1, temperature, &self.units);
                        let n3 = bose_einstein(f2, temperature, &self.units);
                        (n2 + n3 + 1.0, n2 - n3)
                    } else {
                        (1.0, 0.0)
                    };
                    for row in 0..n_rows {
                        for j in 0..num_band0 {
                            let p = g_index(j, row);
                            let occupied = n_sum * g[[0, t, p, k, l]] + n_diff * g[[1, t, p, k, l]];
                            gamma[[row, j]] += occupied * fc3[[t, j, k, l]] * w;
                        }
                    }
                }
            }
        }
        gamma *= inputs.unit_conversion;
        Ok(gamma)
    }
}

fn check_shapes(inputs: &SelfEnergyInputs, n_g: usize) -> Result<(), ImagSelfEnergyError> {
    let (num_triplets, _, num_band, num_band_l) = inputs.fc3_normal_squared.dim();
    let g_shape = inputs.integration_weights.shape();
    if num_band != num_band_l || inputs.frequencies.ncols() != num_band {
        return Err(ImagSelfEnergyError::ArrayShapeMismatch(format!(
            "fc3_normal_squared {:?} inconsistent with frequencies {:?}",
            inputs.fc3_normal_squared.shape(),
            inputs.frequencies.shape()
        )));
    }
    if g_shape[0] < 2 || g_shape[1..] != [num_triplets, n_g, num_band, num_band] {
        return Err(ImagSelfEnergyError::ArrayShapeMismatch(format!(
            "integration weights: expected [>=2, {}, {}, {}, {}], got {:?}",
            num_triplets, n_g, num_band, num_band, g_shape
        )));
    }
    let num_gp = inputs.frequencies.nrows();
    if inputs.triplets.triplets.iter().flatten().any(|&q| q >= num_gp) {
        return Err(ImagSelfEnergyError::ArrayShapeMismatch(
            "triplet grid point outside the frequency table".to_string(),
        ));
    }
    Ok(())
}
