use std::error::Error as StdError;

use nalgebra::Matrix3;
use numpy::{PyArray1, PyArray4, PyArray5, PyArrayMethods, PyReadonlyArray2, PyReadonlyArray4, PyReadonlyArray5};
use phono3_collision::collision_matrix::{
    CollisionMatrix,
    CollisionMatrixError,
    CollisionMatrixParams,
    Stage,
};
use phono3_collision::grid::{GridError, Mesh, TripletsAtQ};
use phono3_collision::interaction::{InteractionError, PrecomputedInteraction};
use phono3_collision::symmetry::{Symmetry, SymmetryError};
use pyo3::exceptions::{PyIndexError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use thiserror::Error;

// ——————————————————————————————————————————————————————
// Error conversion
// ——————————————————————————————————————————————————————

#[derive(Error, Debug)]
pub enum PyCollisionMatrixError {
    #[error("No grid point is set")]
    InvalidGridPointState,

    #[error("Grid point {grid_point} out of range (max: {max})")]
    InvalidIndex { grid_point: usize, max: usize },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to build thread pool: {0}")]
    ThreadPoolBuildError(String),
}

/// Joins an error with its sources, since the library errors wrap their
/// causes.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl From<GridError> for PyCollisionMatrixError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::GridPointOutOfRange {
                grid_point,
                num_grid_points,
            } => PyCollisionMatrixError::InvalidIndex {
                grid_point,
                max: num_grid_points.saturating_sub(1),
            },
            other => PyCollisionMatrixError::InvalidInput(error_chain(&other)),
        }
    }
}

impl From<InteractionError> for PyCollisionMatrixError {
    fn from(err: InteractionError) -> Self {
        match err {
            InteractionError::Grid(e) => e.into(),
            other => PyCollisionMatrixError::InvalidInput(error_chain(&other)),
        }
    }
}

impl From<SymmetryError> for PyCollisionMatrixError {
    fn from(err: SymmetryError) -> Self {
        PyCollisionMatrixError::InvalidInput(error_chain(&err))
    }
}

impl From<CollisionMatrixError> for PyCollisionMatrixError {
    fn from(err: CollisionMatrixError) -> Self {
        match err {
            CollisionMatrixError::InvalidGridPointState => {
                PyCollisionMatrixError::InvalidGridPointState
            },
            CollisionMatrixError::ThreadPoolBuildError(e) => {
                PyCollisionMatrixError::ThreadPoolBuildError(e.to_string())
            },
            CollisionMatrixError::Interaction(e) => e.into(),
            CollisionMatrixError::Grid(e) => e.into(),
            other => PyCollisionMatrixError::InvalidInput(error_chain(&other)),
        }
    }
}

impl From<PyCollisionMatrixError> for PyErr {
    fn from(err: PyCollisionMatrixError) -> Self {
        match err {
            PyCollisionMatrixError::InvalidIndex { .. } => PyIndexError::new_err(err.to_string()),
            PyCollisionMatrixError::InvalidGridPointState
            | PyCollisionMatrixError::ThreadPoolBuildError(_) => {
                PyRuntimeError::new_err(err.to_string())
            },
            PyCollisionMatrixError::InvalidInput(_) => PyValueError::new_err(err.to_string()),
        }
    }
}

type PyResult<T> = Result<T, PyCollisionMatrixError>;

fn to_matrix3<T: nalgebra::Scalar + Copy>(rows: &[[T; 3]; 3]) -> Matrix3<T> {
    Matrix3::from_fn(|i, j| rows[i][j])
}

// ——————————————————————————————————————————————————————
// Python class
// ——————————————————————————————————————————————————————

/// Collision matrix of one grid point over interaction arrays computed in
/// Python.
#[pyclass(name = "CollisionMatrix")]
pub struct PyCollisionMatrix {
    inner: CollisionMatrix<PrecomputedInteraction>,
}

#[pymethods]
impl PyCollisionMatrix {
    /// * `frequencies` – `(num_grid_points, num_band)`
    /// * `triplets` – `(num_triplets, 3)` grid points, with `weights` and the
    ///   per-grid-point `triplets_map`
    /// * `fc3_normal_squared` – `(num_triplets, num_band0, num_band, num_band)`
    /// * `integration_weights` – `(3, num_triplets, num_band0, num_band, num_band)`
    /// * `rotations` – real-space point group in lattice coordinates
    /// * `cell` – lattice vectors as rows
    #[new]
    #[pyo3(signature = (
        mesh,
        frequencies,
        band_indices,
        grid_point,
        triplets,
        weights,
        triplets_map,
        fc3_normal_squared,
        integration_weights,
        rotations,
        cell,
        is_time_reversal = true,
        temperature = None,
        sigma = None,
        unit_conversion = 1.0,
        cutoff_frequency = 1e-4,
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mesh: [usize; 3],
        frequencies: PyReadonlyArray2<f64>,
        band_indices: Vec<usize>,
        grid_point: usize,
        triplets: Vec<[usize; 3]>,
        weights: Vec<usize>,
        triplets_map: Vec<usize>,
        fc3_normal_squared: PyReadonlyArray4<f64>,
        integration_weights: PyReadonlyArray5<f64>,
        rotations: Vec<[[i32; 3]; 3]>,
        cell: [[f64; 3]; 3],
        is_time_reversal: bool,
        temperature: Option<f64>,
        sigma: Option<f64>,
        unit_conversion: f64,
        cutoff_frequency: f64,
    ) -> PyResult<Self> {
        let mesh = Mesh::try_new(mesh)?;
        let triplets = TripletsAtQ {
            triplets,
            weights,
            map: triplets_map,
        };
        let interaction = PrecomputedInteraction::try_new(
            mesh,
            frequencies.to_owned_array(),
            band_indices,
            grid_point,
            triplets,
            fc3_normal_squared.to_owned_array(),
            integration_weights.to_owned_array(),
        )?
        .with_unit_conversion(unit_conversion)
        .with_cutoff_frequency(cutoff_frequency)
        .with_sigma(sigma);

        let symmetry = Symmetry::from_pointgroup_operations(
            rotations.iter().map(to_matrix3).collect(),
            &to_matrix3(&cell),
            is_time_reversal,
        )?;

        let mut params = CollisionMatrixParams::default().with_grid_point(grid_point);
        params.temperature = temperature;
        params.sigma = sigma;
        let inner = CollisionMatrix::new(interaction, symmetry, params)?;
        Ok(PyCollisionMatrix { inner })
    }

    pub fn set_num_threads(&mut self, num_threads: usize) -> PyResult<()> {
        self.inner.set_num_threads(num_threads)?;
        Ok(())
    }

    #[pyo3(signature = (grid_point = None))]
    pub fn set_grid_point(&mut self, grid_point: Option<usize>) -> PyResult<()> {
        self.inner.set_grid_point(grid_point)?;
        Ok(())
    }

    #[pyo3(signature = (temperature = None))]
    pub fn set_temperature(&mut self, temperature: Option<f64>) {
        self.inner.set_temperature(temperature);
    }

    pub fn run(&mut self) -> PyResult<()> {
        self.inner.run()?;
        Ok(())
    }

    #[getter]
    pub fn stage(&self) -> &'static str {
        match self.inner.stage() {
            Stage::Uninitialized => "uninitialized",
            Stage::GridPointSet => "grid_point_set",
            Stage::InteractionComputed => "interaction_computed",
            Stage::MatrixBuilt => "matrix_built",
        }
    }

    #[getter]
    pub fn grid_point(&self) -> Option<usize> {
        self.inner.grid_point()
    }

    #[getter]
    pub fn temperature(&self) -> Option<f64> {
        self.inner.temperature()
    }

    #[getter]
    pub fn ir_grid_points(&self) -> Option<Vec<usize>> {
        self.inner.ir_grid_points().map(<[usize]>::to_vec)
    }

    #[getter]
    pub fn fc3_normal_squared(&self, py: Python) -> Option<Py<PyArray4<f64>>> {
        self.inner
            .fc3_normal_squared()
            .map(|fc3| PyArray4::from_array(py, fc3).into())
    }

    /// Shape `(num_band0, 3, num_ir_grid_points, num_band, 3)`, or `None`
    /// before `run`.
    #[getter]
    pub fn collision_matrix(&self, py: Python) -> Option<Py<PyArray5<f64>>> {
        self.inner
            .collision_matrix()
            .map(|m| PyArray5::from_array(py, m).into())
    }

    #[getter]
    pub fn imag_self_energy(&self, py: Python) -> Option<Py<PyArray1<f64>>> {
        self.inner
            .imag_self_energy()
            .map(|gamma| PyArray1::from_array(py, gamma).into())
    }
}
