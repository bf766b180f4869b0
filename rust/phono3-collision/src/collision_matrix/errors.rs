use rayon::ThreadPoolBuildError;
use thiserror::Error;

use crate::grid::GridError;
use crate::imag_self_energy::ImagSelfEnergyError;
use crate::interaction::InteractionError;
use crate::symmetry::SymmetryError;

#[derive(Error, Debug)]
pub enum CollisionMatrixError {
    #[error("No grid point is set")]
    InvalidGridPointState,

    #[error("Field '{0}' is not initialized")]
    UninitializedField(String),

    #[error("Array shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Thermal factor is undefined at temperature {temperature}")]
    UndefinedThermalFactor { temperature: f64 },

    #[error("Symmetry inconsistent with mesh: {0}")]
    SymmetryInconsistency(String),

    #[error("Failed to build thread pool")]
    ThreadPoolBuildError(
        #[from]
        #[source]
        ThreadPoolBuildError,
    ),

    #[error("Interaction error")]
    Interaction(#[from] InteractionError),

    #[error("Symmetry error")]
    Symmetry(#[from] SymmetryError),

    #[error("Grid error")]
    Grid(#[from] GridError),

    #[error("Imaginary self-energy error")]
    ImagSelfEnergy(#[from] ImagSelfEnergyError),
}
