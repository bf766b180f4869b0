use thiserror::Error;

use crate::grid::GridError;

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("No grid point has been set on the interaction")]
    GridPointNotSet,

    #[error("Interaction data is only available at grid point {available}, requested {requested}")]
    GridPointMismatch { available: usize, requested: usize },

    #[error("Array shape mismatch: {0}")]
    ArrayShapeMismatch(String),

    #[error("Unsupported request: {0}")]
    Unsupported(String),

    #[error("Grid error")]
    Grid(#[from] GridError),
}
