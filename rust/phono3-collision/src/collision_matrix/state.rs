use ndarray::{Array1, Array4, Array5};

use super::GridPointContext;

/// Externally visible stage of a `CollisionMatrix` builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uninitialized,
    GridPointSet,
    InteractionComputed,
    MatrixBuilt,
}

/// Builder state; each stage owns exactly the data valid in it.
#[derive(Debug, Default)]
pub(super) enum BuilderState {
    #[default]
    Uninitialized,
    GridPointSet {
        context: GridPointContext,
    },
    InteractionComputed {
        context: GridPointContext,
        fc3_normal_squared: Array4<f64>,
    },
    MatrixBuilt {
        context: GridPointContext,
        fc3_normal_squared: Array4<f64>,
        imag_self_energy: Array1<f64>,
        collision_matrix: Array5<f64>,
    },
}

impl BuilderState {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Uninitialized => Stage::Uninitialized,
            Self::GridPointSet { .. } => Stage::GridPointSet,
            Self::InteractionComputed { .. } => Stage::InteractionComputed,
            Self::MatrixBuilt { .. } => Stage::MatrixBuilt,
        }
    }

    pub fn context(&self) -> Option<&GridPointContext> {
        match self {
            Self::Uninitialized => None,
            Self::GridPointSet { context }
            | Self::InteractionComputed { context, .. }
            | Self::MatrixBuilt { context, .. } => Some(context),
        }
    }

    pub fn interaction(&self) -> Option<(&GridPointContext, &Array4<f64>)> {
        match self {
            Self::InteractionComputed {
                context,
                fc3_normal_squared,
            }
            | Self::MatrixBuilt {
                context,
                fc3_normal_squared,
                ..
            } => Some((context, fc3_normal_squared)),
            _ => None,
        }
    }

    /// Drops a built matrix, keeping the interaction tensor.
    pub fn invalidate_matrix(self) -> Self {
        match self {
            Self::MatrixBuilt {
                context,
                fc3_normal_squared,
                ..
            } => Self::InteractionComputed {
                context,
                fc3_normal_squared,
            },
            other => other,
        }
    }

    /// Stores a freshly built matrix on top of the current interaction data.
    pub fn with_matrix(self, imag_self_energy: Array1<f64>, collision_matrix: Array5<f64>) -> Self {
        match self {
            Self::InteractionComputed {
                context,
                fc3_normal_squared,
            }
            | Self::MatrixBuilt {
                context,
                fc3_normal_squared,
                ..
            } => Self::MatrixBuilt {
                context,
                fc3_normal_squared,
                imag_self_energy,
                collision_matrix,
            },
            other => other,
        }
    }
}
