use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("Invalid mesh {0:?}: every dimension must be at least 1")]
    InvalidMesh([usize; 3]),

    #[error("Grid point {grid_point} out of range for mesh with {num_grid_points} points")]
    GridPointOutOfRange {
        grid_point: usize,
        num_grid_points: usize,
    },

    #[error("No rotations given")]
    EmptyRotations,
}
