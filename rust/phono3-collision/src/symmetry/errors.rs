use thiserror::Error;

#[derive(Debug, Error)]
pub enum SymmetryError {
    #[error("Lattice vectors are linearly dependent (zero volume)")]
    DegenerateLattice,

    #[error("Point group has no operations")]
    EmptyRotationSet,

    #[error("Rotation {index} is not unimodular (determinant {determinant})")]
    NonUnimodularRotation { index: usize, determinant: i32 },
}
