mod errors;
mod point_group;
mod rotation_set;
pub use errors::SymmetryError;
pub use point_group::Symmetry;
pub use rotation_set::{RotationSet, similarity_transformation};
