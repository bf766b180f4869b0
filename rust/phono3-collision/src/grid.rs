mod errors;
mod ir_grid_points;
mod mesh;
mod triplets;
pub use errors::GridError;
pub use ir_grid_points::{IrGridPoints, ir_grid_points};
pub use mesh::{GridAddress, Mesh};
pub use triplets::{TripletsAtQ, little_group, triplets_at_q};
