//! Symmetry-reduced collision matrix of the linearized phonon Boltzmann
//! transport equation, built from precomputed three-phonon interaction
//! strengths on a reciprocal-space mesh.
pub mod collision_matrix;
pub mod grid;
pub mod imag_self_energy;
pub mod interaction;
pub mod symmetry;
pub mod units;
pub mod utils;
