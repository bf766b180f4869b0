mod errors;
mod precomputed;
mod traits;
pub use errors::InteractionError;
pub use precomputed::PrecomputedInteraction;
pub use traits::InteractionProvider;

pub use crate::grid::TripletsAtQ;
