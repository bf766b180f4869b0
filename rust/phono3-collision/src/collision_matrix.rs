mod assembly;
mod builder;
mod context;
mod errors;
mod orbit;
mod params;
mod state;
pub use builder::CollisionMatrix;
pub use context::GridPointContext;
pub use errors::CollisionMatrixError;
pub use orbit::Orbit;
pub use params::CollisionMatrixParams;
pub use state::Stage;
