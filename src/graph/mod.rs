pub mod ids;
pub mod model;
pub mod store;

pub use ids::*;
pub use model::*;
pub use store::*;
