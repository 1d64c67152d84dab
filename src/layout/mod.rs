pub mod animation;
pub mod engine;
pub mod tidy;

pub use animation::{AnimationFrame, AnimationHandle, Transition};
pub use engine::{LayoutEngine, LayoutFrame};
pub use tidy::TidyTree;
