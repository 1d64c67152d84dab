//! Boundary contracts for the collaborators around the engine: the rendering
//! surface, node persistence and the user preference store.

pub mod canvas;
pub mod persistence;
pub mod preference;

pub use canvas::{Canvas, FitViewOptions, HeadlessCanvas, Viewport};
pub use persistence::{MemoryPersistence, NodePersistence, NodeRecord, persist_best_effort};
pub use preference::{MemoryPreferences, PreferenceMode, PreferenceStore, UserPreference};
