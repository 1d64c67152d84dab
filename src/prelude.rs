//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the treeflow crate.
//! Import it to drive a session without importing each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use treeflow::prelude::*;
//! use std::time::Duration;
//!
//! # fn run_example() -> Result<()> {
//! let config = EngineConfig::from_file("path/to/treeflow.json")?;
//! let graph = Graph::from_json(&std::fs::read_to_string("path/to/graph.json")?)?;
//!
//! let mut session = Session::builder().with_config(config).with_graph(graph).build();
//! session.click_edge("a=>b", Duration::ZERO);
//! session.settle(Duration::ZERO, Duration::from_millis(16));
//! # Ok(())
//! # }
//! ```

// Session and configuration
pub use crate::config::EngineConfig;
pub use crate::session::{Session, SessionBuilder};

// Graph model
pub use crate::graph::{
    Edge, EdgeKind, FixedLabels, Graph, GraphStore, Handle, IdGenerator, LabelGenerator, Node,
    NodeKind, Position, RandomLabels, SequentialIds, Size, UuidIds,
};

// Engine components
pub use crate::history::{HistoryManager, KeyChord, Shortcut};
pub use crate::layout::{LayoutEngine, TidyTree};
pub use crate::mutation::{Mutation, Mutator};
pub use crate::placeholder::{PlaceholderManager, SizeProvider, SizeResolver};

// Collaborators
pub use crate::collab::{Canvas, HeadlessCanvas, NodePersistence, PreferenceMode, PreferenceStore};

// Error types
pub use crate::error::{CollaboratorError, ConfigError, MutationError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
