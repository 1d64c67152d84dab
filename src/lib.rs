//! # Treeflow - Interactive Tree Editing Engine
//!
//! **Treeflow** keeps a tree-shaped node/edge diagram consistent while a user
//! edits it: clicking a node appends a child, clicking a connector inserts a
//! node between two others, and placeholder markers show where the next node
//! will land. Every change is laid out again with a tidy-tree algorithm and
//! animated into place, and every user action can be undone.
//!
//! ## Core Workflow
//!
//! The engine never touches a screen. It works on an in-memory [`graph::Graph`]
//! and talks to the rendering surface through the [`collab::Canvas`] trait.
//!
//! 1.  **Configure**: Load an [`config::EngineConfig`] from JSON or build one with `EngineConfig::builder()`.
//! 2.  **Build a session**: `Session::builder()` wires the store, history, layout and placeholder manager together.
//! 3.  **Forward events**: Clicks, drags, selection changes and key presses go to the matching `Session` method.
//! 4.  **Drive the clock**: Call `Session::advance` once per animation frame; it plays the layout animation,
//!     issues fit-view requests and runs the debounced placeholder update.
//!
//! The building blocks are usable on their own: [`mutation::Mutator`] is a set of
//! pure `Graph -> Graph` transformations, [`layout::TidyTree`] is a deterministic
//! layout function, and [`history::HistoryManager`] works on any [`graph::GraphStore`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use treeflow::prelude::*;
//! use std::time::Duration;
//!
//! fn main() -> Result<()> {
//!     let config = EngineConfig::builder().with_max_history(50).build()?;
//!     let root = Graph::new(vec![Node::workflow("root", "Start", Position::default())], vec![]);
//!
//!     let mut session = Session::builder()
//!         .with_config(config)
//!         .with_graph(root)
//!         .with_ids(SequentialIds::new("n", 1))
//!         .build();
//!
//!     // The user clicks the root: a child and its placeholder appear.
//!     session.click_node("root", Duration::ZERO);
//!     let now = session.settle(Duration::ZERO, Duration::from_millis(16));
//!
//!     println!("{}", session.graph().to_json_pretty()?);
//!
//!     session.undo(now);
//!     Ok(())
//! }
//! ```

pub mod collab;
pub mod config;
pub mod error;
pub mod graph;
pub mod history;
pub mod layout;
pub mod mutation;
pub mod placeholder;
pub mod prelude;
pub mod session;

pub use session::{Session, SessionBuilder};
