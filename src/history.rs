//! Undo/redo over bounded stacks of whole-graph snapshots.

use crate::graph::{Graph, GraphStore};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Two bounded stacks of snapshots.
///
/// Callers snapshot right before a change they want to be undoable; the
/// manager never intercepts mutations itself. While an undo or redo is being
/// applied, snapshots are ignored until `finish_restore` is called on the
/// next frame.
#[derive(Debug)]
pub struct HistoryManager {
    past: VecDeque<Graph>,
    future: VecDeque<Graph>,
    max_size: usize,
    restoring: bool,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl HistoryManager {
    pub fn new(max_size: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            max_size: max_size.max(1),
            restoring: false,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Record the current state of `store` as an undo point.
    ///
    /// Returns false when the snapshot was skipped because a restore is in progress.
    pub fn take_snapshot(&mut self, store: &GraphStore) -> bool {
        if self.restoring {
            debug!("Skipping snapshot during undo/redo");
            return false;
        }
        push_bounded(&mut self.past, store.snapshot(), self.max_size);
        self.future.clear();
        debug!(past = self.past.len(), "Took history snapshot");
        true
    }

    pub fn undo(&mut self, store: &mut GraphStore) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        self.restoring = true;
        push_bounded(&mut self.future, store.snapshot(), self.max_size);
        store.set(previous);
        debug!(past = self.past.len(), future = self.future.len(), "Undo");
        true
    }

    pub fn redo(&mut self, store: &mut GraphStore) -> bool {
        let Some(next) = self.future.pop_back() else {
            return false;
        };
        self.restoring = true;
        push_bounded(&mut self.past, store.snapshot(), self.max_size);
        store.set(next);
        debug!(past = self.past.len(), future = self.future.len(), "Redo");
        true
    }

    /// Lift the re-entrancy guard set by `undo`/`redo`.
    pub fn finish_restore(&mut self) {
        self.restoring = false;
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

fn push_bounded(stack: &mut VecDeque<Graph>, graph: Graph, cap: usize) {
    stack.push_back(graph);
    while stack.len() > cap {
        stack.pop_front();
    }
}

/// A key press as delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// The focused element is an input, textarea or contenteditable.
    pub in_text_input: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn in_text_input(mut self) -> Self {
        self.in_text_input = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
}

impl Shortcut {
    /// Ctrl/Cmd+Z undoes, Ctrl/Cmd+Shift+Z redoes. Text inputs keep their own undo.
    pub fn from_key(chord: &KeyChord) -> Option<Shortcut> {
        if chord.in_text_input || !(chord.ctrl || chord.meta) {
            return None;
        }
        if !chord.key.eq_ignore_ascii_case("z") {
            return None;
        }
        Some(if chord.shift {
            Shortcut::Redo
        } else {
            Shortcut::Undo
        })
    }
}
