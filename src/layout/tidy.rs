//! Tidy tree layout (Reingold–Tilford, in Buchheim–Jünger–Leipert's linear-time form).
//!
//! Nodes are placed on a grid of `node_width` x `node_height` cells: depth maps
//! to rows and every pair of neighbouring nodes on a row is separated by the
//! same number of cells. Several roots are laid out as one forest under a
//! synthetic parent, so the result is always a single compact drawing.
//!
//! The walk works on an index arena:
//! 1. **Hierarchy**: each node's parent is the source of its first incoming
//!    edge; children keep node order.
//! 2. **First walk** (post-order): preliminary x and modifiers, merging
//!    subtree contours through threads.
//! 3. **Second walk** (pre-order): accumulate modifiers into final x.

use crate::graph::{Edge, Node, Position};
use ahash::AHashMap;
use tracing::warn;

/// Slot of the wrapper that sits above the synthetic forest root.
const OUTER: usize = 0;
/// Slot of the synthetic parent of all real roots.
const FOREST: usize = 1;

#[derive(Debug, Clone)]
struct Cell {
    /// Index into the input node slice; `None` for the two synthetic cells.
    node: Option<usize>,
    parent: usize,
    children: Vec<usize>,
    /// Position among siblings.
    number: usize,
    depth: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    ancestor: usize,
    default_ancestor: Option<usize>,
    x: f64,
}

impl Cell {
    fn new(node: Option<usize>, parent: usize, slot: usize) -> Self {
        Self {
            node,
            parent,
            children: Vec::new(),
            number: 0,
            depth: 0,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: slot,
            default_ancestor: None,
            x: 0.0,
        }
    }
}

/// Computes grid positions for a forest of nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TidyTree {
    pub node_width: f64,
    pub node_height: f64,
    /// Distance between neighbours, in node widths.
    pub separation: f64,
}

impl Default for TidyTree {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 150.0,
            separation: 1.0,
        }
    }
}

impl TidyTree {
    pub fn new(node_width: f64, node_height: f64, separation: f64) -> Self {
        Self {
            node_width,
            node_height,
            separation,
        }
    }

    /// Lay out `nodes`, returning `(id, position)` pairs in input order.
    ///
    /// Nodes trapped in a cycle have no root above them and are left out.
    pub fn layout(&self, nodes: &[Node], edges: &[Edge]) -> Vec<(String, Position)> {
        if nodes.is_empty() {
            return Vec::new();
        }

        let mut cells = build_forest(nodes, edges);
        let reached = cells.len() - 2;
        if reached < nodes.len() {
            warn!(
                skipped = nodes.len() - reached,
                "Some nodes are not reachable from a root and were not laid out"
            );
        }

        self.first_walk(&mut cells);
        second_walk(&mut cells);

        let mut placed: Vec<Option<Position>> = vec![None; nodes.len()];
        for cell in cells.iter().skip(2) {
            if let Some(index) = cell.node {
                placed[index] = Some(Position::new(
                    cell.x * self.node_width,
                    (cell.depth - 1) as f64 * self.node_height,
                ));
            }
        }

        nodes
            .iter()
            .zip(placed)
            .filter_map(|(node, position)| position.map(|p| (node.id.clone(), p)))
            .collect()
    }

    fn first_walk(&self, cells: &mut [Cell]) {
        for v in post_order(cells, FOREST) {
            let parent = cells[v].parent;
            let number = cells[v].number;
            let left = (number > 0).then(|| cells[parent].children[number - 1]);

            if cells[v].children.is_empty() {
                if let Some(w) = left {
                    cells[v].prelim = cells[w].prelim + self.separation;
                }
            } else {
                execute_shifts(cells, v);
                let first = cells[v].children[0];
                let last = cells[v].children[cells[v].children.len() - 1];
                let midpoint = (cells[first].prelim + cells[last].prelim) / 2.0;
                match left {
                    Some(w) => {
                        cells[v].prelim = cells[w].prelim + self.separation;
                        cells[v].modifier = cells[v].prelim - midpoint;
                    }
                    None => cells[v].prelim = midpoint,
                }
            }

            let ancestor = cells[parent]
                .default_ancestor
                .unwrap_or(cells[parent].children[0]);
            cells[parent].default_ancestor = Some(self.apportion(cells, v, left, ancestor));
        }
        cells[OUTER].modifier = -cells[FOREST].prelim;
    }

    /// Push `v`'s subtree right until it clears everything to its left.
    fn apportion(
        &self,
        cells: &mut [Cell],
        v: usize,
        left: Option<usize>,
        ancestor: usize,
    ) -> usize {
        let Some(w) = left else {
            return ancestor;
        };
        let mut ancestor = ancestor;

        let mut inner_right = v;
        let mut outer_right = v;
        let mut inner_left = w;
        let mut outer_left = cells[cells[v].parent].children[0];
        let mut sum_inner_right = cells[inner_right].modifier;
        let mut sum_outer_right = cells[outer_right].modifier;
        let mut sum_inner_left = cells[inner_left].modifier;
        let mut sum_outer_left = cells[outer_left].modifier;

        let mut next_inner_left = next_right(cells, inner_left);
        let mut next_inner_right = next_left(cells, inner_right);
        while let (Some(il), Some(ir)) = (next_inner_left, next_inner_right) {
            inner_left = il;
            inner_right = ir;
            // Both outer contours are at least as deep as the inner ones here.
            outer_left = next_left(cells, outer_left).unwrap_or(outer_left);
            outer_right = next_right(cells, outer_right).unwrap_or(outer_right);
            cells[outer_right].ancestor = v;

            let shift = cells[inner_left].prelim + sum_inner_left
                - cells[inner_right].prelim
                - sum_inner_right
                + self.separation;
            if shift > 0.0 {
                let from = next_ancestor(cells, inner_left, v, ancestor);
                move_subtree(cells, from, v, shift);
                sum_inner_right += shift;
                sum_outer_right += shift;
            }

            sum_inner_left += cells[inner_left].modifier;
            sum_inner_right += cells[inner_right].modifier;
            sum_outer_left += cells[outer_left].modifier;
            sum_outer_right += cells[outer_right].modifier;

            next_inner_left = next_right(cells, inner_left);
            next_inner_right = next_left(cells, inner_right);
        }

        if next_inner_left.is_some() && next_right(cells, outer_right).is_none() {
            cells[outer_right].thread = next_inner_left;
            cells[outer_right].modifier += sum_inner_left - sum_outer_right;
        }
        if next_inner_right.is_some() && next_left(cells, outer_left).is_none() {
            cells[outer_left].thread = next_inner_right;
            cells[outer_left].modifier += sum_inner_right - sum_outer_left;
            ancestor = v;
        }
        ancestor
    }
}

/// Build the cell arena: `[OUTER, FOREST, reachable nodes in pre-order...]`.
fn build_forest(nodes: &[Node], edges: &[Edge]) -> Vec<Cell> {
    let index_of: AHashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    // First incoming edge wins; dangling or self edges do not make a parent.
    let mut parent_of: Vec<Option<usize>> = vec![None; nodes.len()];
    for edge in edges {
        let (Some(&source), Some(&target)) = (
            index_of.get(edge.source.as_str()),
            index_of.get(edge.target.as_str()),
        ) else {
            continue;
        };
        if source != target && parent_of[target].is_none() {
            parent_of[target] = Some(source);
        }
    }

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();
    for (index, parent) in parent_of.iter().enumerate() {
        match parent {
            Some(p) => children_of[*p].push(index),
            None => roots.push(index),
        }
    }

    let mut cells = vec![Cell::new(None, OUTER, OUTER), Cell::new(None, OUTER, FOREST)];
    cells[OUTER].children.push(FOREST);

    // Pre-order expansion keeps siblings in node order.
    let mut stack: Vec<(usize, usize)> = roots.iter().rev().map(|&r| (r, FOREST)).collect();
    while let Some((index, parent)) = stack.pop() {
        let slot = cells.len();
        let mut cell = Cell::new(Some(index), parent, slot);
        cell.depth = cells[parent].depth + 1;
        cell.number = cells[parent].children.len();
        cells.push(cell);
        cells[parent].children.push(slot);
        for &child in children_of[index].iter().rev() {
            stack.push((child, slot));
        }
    }
    cells
}

/// Children before parents, siblings left to right.
fn post_order(cells: &[Cell], root: usize) -> Vec<usize> {
    let mut pending = vec![root];
    let mut visited = Vec::with_capacity(cells.len());
    while let Some(v) = pending.pop() {
        visited.push(v);
        pending.extend(cells[v].children.iter().copied());
    }
    visited.reverse();
    visited
}

fn second_walk(cells: &mut [Cell]) {
    let mut pending = vec![FOREST];
    while let Some(v) = pending.pop() {
        let parent_modifier = cells[cells[v].parent].modifier;
        cells[v].x = cells[v].prelim + parent_modifier;
        cells[v].modifier += parent_modifier;
        pending.extend(cells[v].children.iter().rev().copied());
    }
}

fn next_left(cells: &[Cell], v: usize) -> Option<usize> {
    cells[v].children.first().copied().or(cells[v].thread)
}

fn next_right(cells: &[Cell], v: usize) -> Option<usize> {
    cells[v].children.last().copied().or(cells[v].thread)
}

fn next_ancestor(cells: &[Cell], inner_left: usize, v: usize, ancestor: usize) -> usize {
    let candidate = cells[inner_left].ancestor;
    if cells[candidate].parent == cells[v].parent {
        candidate
    } else {
        ancestor
    }
}

fn move_subtree(cells: &mut [Cell], from: usize, to: usize, shift: f64) {
    let subtrees = (cells[to].number - cells[from].number) as f64;
    let change = shift / subtrees;
    cells[to].change -= change;
    cells[to].shift += shift;
    cells[from].change += change;
    cells[to].prelim += shift;
    cells[to].modifier += shift;
}

fn execute_shifts(cells: &mut [Cell], v: usize) {
    let mut shift = 0.0;
    let mut change = 0.0;
    let children = cells[v].children.clone();
    for &w in children.iter().rev() {
        cells[w].prelim += shift;
        cells[w].modifier += shift;
        change += cells[w].change;
        shift += cells[w].shift + change;
    }
}
