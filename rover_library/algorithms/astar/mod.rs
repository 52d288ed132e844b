//! A* Graph Search
//!
//! Optimal shortest-path search over an arbitrary vertex graph.
//!
//! # Features
//!
//! - Works on any [`SearchGraph`] (the ROVER [`Map`](crate::map::Map) is one)
//! - Multiple heuristics (Euclidean, Manhattan, Diagonal) or any closure
//! - Occupied vertices are never expanded
//! - Deterministic: ties on `f_cost` are broken by the lowest vertex id
//!
//! The search returns a predecessor map; turn it into a vertex sequence with
//! [`reconstruct_path`].
//!
//! [`astar_search`] uses the heuristic both as the estimate to the goal and as
//! the cost of traversing an edge. That is only sound for metric heuristics;
//! use [`astar_search_with_cost`] to supply a separate edge cost.
//!
//! # Example
//!
//! ```rust
//! use rover_library::algorithms::astar::{astar_search, reconstruct_path, Heuristic};
//! use rover_library::map::Map;
//!
//! let mut map = Map::grid(4, 4, 1.0);
//! let predecessors = astar_search(&mut map, 0, 15, Heuristic::Euclidean.as_fn());
//! let path = reconstruct_path(&predecessors, 0, 15).unwrap();
//!
//! assert_eq!(path.first(), Some(&0));
//! assert_eq!(path.last(), Some(&15));
//! ```

use crate::messages::Point2;
use rover_core::{RoverError, RoverResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

mod tests;

/// Relaxed vertex id -> id of the vertex it was reached from
pub type PredecessorMap = BTreeMap<usize, usize>;

/// Heuristic function type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    /// Straight-line distance
    #[default]
    Euclidean,
    /// Sum of axis distances
    Manhattan,
    /// Octile distance
    Diagonal,
}

impl Heuristic {
    pub fn cost(&self, a: &Point2, b: &Point2) -> f64 {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        match self {
            Heuristic::Euclidean => dx.hypot(dy),
            Heuristic::Manhattan => dx + dy,
            Heuristic::Diagonal => {
                let (min, max) = if dx < dy { (dx, dy) } else { (dy, dx) };
                max + (std::f64::consts::SQRT_2 - 1.0) * min
            }
        }
    }

    /// Closure form accepted by the search functions
    pub fn as_fn(self) -> impl Fn(&Point2, &Point2) -> f64 + Copy {
        move |a, b| self.cost(a, b)
    }
}

/// Graph view required by the search.
///
/// `g_cost`/`f_cost` are per-search scratch owned by the graph so that
/// callers can inspect them after a search.
pub trait SearchGraph {
    fn vertex_count(&self) -> usize;

    /// Position of vertex `id` (`id < vertex_count()`)
    fn position(&self, id: usize) -> Point2;

    /// Whether the search may enter vertex `id`
    fn is_traversable(&self, id: usize) -> bool;

    fn neighbors(&self, id: usize) -> &[usize];

    /// `(g_cost, f_cost)` of vertex `id`
    fn costs(&self, id: usize) -> (f64, f64);

    fn set_costs(&mut self, id: usize, g_cost: f64, f_cost: f64);

    /// Set every `g_cost`/`f_cost` back to infinity
    fn reset_costs(&mut self);
}

/// Open-set entry, ordered so that `BinaryHeap` pops the lowest `f_cost`
/// first and the lowest id among equal `f_cost`s
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f_cost: f64,
    id: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* search using `heuristic` as both estimate and edge cost.
///
/// Returns an empty map when `start` or `goal` is not a vertex, and
/// `{start: start}` when they are equal.
pub fn astar_search<G, H>(graph: &mut G, start: usize, goal: usize, heuristic: H) -> PredecessorMap
where
    G: SearchGraph + ?Sized,
    H: Fn(&Point2, &Point2) -> f64,
{
    astar_search_with_cost(graph, start, goal, &heuristic, &heuristic)
}

/// A* search with a separate edge-traversal cost.
///
/// Scratch costs are reset before the search starts. The search stops as soon
/// as `goal` is popped from the open set; if `goal` is unreachable the
/// returned map does not contain it.
pub fn astar_search_with_cost<G, H, C>(
    graph: &mut G,
    start: usize,
    goal: usize,
    heuristic: H,
    edge_cost: C,
) -> PredecessorMap
where
    G: SearchGraph + ?Sized,
    H: Fn(&Point2, &Point2) -> f64,
    C: Fn(&Point2, &Point2) -> f64,
{
    let mut predecessors = PredecessorMap::new();
    let count = graph.vertex_count();
    if start >= count || goal >= count {
        log::warn!(
            target: "rover::astar",
            "start {} or goal {} outside graph of {} vertices",
            start,
            goal,
            count
        );
        return predecessors;
    }
    if start == goal {
        predecessors.insert(start, start);
        return predecessors;
    }

    graph.reset_costs();
    let goal_position = graph.position(goal);
    let start_f = heuristic(&graph.position(start), &goal_position);
    graph.set_costs(start, 0.0, start_f);

    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        f_cost: start_f,
        id: start,
    });
    let mut closed = BTreeSet::new();
    let mut expanded = 0usize;

    while let Some(OpenEntry { f_cost, id: current }) = open.pop() {
        let (current_g, current_f) = graph.costs(current);
        // Superseded by a cheaper push
        if closed.contains(&current) || f_cost > current_f {
            continue;
        }
        if current == goal {
            break;
        }
        closed.insert(current);
        expanded += 1;

        let current_position = graph.position(current);
        let neighbors = graph.neighbors(current).to_vec();
        for next in neighbors {
            if closed.contains(&next) || !graph.is_traversable(next) {
                continue;
            }
            let next_position = graph.position(next);
            let tentative_g = current_g + edge_cost(&current_position, &next_position);
            let (next_g, _) = graph.costs(next);
            if tentative_g < next_g {
                let next_f = tentative_g + heuristic(&next_position, &goal_position);
                predecessors.insert(next, current);
                graph.set_costs(next, tentative_g, next_f);
                open.push(OpenEntry {
                    f_cost: next_f,
                    id: next,
                });
            }
        }
    }

    log::trace!(
        target: "rover::astar",
        "search {} -> {} expanded {} vertices, relaxed {}",
        start,
        goal,
        expanded,
        predecessors.len()
    );
    predecessors
}

/// Walk the predecessor chain back from `goal` to `start`.
///
/// Fails with [`RoverError::NotFound`] if the chain is broken or loops.
pub fn reconstruct_path(
    predecessors: &PredecessorMap,
    start: usize,
    goal: usize,
) -> RoverResult<Vec<usize>> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = *predecessors.get(&current).ok_or_else(|| {
            RoverError::not_found(format!("vertex {} has no predecessor towards {}", current, start))
        })?;
        path.push(current);
        if path.len() > predecessors.len() + 1 {
            return Err(RoverError::not_found(format!(
                "predecessor chain from {} never reaches {}",
                goal, start
            )));
        }
    }
    path.reverse();
    Ok(path)
}

/// Total cost of walking `ids` in order under `cost`
pub fn path_cost<G, C>(graph: &G, ids: &[usize], cost: C) -> f64
where
    G: SearchGraph + ?Sized,
    C: Fn(&Point2, &Point2) -> f64,
{
    ids.windows(2)
        .map(|pair| cost(&graph.position(pair[0]), &graph.position(pair[1])))
        .sum()
}
