//! Routing trait with Dijkstra and A* implementations.
//!
//! # Pluggability
//!
//! Hosts call routing through the [`Router`] trait, so the algorithm can be
//! chosen per query (or swapped for a custom one) without touching the
//! graph.  Both built-in routers share one best-first search; they differ
//! only in the goal-distance estimate added to the frontier priority.
//!
//! # Costs
//!
//! Edge weights are planar Euclidean segment lengths, so the straight-line
//! distance to the goal never overestimates the remaining cost.  A* with
//! that estimate returns the same total distance as Dijkstra while
//! finalising no more nodes.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::trace;

use ra_core::{NodeId, Point};

use crate::network::RoadGraph;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query.
///
/// `node_ids` and `path` have the same length and order, from start to end.
/// When `found` is `false` both are empty and `total_distance` is 0.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub node_ids:       Vec<NodeId>,
    pub path:           Vec<Point>,
    pub total_distance: f64,
    pub found:          bool,
    /// Nodes finalised by the search before it stopped.
    pub settled:        usize,
}

impl Route {
    /// A "no route" result.
    pub fn not_found(settled: usize) -> Self {
        Self { settled, ..Self::default() }
    }

    /// `true` if start and end snapped to the same node.
    pub fn is_trivial(&self) -> bool {
        self.found && self.node_ids.len() == 1
    }

    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.node_ids.len().saturating_sub(1)
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// Implementations must be `Send + Sync` so a single router can serve
/// queries from several threads against a shared, immutable graph.
pub trait Router: Send + Sync {
    /// Least-cost route between two existing nodes.
    ///
    /// Out-of-range ids and unreachable targets yield `found == false`.
    fn route_nodes(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> Route;

    /// Snap `start` and `end` to their nearest nodes and route between them.
    fn route(&self, graph: &RoadGraph, start: Point, end: Point) -> Route {
        match (graph.find_nearest_node(start), graph.find_nearest_node(end)) {
            (Some(from), Some(to)) => self.route_nodes(graph, from, to),
            _ => Route::not_found(0),
        }
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Uniform-cost search: frontier ordered by distance from the start.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route_nodes(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> Route {
        best_first(graph, from, to, |_| 0.0)
    }
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// Goal-directed search: frontier ordered by distance so far plus the
/// straight-line distance to the goal.
#[derive(Copy, Clone, Debug, Default)]
pub struct AStarRouter;

impl Router for AStarRouter {
    fn route_nodes(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> Route {
        let Some(goal) = graph.node(to).map(|n| n.position) else {
            return Route::not_found(0);
        };
        best_first(graph, from, to, |p| p.distance(goal))
    }
}

// ── Search internals ──────────────────────────────────────────────────────────

/// Heap key.  `f64` is not `Ord`; route costs are finite and non-negative,
/// so `total_cmp` gives the numeric order.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shared Dijkstra/A* loop.
///
/// Priority is `dist[v] + estimate(position(v))`; ties pop the lower
/// `NodeId` first.  A node is finalised when popped; the search stops as
/// soon as `to` is finalised.
fn best_first<H>(graph: &RoadGraph, from: NodeId, to: NodeId, estimate: H) -> Route
where
    H: Fn(Point) -> f64,
{
    let n = graph.node_count();
    if from.index() >= n || to.index() >= n {
        return Route::not_found(0);
    }

    // dist[v] = best known cost to reach v.
    let mut dist    = vec![f64::INFINITY; n];
    // prev[v] = predecessor on the best known path; INVALID if unreached.
    let mut prev    = vec![NodeId::INVALID; n];
    let mut settled = vec![false; n];
    let mut settled_count = 0usize;

    dist[from.index()] = 0.0;

    // Min-heap via Reverse; NodeId as secondary key for deterministic ties.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(estimate(graph.position(from))), from)));

    while let Some(Reverse((_, node))) = heap.pop() {
        if settled[node.index()] {
            continue;
        }
        settled[node.index()] = true;
        settled_count += 1;

        if node == to {
            let route = reconstruct(graph, &prev, from, to, dist[to.index()], settled_count);
            trace!(%from, %to, hops = route.hop_count(), settled = settled_count, "route found");
            return route;
        }

        let base = dist[node.index()];
        for &(neighbor, weight) in graph.neighbors(node) {
            if settled[neighbor.index()] {
                continue;
            }
            let candidate = base + weight;
            if candidate < dist[neighbor.index()] {
                dist[neighbor.index()] = candidate;
                prev[neighbor.index()] = node;
                let priority = candidate + estimate(graph.position(neighbor));
                heap.push(Reverse((Cost(priority), neighbor)));
            }
        }
    }

    trace!(%from, %to, settled = settled_count, "no route");
    Route::not_found(settled_count)
}

fn reconstruct(
    graph:    &RoadGraph,
    prev:     &[NodeId],
    from:     NodeId,
    to:       NodeId,
    total:    f64,
    settled:  usize,
) -> Route {
    let mut node_ids = vec![to];
    let mut cur = to;
    while cur != from {
        cur = prev[cur.index()];
        debug_assert!(cur.is_valid(), "broken predecessor chain");
        node_ids.push(cur);
    }
    node_ids.reverse();

    let path = node_ids.iter().map(|&id| graph.position(id)).collect();
    Route {
        node_ids,
        path,
        total_distance: total,
        found: true,
        settled,
    }
}
