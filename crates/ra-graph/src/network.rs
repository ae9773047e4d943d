//! Road graph representation and builder.
//!
//! # Data layout
//!
//! Nodes live in a `Vec<GraphNode>` indexed by [`NodeId`].  Each node keeps
//! its own ordered adjacency list of `(neighbour, weight)` pairs, and every
//! road segment is recorded at **both** endpoints.  The graph is undirected
//! by duplication: `edge_count()` halves the adjacency total.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over node positions answers nearest-node queries,
//! used to snap arbitrary route endpoints onto the graph.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::debug;

use ra_core::{Geometry, GeometryKind, GeometrySet, GraphConfig, NodeId, Point};

use crate::router::{AStarRouter, DijkstraRouter, Route, Router};
use crate::snap::SnapGrid;
use crate::{GraphError, GraphResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a node position with its id.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Same arithmetic as [`Point::distance_sq`] so that equal distances
    /// compare equal across both code paths.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        Point::from(self.point).distance_sq(Point::from(*point))
    }
}

// ── GraphNode ─────────────────────────────────────────────────────────────────

/// A road-graph vertex: an intersection or a shape point of a line.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphNode {
    pub id:        NodeId,
    pub position:  Point,
    /// `(neighbour, edge weight)` in insertion order.
    pub neighbors: Vec<(NodeId, f64)>,
}

impl GraphNode {
    fn new(id: NodeId, position: Point) -> Self {
        Self { id, position, neighbors: Vec::new() }
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Undirected road graph plus a spatial index for endpoint snapping.
///
/// Built once from a geometry snapshot via [`RoadGraph::build`] or
/// [`RoadGraphBuilder`]; there is no incremental update.
pub struct RoadGraph {
    nodes:          Vec<GraphNode>,
    snap_threshold: f64,
    spatial_idx:    RTree<NodeEntry>,
}

impl RoadGraph {
    /// A graph with no nodes.  Every route query against it reports
    /// `found == false`.
    pub fn empty() -> Self {
        RoadGraphBuilder::new(GraphConfig::default().snap_threshold).build()
    }

    /// Derive the graph from `geometries`.
    ///
    /// Each LineString with at least two vertices contributes one edge per
    /// consecutive vertex pair, after snapping vertices to existing nodes.
    /// Points and polygons contribute nothing.
    pub fn build<'a, I>(geometries: I, config: &GraphConfig) -> GraphResult<Self>
    where
        I: IntoIterator<Item = &'a Geometry>,
    {
        config.validate()?;
        let mut builder = RoadGraphBuilder::new(config.snap_threshold);
        let mut lines = 0usize;
        for g in geometries {
            if g.kind() == GeometryKind::LineString && g.points().len() >= 2 {
                builder.add_line(g.points());
                lines += 1;
            }
        }
        let graph = builder.build();
        debug!(
            lines,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            snap_threshold = graph.snap_threshold,
            "road graph built"
        );
        Ok(graph)
    }

    /// [`build`](Self::build) over every record of a [`GeometrySet`].
    pub fn from_set(set: &GeometrySet, config: &GraphConfig) -> GraphResult<Self> {
        Self::build(set.geometries(), config)
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges: adjacency entries / 2.
    pub fn edge_count(&self) -> usize {
        let total = self.adjacency_total();
        debug_assert!(total.is_multiple_of(2), "odd adjacency total {total}: an edge was stored one-way");
        total / 2
    }

    fn adjacency_total(&self) -> usize {
        self.nodes.iter().map(GraphNode::degree).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Mean number of adjacency entries per node; 0 for an empty graph.
    pub fn average_degree(&self) -> f64 {
        if self.nodes.is_empty() {
            0.0
        } else {
            self.adjacency_total() as f64 / self.nodes.len() as f64
        }
    }

    /// Sum of all edge weights, each undirected edge counted once.
    pub fn total_edge_weight(&self) -> f64 {
        let doubled: f64 = self
            .nodes
            .iter()
            .flat_map(|n| n.neighbors.iter().map(|&(_, w)| w))
            .sum();
        doubled / 2.0
    }

    pub fn snap_threshold(&self) -> f64 {
        self.snap_threshold
    }

    // ── Node access ───────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.index())
    }

    /// Like [`node`](Self::node) but with a typed error for callers that
    /// treat a missing node as a bug.
    pub fn try_node(&self, id: NodeId) -> GraphResult<&GraphNode> {
        self.node(id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Position of `id`.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    #[inline]
    pub fn position(&self, id: NodeId) -> Point {
        self.nodes[id.index()].position
    }

    #[inline]
    pub fn neighbors(&self, id: NodeId) -> &[(NodeId, f64)] {
        &self.nodes[id.index()].neighbors
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The node closest to `p`; equal distances resolve to the lowest id.
    ///
    /// Returns `None` if the graph has no nodes or `p` has a non-finite
    /// coordinate.
    pub fn find_nearest_node(&self, p: Point) -> Option<NodeId> {
        if !p.is_finite() {
            return None;
        }
        let mut iter = self.spatial_idx.nearest_neighbor_iter_with_distance_2(&[p.x, p.y]);
        let (first, best_d2) = iter.next()?;
        let best_d = best_d2.sqrt();
        let mut best = first.id;

        // Items arrive in ascending distance; scan the run that ties.
        for (entry, d2) in iter {
            if d2.sqrt() > best_d {
                break;
            }
            best = best.min(entry.id);
        }
        Some(best)
    }

    /// Up to `k` nodes nearest to `p`, nearest first.  Empty for a
    /// non-finite `p`.
    pub fn k_nearest_nodes(&self, p: Point, k: usize) -> Vec<NodeId> {
        if !p.is_finite() {
            return Vec::new();
        }
        self.spatial_idx
            .nearest_neighbor_iter(&[p.x, p.y])
            .take(k)
            .map(|e| e.id)
            .collect()
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// Dijkstra shortest path between the nodes nearest `start` and `end`.
    pub fn find_shortest_path(&self, start: Point, end: Point) -> Route {
        DijkstraRouter.route(self, start, end)
    }

    /// A* shortest path between the nodes nearest `start` and `end`.
    pub fn find_astar_path(&self, start: Point, end: Point) -> Route {
        AStarRouter.route(self, start, end)
    }
}

impl Default for RoadGraph {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for RoadGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("snap_threshold", &self.snap_threshold)
            .finish()
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Vertices passed to [`snap_or_insert`](Self::snap_or_insert) or
/// [`add_line`](Self::add_line) are merged with the first earlier node lying
/// strictly within the snap threshold.
///
/// # Example
///
/// ```
/// use ra_core::Point;
/// use ra_graph::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new(1e-4);
/// b.add_line(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
/// b.add_line(&[Point::new(1.0, 0.00001), Point::new(1.0, 1.0)]);
/// let graph = b.build();
/// assert_eq!(graph.node_count(), 3); // (1,0) shared
/// assert_eq!(graph.edge_count(), 2);
/// ```
pub struct RoadGraphBuilder {
    nodes:          Vec<GraphNode>,
    snap_threshold: f64,
    grid:           SnapGrid,
}

impl RoadGraphBuilder {
    /// `snap_threshold <= 0` disables snapping.
    pub fn new(snap_threshold: f64) -> Self {
        Self {
            nodes: Vec::new(),
            snap_threshold,
            grid: SnapGrid::new(snap_threshold),
        }
    }

    /// Add a node at `p` without snapping and return its id.
    pub fn add_node(&mut self, p: Point) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(GraphNode::new(id, p));
        self.grid.insert(id, p);
        id
    }

    /// Reuse the first node within the snap threshold of `p`, or add one.
    pub fn snap_or_insert(&mut self, p: Point) -> NodeId {
        let nodes = &self.nodes;
        let existing = self.grid.find(p, |id| nodes[id.index()].position);
        existing.unwrap_or_else(|| self.add_node(p))
    }

    /// Connect `a` and `b` in both directions, weighted by the distance
    /// between their positions.  `a == b` records a zero-weight self-loop.
    pub fn add_road(&mut self, a: NodeId, b: NodeId) {
        let weight = self.node_pos(a).distance(self.node_pos(b));
        self.nodes[a.index()].neighbors.push((b, weight));
        self.nodes[b.index()].neighbors.push((a, weight));
    }

    /// Snap every vertex of a polyline and connect consecutive vertices.
    pub fn add_line(&mut self, points: &[Point]) {
        let ids: Vec<NodeId> = points.iter().map(|&p| self.snap_or_insert(p)).collect();
        for pair in ids.windows(2) {
            self.add_road(pair[0], pair[1]);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up the position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> Point {
        self.nodes[id.index()].position
    }

    /// Consume the builder and bulk-load the nearest-node R-tree.
    pub fn build(self) -> RoadGraph {
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .map(|n| NodeEntry { point: n.position.into(), id: n.id })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        RoadGraph {
            nodes: self.nodes,
            snap_threshold: self.snap_threshold,
            spatial_idx,
        }
    }
}
