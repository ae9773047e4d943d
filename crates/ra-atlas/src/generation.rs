//! One immutable build of geometry set, spatial index and road graph.

use std::time::{Duration, Instant};

use tracing::debug;

use ra_core::{AtlasConfig, BoundingBox, Geometry, GeometrySet, Point};
use ra_graph::{AStarRouter, DijkstraRouter, GraphResult, RoadGraph, RoadGraphBuilder, Route, Router};
use ra_index::{IndexResult, NodeBox, SpatialIndex};

use crate::{AtlasResult, AtlasStats};

/// A published snapshot of the atlas.
///
/// The generation owns its geometry records, so the keys stored in the index
/// always resolve.  Nothing in it changes after construction; readers share
/// it through an `Arc` handed out by [`Atlas::snapshot`](crate::Atlas::snapshot).
#[derive(Debug)]
pub struct Generation {
    pub(crate) epoch: u64,
    geometries:       GeometrySet,
    index:            SpatialIndex,
    graph:            RoadGraph,
    build_time:       Duration,
}

impl Generation {
    /// Build index and graph for `geometries`.  The epoch is assigned when
    /// the atlas publishes the result.
    pub(crate) fn build(geometries: GeometrySet, config: &AtlasConfig) -> AtlasResult<Self> {
        let started = Instant::now();
        let (index, graph) = build_parts(&geometries, config);
        let (index, graph) = (index?, graph?);
        let build_time = started.elapsed();

        debug!(
            geometries = geometries.len(),
            height = index.height(),
            graph_nodes = graph.node_count(),
            elapsed_us = build_time.as_micros() as u64,
            "generation built"
        );
        Ok(Self { epoch: 0, geometries, index, graph, build_time })
    }

    /// The generation an atlas starts with: no records, epoch 0.
    pub(crate) fn empty(config: &AtlasConfig) -> AtlasResult<Self> {
        Ok(Self {
            epoch:      0,
            geometries: GeometrySet::new(),
            index:      SpatialIndex::with_config(config.index)?,
            graph:      empty_graph(config),
            build_time: Duration::ZERO,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Publication counter; 0 for the initial empty generation.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn geometries(&self) -> &GeometrySet {
        &self.geometries
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    /// Wall time spent building index and graph.
    pub fn build_time(&self) -> Duration {
        self.build_time
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Records whose bounding box intersects `query`, in index traversal
    /// order.
    pub fn range_search(&self, query: &BoundingBox) -> Vec<&Geometry> {
        self.index
            .range_search(query)
            .into_iter()
            .map(|key| &self.geometries[key])
            .collect()
    }

    /// The `k` records nearest to `p` by bounding-box distance, nearest first.
    pub fn knn_search(&self, p: Point, k: usize) -> Vec<&Geometry> {
        self.index
            .knn_search(p, k)
            .into_iter()
            .map(|key| &self.geometries[key])
            .collect()
    }

    /// [`knn_search`](Self::knn_search) with each record's distance.
    pub fn knn_with_distances(&self, p: Point, k: usize) -> Vec<(&Geometry, f64)> {
        self.index
            .knn_with_distances(p, k)
            .into_iter()
            .map(|(key, d)| (&self.geometries[key], d))
            .collect()
    }

    /// Dijkstra route between the graph nodes nearest `start` and `end`.
    pub fn shortest_path(&self, start: Point, end: Point) -> Route {
        self.route_with(&DijkstraRouter, start, end)
    }

    /// A* route between the graph nodes nearest `start` and `end`.
    pub fn astar_path(&self, start: Point, end: Point) -> Route {
        self.route_with(&AStarRouter, start, end)
    }

    /// Route with a caller-supplied algorithm.
    pub fn route_with<R: Router + ?Sized>(&self, router: &R, start: Point, end: Point) -> Route {
        router.route(&self.graph, start, end)
    }

    /// Index node boxes by depth, for drawing the tree.
    pub fn node_boxes(&self) -> Vec<NodeBox> {
        self.index.node_boxes()
    }

    pub fn stats(&self) -> AtlasStats {
        AtlasStats::collect(self)
    }
}

// ── Build helpers ─────────────────────────────────────────────────────────────

fn build_index(set: &GeometrySet, config: &AtlasConfig) -> IndexResult<SpatialIndex> {
    SpatialIndex::build(set, config.index)
}

fn build_graph(set: &GeometrySet, config: &AtlasConfig) -> GraphResult<RoadGraph> {
    if config.build_graph {
        RoadGraph::from_set(set, &config.graph)
    } else {
        Ok(empty_graph(config))
    }
}

fn empty_graph(config: &AtlasConfig) -> RoadGraph {
    RoadGraphBuilder::new(config.graph.snap_threshold).build()
}

#[cfg(not(feature = "parallel"))]
fn build_parts(
    set:    &GeometrySet,
    config: &AtlasConfig,
) -> (IndexResult<SpatialIndex>, GraphResult<RoadGraph>) {
    (build_index(set, config), build_graph(set, config))
}

/// Index and graph read the same records and share nothing else.
#[cfg(feature = "parallel")]
fn build_parts(
    set:    &GeometrySet,
    config: &AtlasConfig,
) -> (IndexResult<SpatialIndex>, GraphResult<RoadGraph>) {
    rayon::join(|| build_index(set, config), || build_graph(set, config))
}
