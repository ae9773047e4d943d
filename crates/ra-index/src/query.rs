//! Range and nearest-neighbour queries.
//!
//! # k-NN ordering
//!
//! Results are sorted by [`BoundingBox::min_distance`] to the query point.
//! Equal distances keep depth-first traversal order, i.e. the order in which
//! [`SpatialIndex::knn_search_exhaustive`] would visit the entries.
//!
//! The default [`SpatialIndex::knn_search`] is best-first: a heap ordered by
//! `(distance lower bound, traversal path)`, where the path is the sequence
//! of child positions from the root.  A subtree's path is a prefix of all
//! its entries' paths and its box distance never exceeds theirs, so entries
//! pop in exactly the exhaustive order, ties included.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ra_core::{BoundingBox, GeomKey, IndexNodeId, Point};

use crate::node::NodeKind;
use crate::SpatialIndex;

impl SpatialIndex {
    /// Keys of every entry whose own box intersects `query`.
    ///
    /// The result is in traversal order; treat it as a set.
    pub fn range_search(&self, query: &BoundingBox) -> Vec<GeomKey> {
        let mut out = Vec::new();
        if !self.is_empty() {
            self.range_recursive(self.root(), query, &mut out);
        }
        out
    }

    fn range_recursive(&self, id: IndexNodeId, query: &BoundingBox, out: &mut Vec<GeomKey>) {
        let node = self.node(id);
        if !node.bbox.intersects(query) {
            return;
        }
        match &node.kind {
            NodeKind::Leaf(entries) => {
                out.extend(entries.iter().filter(|e| e.bbox.intersects(query)).map(|e| e.item));
            }
            NodeKind::Internal(children) => {
                for child in children {
                    self.range_recursive(child.item, query, out);
                }
            }
        }
    }

    /// The `k` entries nearest to `p`, nearest first.
    ///
    /// `k == 0` yields nothing; `k >= len()` yields every entry.
    pub fn knn_search(&self, p: Point, k: usize) -> Vec<GeomKey> {
        self.knn_with_distances(p, k).into_iter().map(|(key, _)| key).collect()
    }

    /// Like [`knn_search`](Self::knn_search), with each entry's distance.
    pub fn knn_with_distances(&self, p: Point, k: usize) -> Vec<(GeomKey, f64)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(k.min(self.len()));
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(Candidate {
            dist:   self.node(self.root()).bbox.min_distance(p),
            path:   Vec::new(),
            target: Target::Node(self.root()),
        }));

        while let Some(Reverse(cand)) = heap.pop() {
            let node = match cand.target {
                Target::Entry(key) => {
                    out.push((key, cand.dist));
                    if out.len() == k {
                        break;
                    }
                    continue;
                }
                Target::Node(id) => self.node(id),
            };

            match &node.kind {
                NodeKind::Leaf(entries) => {
                    for (i, e) in entries.iter().enumerate() {
                        heap.push(Reverse(cand.child(i, e.bbox.min_distance(p), Target::Entry(e.item))));
                    }
                }
                NodeKind::Internal(children) => {
                    for (i, c) in children.iter().enumerate() {
                        heap.push(Reverse(cand.child(i, c.bbox.min_distance(p), Target::Node(c.item))));
                    }
                }
            }
        }
        out
    }

    /// Reference k-NN: score every entry, stable-sort, truncate.
    ///
    /// O(n log n) per query.  Kept as the definition of the result order.
    pub fn knn_search_exhaustive(&self, p: Point, k: usize) -> Vec<GeomKey> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }
        let mut scored = Vec::with_capacity(self.len());
        self.collect_scored(self.root(), p, &mut scored);
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        scored.into_iter().map(|(key, _)| key).collect()
    }

    fn collect_scored(&self, id: IndexNodeId, p: Point, out: &mut Vec<(GeomKey, f64)>) {
        match &self.node(id).kind {
            NodeKind::Leaf(entries) => {
                out.extend(entries.iter().map(|e| (e.item, e.bbox.min_distance(p))));
            }
            NodeKind::Internal(children) => {
                for child in children {
                    self.collect_scored(child.item, p, out);
                }
            }
        }
    }
}

// ── Best-first frontier ───────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
enum Target {
    Node(IndexNodeId),
    Entry(GeomKey),
}

#[derive(Debug)]
struct Candidate {
    dist:   f64,
    /// Child positions from the root; lexicographic order = DFS order.
    path:   Vec<u32>,
    target: Target,
}

impl Candidate {
    fn child(&self, position: usize, dist: f64, target: Target) -> Candidate {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(position as u32);
        Candidate { dist, path, target }
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}
