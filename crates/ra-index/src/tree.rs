//! The bounding-box tree and its insertion algorithm.
//!
//! # Insertion
//!
//! ```text
//! insert(key, box):
//!   ① choose_leaf: descend, picking the child that grows least
//!                  (ties: smaller area, then first child)
//!   ② append     : push (key, box) into the leaf, refresh its box
//!   ③ split      : if the leaf now holds > max_entries, split it
//!   ④ adjust_tree: walk to the root refreshing boxes; hand any new
//!                  sibling to the parent, splitting it on overflow
//!   ⑤ grow       : if the root itself split, add a new root on top
//! ```
//!
//! The tree only grows.  There is no delete and no underflow handling, so
//! every leaf stays at the same depth and `height` only ever increases.

use tracing::{debug, trace};

use ra_core::{BoundingBox, GeomKey, Geometry, GeometrySet, IndexConfig, IndexNodeId};

use crate::node::{Entry, IndexNode, NodeBox, NodeKind};
use crate::split::{halve, quadratic_split};
use crate::{IndexError, IndexResult};

/// Hierarchical bounding-box index over [`GeomKey`] handles.
///
/// The index does not own geometry: it stores keys into the
/// [`GeometrySet`] it was filled from, and queries return keys.  Resolve them
/// against that same set.
///
/// # Example
///
/// ```
/// use ra_core::{BoundingBox, Geometry, GeometrySet, Point};
/// use ra_index::SpatialIndex;
///
/// let mut set = GeometrySet::new();
/// for i in 0..5 {
///     let p = Point::new(i as f64, i as f64);
///     set.push(Geometry::point(p, i).unwrap());
/// }
/// let mut index = SpatialIndex::new();
/// index.insert_all(&set);
///
/// let hits = index.range_search(&BoundingBox::new(0.0, 0.0, 2.0, 2.0));
/// assert_eq!(hits.len(), 3);
/// assert_eq!(index.height(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    config: IndexConfig,
    nodes:  Vec<IndexNode>,
    root:   IndexNodeId,
    height: usize,
    len:    usize,
}

impl SpatialIndex {
    /// Empty index with the default fan-out (2..4).
    pub fn new() -> Self {
        Self::from_valid_config(IndexConfig::default())
    }

    /// Empty index with a custom fan-out.
    pub fn with_config(config: IndexConfig) -> IndexResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Build an index holding every record of `set`, inserted in set order.
    pub fn build(set: &GeometrySet, config: IndexConfig) -> IndexResult<Self> {
        let mut index = Self::with_config(config)?;
        index.insert_all(set);
        Ok(index)
    }

    fn from_valid_config(config: IndexConfig) -> Self {
        Self {
            config,
            nodes:  vec![IndexNode::empty_leaf()],
            root:   IndexNodeId(0),
            height: 1,
            len:    0,
        }
    }

    /// Drop every entry and node, keeping the configuration.
    pub fn clear(&mut self) {
        *self = Self::from_valid_config(self.config);
    }

    // ── Statistics ────────────────────────────────────────────────────────

    /// Number of inserted entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels; a lone leaf root has height 1.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of nodes in the arena (all of them reachable).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn config(&self) -> IndexConfig {
        self.config
    }

    /// Box covering every entry, `None` when empty.
    pub fn bounds(&self) -> Option<BoundingBox> {
        (!self.is_empty()).then(|| self.root_node().bbox)
    }

    // ── Insertion ─────────────────────────────────────────────────────────

    /// Index `geometry` under `key`.
    pub fn insert(&mut self, key: GeomKey, geometry: &Geometry) {
        self.insert_box(key, geometry.bbox());
    }

    /// Insert every record of `set`, in set order.
    pub fn insert_all(&mut self, set: &GeometrySet) {
        for (key, geometry) in set.iter() {
            self.insert(key, geometry);
        }
    }

    /// Index an arbitrary `(key, box)` pair.  Never fails.
    pub fn insert_box(&mut self, key: GeomKey, bbox: BoundingBox) {
        let leaf = self.choose_leaf(&bbox);

        let node = self.node_mut(leaf);
        match &mut node.kind {
            NodeKind::Leaf(entries) => entries.push(Entry::new(key, bbox)),
            NodeKind::Internal(_)   => unreachable!("choose_leaf returned an internal node"),
        }
        node.recompute_bbox();
        self.len += 1;

        let split = self.overflows(leaf).then(|| self.split(leaf));
        self.adjust_tree(leaf, split);

        debug_assert!(self.root_node().bbox.contains(&bbox), "root box misses new entry");
    }

    /// Descend from the root to the leaf needing the least enlargement.
    fn choose_leaf(&self, bbox: &BoundingBox) -> IndexNodeId {
        let mut current = self.root;
        loop {
            let children = match &self.node(current).kind {
                NodeKind::Leaf(_)        => return current,
                NodeKind::Internal(c)    => c,
            };

            let mut best = 0;
            let mut best_growth = f64::INFINITY;
            for (i, child) in children.iter().enumerate() {
                let growth = child.bbox.expansion_area(bbox);
                if growth < best_growth
                    || (growth == best_growth && child.bbox.area() < children[best].bbox.area())
                {
                    best = i;
                    best_growth = growth;
                }
            }
            current = children[best].item;
        }
    }

    #[inline]
    fn overflows(&self, id: IndexNodeId) -> bool {
        self.node(id).len() > self.config.max_entries
    }

    /// Split `id` in place and return the new sibling, which shares `id`'s
    /// parent but is not yet registered with it.
    fn split(&mut self, id: IndexNodeId) -> IndexNodeId {
        let sibling_id = IndexNodeId::from_index(self.nodes.len());
        let node = self.node_mut(id);
        let parent = node.parent;

        let sibling_kind = match &mut node.kind {
            NodeKind::Leaf(entries) => {
                let (kept, moved) = quadratic_split(entries);
                *entries = kept;
                NodeKind::Leaf(moved)
            }
            NodeKind::Internal(children) => NodeKind::Internal(halve(children)),
        };
        node.recompute_bbox();
        trace!(node = %id, sibling = %sibling_id, kept = node.len(), "split node");

        if let NodeKind::Internal(moved) = &sibling_kind {
            for child in moved {
                self.nodes[child.item.index()].parent = Some(sibling_id);
            }
        }
        self.nodes.push(IndexNode::with_kind(parent, sibling_kind));
        sibling_id
    }

    /// Propagate box changes and splits from `start` up to the root.
    fn adjust_tree(&mut self, start: IndexNodeId, mut split: Option<IndexNodeId>) {
        let mut current = start;

        while let Some(parent) = self.node(current).parent {
            let current_box = self.node(current).bbox;
            let split_entry = split.map(|s| Entry::new(s, self.node(s).bbox));

            let parent_node = self.node_mut(parent);
            let children = parent_node.children_mut();
            if let Some(slot) = children.iter_mut().find(|c| c.item == current) {
                slot.bbox = current_box;
            }
            if let Some(entry) = split_entry {
                children.push(entry);
            }
            parent_node.recompute_bbox();

            split = match split {
                Some(_) if self.overflows(parent) => Some(self.split(parent)),
                _ => None,
            };
            current = parent;
        }

        if let Some(sibling) = split {
            self.grow_root(sibling);
        }
    }

    /// The root split: put a new root above the old root and its sibling.
    fn grow_root(&mut self, sibling: IndexNodeId) {
        let old_root = self.root;
        let new_root = IndexNodeId::from_index(self.nodes.len());

        let children = vec![
            Entry::new(old_root, self.node(old_root).bbox),
            Entry::new(sibling, self.node(sibling).bbox),
        ];
        self.nodes.push(IndexNode::with_kind(None, NodeKind::Internal(children)));
        self.node_mut(old_root).parent = Some(new_root);
        self.node_mut(sibling).parent = Some(new_root);

        self.root = new_root;
        self.height += 1;
        debug!(height = self.height, nodes = self.nodes.len(), entries = self.len, "index root grew");
    }

    // ── Arena access ──────────────────────────────────────────────────────

    #[inline]
    pub(crate) fn node(&self, id: IndexNodeId) -> &IndexNode {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: IndexNodeId) -> &mut IndexNode {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn root(&self) -> IndexNodeId {
        self.root
    }

    #[inline]
    fn root_node(&self) -> &IndexNode {
        self.node(self.root)
    }

    /// Every node's box with its depth, breadth-first from the root.
    ///
    /// An empty tree yields nothing.
    pub fn node_boxes(&self) -> Vec<NodeBox> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut level = vec![self.root];
        let mut depth = 0;
        while !level.is_empty() {
            let mut next = Vec::new();
            for id in level {
                let node = self.node(id);
                out.push(NodeBox { depth, bbox: node.bbox, is_leaf: node.is_leaf() });
                if let NodeKind::Internal(children) = &node.kind {
                    next.extend(children.iter().map(|c| c.item));
                }
            }
            level = next;
            depth += 1;
        }
        out
    }

    // ── Validation ────────────────────────────────────────────────────────

    /// Check the structural invariants of the whole tree:
    ///
    /// - every cached box equals the union of its entries' boxes, and every
    ///   child slot's box equals the child's cached box;
    /// - parent links mirror child lists;
    /// - no node holds more than `max_entries`, and only the root may be
    ///   empty;
    /// - all leaves sit at depth `height - 1`;
    /// - entry and node totals match `len()` and `node_count()`.
    ///
    /// Cost is O(n); intended for tests and debugging.
    pub fn validate(&self) -> IndexResult<()> {
        let mut entries = 0;
        let mut visited = 0;
        self.validate_node(self.root, None, 0, &mut entries, &mut visited)?;

        if entries != self.len {
            return Err(invariant(self.root, format!("found {entries} entries, len() is {}", self.len)));
        }
        if visited != self.nodes.len() {
            return Err(invariant(
                self.root,
                format!("{visited} reachable nodes, arena holds {}", self.nodes.len()),
            ));
        }
        Ok(())
    }

    fn validate_node(
        &self,
        id:      IndexNodeId,
        parent:  Option<IndexNodeId>,
        depth:   usize,
        entries: &mut usize,
        visited: &mut usize,
    ) -> IndexResult<()> {
        let node = self.node(id);
        *visited += 1;

        if node.parent != parent {
            return Err(invariant(id, format!("parent is {:?}, expected {parent:?}", node.parent)));
        }
        if node.len() > self.config.max_entries {
            return Err(invariant(id, format!("{} entries exceed max {}", node.len(), self.config.max_entries)));
        }
        if node.is_empty() && id != self.root {
            return Err(invariant(id, "empty non-root node".into()));
        }
        if let Some(union) = node.entries_union().filter(|u| *u != node.bbox) {
            return Err(invariant(id, format!("cached box {} != union {union}", node.bbox)));
        }

        match &node.kind {
            NodeKind::Leaf(leaf_entries) => {
                if depth + 1 != self.height {
                    return Err(invariant(id, format!("leaf at depth {depth}, height {}", self.height)));
                }
                *entries += leaf_entries.len();
            }
            NodeKind::Internal(children) => {
                for child in children {
                    if child.bbox != self.node(child.item).bbox {
                        return Err(invariant(child.item, "parent slot box is stale".into()));
                    }
                    self.validate_node(child.item, Some(id), depth + 1, entries, visited)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn invariant(node: IndexNodeId, reason: String) -> IndexError {
    IndexError::Invariant { node, reason }
}
