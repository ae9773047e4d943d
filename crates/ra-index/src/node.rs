//! Arena node representation.

use ra_core::{BoundingBox, GeomKey, IndexNodeId};

/// One `(item, box)` slot of a node.  `T` is a [`GeomKey`] in leaves and an
/// [`IndexNodeId`] in internal nodes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Entry<T> {
    pub item: T,
    pub bbox: BoundingBox,
}

impl<T> Entry<T> {
    #[inline]
    pub fn new(item: T, bbox: BoundingBox) -> Self {
        Self { item, bbox }
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Leaf(Vec<Entry<GeomKey>>),
    Internal(Vec<Entry<IndexNodeId>>),
}

/// A tree node stored in the arena.
///
/// `bbox` is a cache of the union of the entries' boxes.  It is refreshed by
/// [`recompute_bbox`](Self::recompute_bbox) after every mutation.
#[derive(Clone, Debug)]
pub struct IndexNode {
    /// `None` for the root.
    pub parent: Option<IndexNodeId>,
    pub bbox:   BoundingBox,
    pub kind:   NodeKind,
}

impl IndexNode {
    pub fn empty_leaf() -> Self {
        Self {
            parent: None,
            bbox:   BoundingBox::new(0.0, 0.0, 0.0, 0.0),
            kind:   NodeKind::Leaf(Vec::new()),
        }
    }

    pub fn with_kind(parent: Option<IndexNodeId>, kind: NodeKind) -> Self {
        let mut node = Self { parent, bbox: BoundingBox::new(0.0, 0.0, 0.0, 0.0), kind };
        node.recompute_bbox();
        node
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    #[inline]
    pub fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(e)     => e.len(),
            NodeKind::Internal(c) => c.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Union of the entries' boxes, `None` for an empty node.
    pub fn entries_union(&self) -> Option<BoundingBox> {
        match &self.kind {
            NodeKind::Leaf(e)     => union_of(e),
            NodeKind::Internal(c) => union_of(c),
        }
    }

    /// Refresh the cached box.  An empty node (only ever the root of an
    /// empty tree) keeps its previous box.
    pub fn recompute_bbox(&mut self) {
        if let Some(bbox) = self.entries_union() {
            self.bbox = bbox;
        }
    }

    /// Child slots of an internal node.
    ///
    /// # Panics
    /// Panics if called on a leaf; parents are internal by construction.
    pub fn children_mut(&mut self) -> &mut Vec<Entry<IndexNodeId>> {
        match &mut self.kind {
            NodeKind::Internal(c) => c,
            NodeKind::Leaf(_)     => unreachable!("parent node is a leaf"),
        }
    }
}

fn union_of<T>(entries: &[Entry<T>]) -> Option<BoundingBox> {
    let (first, rest) = entries.split_first()?;
    Some(rest.iter().fold(first.bbox, |acc, e| acc.union(&e.bbox)))
}

/// A node's box as seen by a presentation layer drawing the tree.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeBox {
    /// Distance from the root (root = 0).
    pub depth:   usize,
    pub bbox:    BoundingBox,
    pub is_leaf: bool,
}
