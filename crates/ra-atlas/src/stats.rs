//! Summary figures for a published generation.

use std::fmt;
use std::time::Duration;

use ra_core::GeometryKind;

use crate::Generation;

/// Counts describing one [`Generation`].
///
/// `Display` renders a one-line summary suitable for a status bar or a log
/// line.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AtlasStats {
    pub epoch:          u64,
    pub geometries:     usize,
    /// Per-kind record counts, in [`GeometryKind::ALL`] order.
    pub kind_counts:    [usize; 3],
    pub index_entries:  usize,
    pub tree_height:    usize,
    pub index_nodes:    usize,
    pub graph_nodes:    usize,
    pub graph_edges:    usize,
    pub average_degree: f64,
    pub build_time:     Duration,
}

impl AtlasStats {
    pub(crate) fn collect(generation: &Generation) -> Self {
        let index = generation.index();
        let graph = generation.graph();
        Self {
            epoch:          generation.epoch(),
            geometries:     generation.geometries().len(),
            kind_counts:    generation.geometries().kind_counts(),
            index_entries:  index.len(),
            tree_height:    index.height(),
            index_nodes:    index.node_count(),
            graph_nodes:    graph.node_count(),
            graph_edges:    graph.edge_count(),
            average_degree: graph.average_degree(),
            build_time:     generation.build_time(),
        }
    }

    /// Record count for one kind.
    pub fn count_of(&self, kind: GeometryKind) -> usize {
        match kind {
            GeometryKind::Point      => self.kind_counts[0],
            GeometryKind::LineString => self.kind_counts[1],
            GeometryKind::Polygon    => self.kind_counts[2],
        }
    }
}

impl fmt::Display for AtlasStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch {}: {} geometries (", self.epoch, self.geometries)?;
        for (i, kind) in GeometryKind::ALL.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", self.count_of(kind), kind)?;
        }
        write!(
            f,
            "), index height {} with {} nodes, graph {} nodes / {} edges (avg degree {:.2}), built in {:.1?}",
            self.tree_height,
            self.index_nodes,
            self.graph_nodes,
            self.graph_edges,
            self.average_degree,
            self.build_time,
        )
    }
}
