//! Integration tests for ra-atlas.

use ra_core::{Geometry, GeometrySet, Point};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Five points on the diagonal (0,0)…(4,4), record ids 0..5.
fn diagonal_points() -> GeometrySet {
    (0..5)
        .map(|i| Geometry::point(Point::new(i as f64, i as f64), i).unwrap())
        .collect()
}

/// Two streets meeting at (1,0), a shop and a park.
///
/// ```text
///            (1,1)
///              │
///   (0,0)────(1,0)────(2,0)        shop (3,3)   park (5,5)-(6,6)
/// ```
fn small_town() -> GeometrySet {
    let line = |pts: &[(f64, f64)], id| {
        Geometry::line_string(pts.iter().map(|&(x, y)| Point::new(x, y)).collect(), id).unwrap()
    };
    vec![
        line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], 10),
        line(&[(1.0, 0.0), (1.0, 1.0)], 11),
        Geometry::point(Point::new(3.0, 3.0), 20).unwrap(),
        Geometry::polygon(
            vec![Point::new(5.0, 5.0), Point::new(6.0, 5.0), Point::new(6.0, 6.0), Point::new(5.0, 6.0)],
            30,
        )
        .unwrap(),
    ]
    .into_iter()
    .collect()
}

fn ids(found: &[&Geometry]) -> Vec<i64> {
    found.iter().map(|g| g.id()).collect()
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use ra_core::{AtlasConfig, BoundingBox, CoreError, GraphConfig, IndexConfig, Point};

    use crate::{Atlas, AtlasError};

    #[test]
    fn starts_with_empty_generation() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        let g = atlas.snapshot();
        assert_eq!(g.epoch(), 0);
        assert!(g.geometries().is_empty());
        assert!(g.index().is_empty());
        assert!(g.graph().is_empty());
        assert!(g.range_search(&BoundingBox::new(-1e9, -1e9, 1e9, 1e9)).is_empty());
        assert!(g.knn_search(Point::new(0.0, 0.0), 3).is_empty());
        assert!(!g.shortest_path(Point::new(0.0, 0.0), Point::new(1.0, 1.0)).found);
        assert!(g.node_boxes().is_empty());
    }

    #[test]
    fn keeps_its_config() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        assert_eq!(*atlas.config(), AtlasConfig::default());
    }

    #[test]
    fn rejects_bad_index_config() {
        let config = AtlasConfig {
            index: IndexConfig { max_entries: 1, min_entries: 1 },
            ..AtlasConfig::default()
        };
        let err = Atlas::new(config).unwrap_err();
        assert!(matches!(err, AtlasError::Config(CoreError::Config(_))));
    }

    #[test]
    fn rejects_bad_graph_config() {
        let config = AtlasConfig {
            graph: GraphConfig::with_snap_threshold(-0.5),
            ..AtlasConfig::default()
        };
        assert!(Atlas::new(config).is_err());
    }

    #[test]
    fn custom_fanout_is_used() {
        let config = AtlasConfig {
            index: IndexConfig { max_entries: 8, min_entries: 3 },
            ..AtlasConfig::default()
        };
        let atlas = Atlas::new(config).unwrap();
        let g = atlas.load(super::diagonal_points()).unwrap();
        // Five entries fit in one leaf of fan-out 8.
        assert_eq!(g.index().height(), 1);
        assert_eq!(g.index().config().max_entries, 8);
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queries {
    use ra_core::{AtlasConfig, BoundingBox, GeometryKind, GraphConfig, NodeId, Point};

    use super::{diagonal_points, ids, small_town};
    use crate::Atlas;

    #[test]
    fn five_points_range_and_split() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        let g = atlas.load(diagonal_points()).unwrap();

        let mut hits = ids(&g.range_search(&BoundingBox::new(0.0, 0.0, 2.0, 2.0)));
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1, 2]);

        assert_eq!(g.index().height(), 2);
        assert_eq!(g.index().node_count(), 3);
        assert!(g.index().validate().is_ok());
    }

    #[test]
    fn knn_returns_records_nearest_first() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        let g = atlas.load(diagonal_points()).unwrap();

        let near = g.knn_search(Point::new(3.9, 3.9), 2);
        assert_eq!(ids(&near), vec![4, 3]);

        let all = g.knn_with_distances(Point::new(-1.0, -1.0), 10);
        assert_eq!(all.len(), 5);
        assert!(all.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(all[0].0.id(), 0);
    }

    #[test]
    fn knn_uses_box_distance() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        let g = atlas.load(small_town()).unwrap();
        // Inside the park polygon's box: distance 0.
        let (nearest, d) = g.knn_with_distances(Point::new(5.5, 5.5), 1)[0];
        assert_eq!(nearest.id(), 30);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn routes_over_line_geometries() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        let g = atlas.load(small_town()).unwrap();

        // Nodes: (0,0) (1,0) (2,0) (1,1); the second street reuses (1,0).
        assert_eq!(g.graph().node_count(), 4);
        assert_eq!(g.graph().edge_count(), 3);

        let d = g.shortest_path(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        let a = g.astar_path(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        assert!(d.found && a.found);
        assert_eq!(d.total_distance, 2.0);
        assert_eq!(a.total_distance, 2.0);
        assert_eq!(d.node_ids, vec![NodeId(0), NodeId(1), NodeId(3)]);
    }

    #[test]
    fn graph_can_be_skipped() {
        let config = AtlasConfig { build_graph: false, ..AtlasConfig::default() };
        let atlas = Atlas::new(config).unwrap();
        let g = atlas.load(small_town()).unwrap();

        assert!(g.graph().is_empty());
        assert!(!g.astar_path(Point::new(0.0, 0.0), Point::new(2.0, 0.0)).found);
        assert_eq!(g.index().len(), 4);
        assert_eq!(g.stats().count_of(GeometryKind::LineString), 2);
    }

    #[test]
    fn skipped_graph_keeps_configured_snap_threshold() {
        let config = AtlasConfig {
            graph: GraphConfig::with_snap_threshold(0.5),
            build_graph: false,
            ..AtlasConfig::default()
        };
        let atlas = Atlas::new(config).unwrap();
        assert_eq!(atlas.snapshot().graph().snap_threshold(), 0.5);

        let g = atlas.load(small_town()).unwrap();
        assert!(g.graph().is_empty());
        assert_eq!(g.graph().snap_threshold(), 0.5);
    }

    #[test]
    fn node_boxes_cover_every_level() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        let g = atlas.load(diagonal_points()).unwrap();
        let boxes = g.node_boxes();
        assert_eq!(boxes.len(), 3);
        assert_eq!(boxes[0].depth, 0);
        assert!(!boxes[0].is_leaf);
        assert!(boxes[1..].iter().all(|b| b.depth == 1 && b.is_leaf));
    }
}

// ── Publication ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod publication {
    use std::sync::Arc;
    use std::thread;

    use ra_core::{AtlasConfig, BoundingBox, Geometry, GeometrySet, Point};

    use super::{diagonal_points, small_town};
    use crate::{Atlas, AtlasError, Generation, LoadObserver};

    #[test]
    fn epochs_increase_per_load() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        assert_eq!(atlas.load(diagonal_points()).unwrap().epoch(), 1);
        assert_eq!(atlas.load(small_town()).unwrap().epoch(), 2);
        assert_eq!(atlas.epoch(), 2);
        assert_eq!(atlas.snapshot().geometries().len(), 4);
    }

    #[test]
    fn held_snapshot_survives_reload() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        atlas.load(diagonal_points()).unwrap();
        let old = atlas.snapshot();

        atlas.load(GeometrySet::new()).unwrap();

        assert_eq!(old.epoch(), 1);
        assert_eq!(old.range_search(&BoundingBox::new(0.0, 0.0, 4.0, 4.0)).len(), 5);
        assert!(atlas.snapshot().index().is_empty());
        assert_eq!(Arc::strong_count(&old), 1);
    }

    #[test]
    fn generation_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Generation>();
        assert_send_sync::<Atlas>();
    }

    #[test]
    fn readers_see_whole_generations() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        let everything = BoundingBox::new(-1e9, -1e9, 1e9, 1e9);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let g = atlas.snapshot();
                        // Every generation loaded below has epoch == record count.
                        assert_eq!(g.range_search(&everything).len() as u64, g.epoch());
                        assert_eq!(g.index().len(), g.geometries().len());
                    }
                });
            }
            s.spawn(|| {
                for n in 1..=20 {
                    let set: GeometrySet = (0..n)
                        .map(|i| Geometry::point(Point::new(i as f64, 0.0), i).unwrap())
                        .collect();
                    atlas.load(set).unwrap();
                }
            });
        });

        assert_eq!(atlas.epoch(), 20);
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl LoadObserver for Recorder {
        fn on_build_start(&mut self, geometries: &GeometrySet) {
            self.events.push(format!("start {}", geometries.len()));
        }

        fn on_build_failed(&mut self, error: &AtlasError) {
            self.events.push(format!("failed {error}"));
        }

        fn on_published(&mut self, generation: &Generation) {
            self.events.push(format!("published {}", generation.epoch()));
        }
    }

    #[test]
    fn observer_sees_load_events() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        let mut rec = Recorder::default();
        atlas.load_with(diagonal_points(), &mut rec).unwrap();
        atlas.load_with(small_town(), &mut rec).unwrap();
        assert_eq!(rec.events, vec!["start 5", "published 1", "start 4", "published 2"]);
    }
}

// ── Stats ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stats {
    use ra_core::{AtlasConfig, GeometryKind};

    use super::small_town;
    use crate::Atlas;

    #[test]
    fn stats_reflect_generation() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        let stats = atlas.load(small_town()).unwrap().stats();

        assert_eq!(stats.epoch, 1);
        assert_eq!(stats.geometries, 4);
        assert_eq!(stats.kind_counts, [1, 2, 1]);
        assert_eq!(stats.count_of(GeometryKind::Polygon), 1);
        assert_eq!(stats.index_entries, 4);
        assert_eq!(stats.tree_height, 1);
        assert_eq!(stats.index_nodes, 1);
        assert_eq!(stats.graph_nodes, 4);
        assert_eq!(stats.graph_edges, 3);
        assert_eq!(stats.average_degree, 1.5);
    }

    #[test]
    fn display_is_one_line() {
        let atlas = Atlas::new(AtlasConfig::default()).unwrap();
        let text = atlas.load(small_town()).unwrap().stats().to_string();

        assert!(!text.contains('\n'));
        assert!(text.starts_with("epoch 1: 4 geometries (1 Point, 2 LineString, 1 Polygon)"));
        assert!(text.contains("index height 1 with 1 nodes"));
        assert!(text.contains("graph 4 nodes / 3 edges (avg degree 1.50)"));
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;
    use ra_core::{AtlasConfig, BoundingBox, Geometry, GeometrySet, Point};

    use crate::Atlas;

    proptest! {
        #[test]
        fn range_matches_brute_force(
            coords in proptest::collection::vec((-50.0..50.0f64, -50.0..50.0f64), 0..80),
            (qx, qy, w, h) in (-60.0..60.0f64, -60.0..60.0f64, 0.0..40.0f64, 0.0..40.0f64),
        ) {
            let set: GeometrySet = coords
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| Geometry::point(Point::new(x, y), i as i64).unwrap())
                .collect();
            let atlas = Atlas::new(AtlasConfig::default()).unwrap();
            let g = atlas.load(set).unwrap();

            let query = BoundingBox::new(qx, qy, qx + w, qy + h);
            let mut got: Vec<i64> = g.range_search(&query).iter().map(|r| r.id()).collect();
            got.sort_unstable();
            let want: Vec<i64> = g
                .geometries()
                .geometries()
                .iter()
                .filter(|r| r.bbox().intersects(&query))
                .map(|r| r.id())
                .collect();
            prop_assert_eq!(got, want);
        }
    }
}
