//! Unit tests for ra-index.
//!
//! Fixtures are hand-built geometry sets; the property tests at the bottom
//! check queries against brute-force scans over the same set.

#[cfg(test)]
mod helpers {
    use ra_core::{Geometry, GeometrySet, Point};

    use crate::SpatialIndex;

    /// Points on the diagonal: (0,0), (1,1), … (n-1,n-1).
    pub fn diagonal(n: usize) -> GeometrySet {
        (0..n)
            .map(|i| Geometry::point(Point::new(i as f64, i as f64), i as i64).unwrap())
            .collect()
    }

    /// A deterministic scatter of points, short lines and triangles.
    pub fn scatter(n: usize) -> GeometrySet {
        (0..n)
            .map(|i| {
                let x = ((i * 7_919) % 1_000) as f64 / 10.0;
                let y = ((i * 104_729) % 1_000) as f64 / 10.0;
                match i % 3 {
                    0 => Geometry::point(Point::new(x, y), i as i64),
                    1 => Geometry::line_string(vec![Point::new(x, y), Point::new(x + 1.5, y + 0.5)], i as i64),
                    _ => Geometry::polygon(
                        vec![Point::new(x, y), Point::new(x + 2.0, y), Point::new(x + 1.0, y + 2.0)],
                        i as i64,
                    ),
                }
                .unwrap()
            })
            .collect()
    }

    pub fn indexed(set: &GeometrySet) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        index.insert_all(set);
        index
    }
}

// ── Insertion & structure ─────────────────────────────────────────────────────

#[cfg(test)]
mod insert {
    use ra_core::{BoundingBox, GeomKey, IndexConfig};

    use super::helpers::{diagonal, indexed, scatter};
    use crate::{IndexError, SpatialIndex};

    #[test]
    fn empty_index() {
        let index = SpatialIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.height(), 1);
        assert_eq!(index.node_count(), 1);
        assert_eq!(index.bounds(), None);
        assert!(index.node_boxes().is_empty());
        index.validate().unwrap();
    }

    #[test]
    fn full_leaf_does_not_split() {
        let index = indexed(&diagonal(4));
        assert_eq!(index.height(), 1);
        assert_eq!(index.node_count(), 1);
        index.validate().unwrap();
    }

    #[test]
    fn fifth_entry_splits_root_leaf() {
        let index = indexed(&diagonal(5));
        assert_eq!(index.len(), 5);
        assert_eq!(index.height(), 2);
        assert_eq!(index.node_count(), 3);
        assert_eq!(index.bounds(), Some(BoundingBox::new(0.0, 0.0, 4.0, 4.0)));
        index.validate().unwrap();
    }

    #[test]
    fn invariants_hold_after_every_insert() {
        let set = scatter(300);
        let mut index = SpatialIndex::new();
        for (key, g) in set.iter() {
            index.insert(key, g);
            index.validate().unwrap_or_else(|e| panic!("after inserting {key}: {e}"));
        }
        assert_eq!(index.len(), 300);
        assert!(index.height() >= 4, "height {}", index.height());
    }

    #[test]
    fn height_grows_one_level_at_a_time() {
        let set = scatter(200);
        let mut index = SpatialIndex::new();
        let mut last = index.height();
        for (key, g) in set.iter() {
            index.insert(key, g);
            assert!(index.height() == last || index.height() == last + 1);
            last = index.height();
        }
    }

    #[test]
    fn duplicate_boxes_are_all_kept() {
        let mut index = SpatialIndex::new();
        let b = BoundingBox::new(1.0, 1.0, 2.0, 2.0);
        for i in 0..20 {
            index.insert_box(GeomKey(i), b);
        }
        index.validate().unwrap();
        assert_eq!(index.range_search(&b).len(), 20);
    }

    #[test]
    fn wider_fanout() {
        let config = IndexConfig { max_entries: 8, min_entries: 3 };
        let set = scatter(100);
        let index = SpatialIndex::build(&set, config).unwrap();
        assert_eq!(index.config(), config);
        index.validate().unwrap();
        assert!(index.height() <= indexed(&set).height());
    }

    #[test]
    fn invalid_config_rejected() {
        let err = SpatialIndex::with_config(IndexConfig { max_entries: 1, min_entries: 1 }).unwrap_err();
        assert!(matches!(err, IndexError::Config(_)));
    }

    #[test]
    fn clear_resets() {
        let mut index = indexed(&scatter(50));
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.height(), 1);
        assert_eq!(index.node_count(), 1);
        index.validate().unwrap();
    }

    #[test]
    fn node_boxes_cover_every_node() {
        let index = indexed(&scatter(60));
        let boxes = index.node_boxes();
        assert_eq!(boxes.len(), index.node_count());
        assert_eq!(boxes[0].depth, 0);
        assert_eq!(Some(boxes[0].bbox), index.bounds());
        let deepest = boxes.iter().map(|b| b.depth).max().unwrap();
        assert_eq!(deepest + 1, index.height());
        assert!(boxes.iter().filter(|b| b.depth == deepest).all(|b| b.is_leaf));
    }
}

// ── Splitting ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod split {
    use ra_core::{BoundingBox, GeomKey, Point};

    use crate::node::Entry;
    use crate::split::{halve, quadratic_split};

    fn point_entry(i: u32, x: f64, y: f64) -> Entry<GeomKey> {
        Entry::new(GeomKey(i), BoundingBox::from_point(Point::new(x, y)))
    }

    #[test]
    fn quadratic_seeds_are_most_wasteful_pair() {
        let entries: Vec<_> = (0..5).map(|i| point_entry(i, i as f64, i as f64)).collect();
        let (kept, moved) = quadratic_split(&entries);

        let kept: Vec<_> = kept.iter().map(|e| e.item.0).collect();
        let moved: Vec<_> = moved.iter().map(|e| e.item.0).collect();
        // Seeds (0,0) and (4,4); (1,1),(2,2) grow the first group least,
        // (3,3) the second.
        assert_eq!(kept, vec![0, 1, 2]);
        assert_eq!(moved, vec![4, 3]);
    }

    #[test]
    fn expansion_tie_goes_to_smaller_group() {
        // Seeds are the point (0,0) and the unit box at x=10.  The point
        // (10.5, 0) grows neither group (it lies on the first group's line
        // and inside the second box), so it joins the group with the
        // smaller area: the first.
        let entries = vec![
            point_entry(0, 0.0, 0.0),
            Entry::new(GeomKey(1), BoundingBox::new(10.0, 0.0, 11.0, 1.0)),
            point_entry(2, 10.5, 0.0),
        ];
        let (kept, moved) = quadratic_split(&entries);
        let kept: Vec<_> = kept.iter().map(|e| e.item).collect();
        let moved: Vec<_> = moved.iter().map(|e| e.item).collect();
        assert_eq!(kept, vec![GeomKey(0), GeomKey(2)]);
        assert_eq!(moved, vec![GeomKey(1)]);
    }

    #[test]
    fn halve_keeps_first_half() {
        let mut children: Vec<_> = (0..5).map(|i| point_entry(i, 0.0, 0.0)).collect();
        let moved = halve(&mut children);
        assert_eq!(children.len(), 2);
        assert_eq!(moved.len(), 3);
        assert_eq!(moved[0].item, GeomKey(2));
    }
}

// ── Range search ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod range {
    use std::collections::BTreeSet;

    use ra_core::{BoundingBox, GeomKey, GeometrySet};

    use super::helpers::{diagonal, indexed, scatter};
    use crate::SpatialIndex;

    fn brute_force(set: &GeometrySet, query: &BoundingBox) -> BTreeSet<GeomKey> {
        set.iter().filter(|(_, g)| g.bbox().intersects(query)).map(|(k, _)| k).collect()
    }

    #[test]
    fn first_three_diagonal_points() {
        let index = indexed(&diagonal(5));
        let hits: BTreeSet<_> = index
            .range_search(&BoundingBox::new(0.0, 0.0, 2.0, 2.0))
            .into_iter()
            .collect();
        assert_eq!(hits, [GeomKey(0), GeomKey(1), GeomKey(2)].into_iter().collect());
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = SpatialIndex::new();
        assert!(index.range_search(&BoundingBox::new(-1e9, -1e9, 1e9, 1e9)).is_empty());
    }

    #[test]
    fn disjoint_query_returns_nothing() {
        let index = indexed(&scatter(100));
        assert!(index.range_search(&BoundingBox::new(500.0, 500.0, 600.0, 600.0)).is_empty());
    }

    #[test]
    fn matches_brute_force_on_windows() {
        let set = scatter(250);
        let index = indexed(&set);
        for i in 0..10 {
            for j in 0..10 {
                let (x, y) = (i as f64 * 10.0, j as f64 * 10.0);
                let query = BoundingBox::new(x, y, x + 15.0, y + 7.5);
                let hits: BTreeSet<_> = index.range_search(&query).into_iter().collect();
                assert_eq!(hits, brute_force(&set, &query), "window {query}");
            }
        }
    }

    #[test]
    fn whole_extent_returns_everything_once() {
        let set = scatter(120);
        let index = indexed(&set);
        let hits = index.range_search(&index.bounds().unwrap());
        assert_eq!(hits.len(), 120);
        let unique: BTreeSet<_> = hits.into_iter().collect();
        assert_eq!(unique.len(), 120);
    }
}

// ── k-nearest neighbours ──────────────────────────────────────────────────────

#[cfg(test)]
mod knn {
    use ra_core::{BoundingBox, GeomKey, Point};

    use super::helpers::{diagonal, indexed, scatter};
    use crate::SpatialIndex;

    #[test]
    fn nearest_first() {
        let index = indexed(&diagonal(10));
        let hits = index.knn_search(Point::new(6.2, 6.2), 3);
        assert_eq!(hits, vec![GeomKey(6), GeomKey(7), GeomKey(5)]);
    }

    #[test]
    fn zero_k_and_empty_index() {
        let index = indexed(&diagonal(10));
        assert!(index.knn_search(Point::new(0.0, 0.0), 0).is_empty());
        assert!(SpatialIndex::new().knn_search(Point::new(0.0, 0.0), 5).is_empty());
        assert!(SpatialIndex::new().knn_search_exhaustive(Point::new(0.0, 0.0), 5).is_empty());
    }

    #[test]
    fn k_beyond_population_returns_all_sorted() {
        let set = scatter(80);
        let index = indexed(&set);
        let p = Point::new(50.0, 50.0);
        let hits = index.knn_with_distances(p, 1_000);
        assert_eq!(hits.len(), 80);
        assert!(hits.windows(2).all(|w| w[0].1 <= w[1].1));
        for (key, d) in &hits {
            assert_eq!(*d, set[*key].min_distance(p));
        }
    }

    #[test]
    fn point_inside_box_has_zero_distance() {
        let mut index = SpatialIndex::new();
        index.insert_box(GeomKey(0), BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        index.insert_box(GeomKey(1), BoundingBox::new(4.0, 4.0, 4.0, 4.0));
        let hits = index.knn_with_distances(Point::new(5.0, 5.0), 2);
        assert_eq!(hits[0], (GeomKey(0), 0.0));
        assert_eq!(hits[1].0, GeomKey(1));
    }

    #[test]
    fn best_first_matches_exhaustive_with_ties() {
        // Many coincident boxes → lots of equal distances.
        let mut index = SpatialIndex::new();
        for i in 0..60u32 {
            let c = (i % 6) as f64;
            index.insert_box(GeomKey(i), BoundingBox::new(c, c, c + 1.0, c + 1.0));
        }
        for q in [Point::new(-3.0, -3.0), Point::new(2.5, 2.5), Point::new(9.0, 0.0)] {
            for k in [1, 5, 17, 60, 100] {
                assert_eq!(index.knn_search(q, k), index.knn_search_exhaustive(q, k), "q={q} k={k}");
            }
        }
    }

    #[test]
    fn best_first_matches_exhaustive_on_scatter() {
        let index = indexed(&scatter(200));
        for i in 0..20 {
            let q = Point::new(i as f64 * 5.3, 100.0 - i as f64 * 4.1);
            assert_eq!(index.knn_search(q, 12), index.knn_search_exhaustive(q, 12));
        }
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use std::collections::BTreeSet;

    use proptest::prelude::*;
    use ra_core::{BoundingBox, GeomKey, Point};

    use crate::SpatialIndex;

    fn arb_box() -> impl Strategy<Value = BoundingBox> {
        (-100.0..100.0f64, -100.0..100.0f64, 0.0..20.0f64, 0.0..20.0f64)
            .prop_map(|(x, y, w, h)| BoundingBox::new(x, y, x + w, y + h))
    }

    fn build(boxes: &[BoundingBox]) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        for (i, b) in boxes.iter().enumerate() {
            index.insert_box(GeomKey::from_index(i), *b);
        }
        index
    }

    proptest! {
        #[test]
        fn structure_is_valid(boxes in proptest::collection::vec(arb_box(), 0..150)) {
            let index = build(&boxes);
            prop_assert!(index.validate().is_ok());
            prop_assert_eq!(index.len(), boxes.len());
        }

        #[test]
        fn range_equals_brute_force(
            boxes in proptest::collection::vec(arb_box(), 0..150),
            query in arb_box(),
        ) {
            let index = build(&boxes);
            let hits: BTreeSet<_> = index.range_search(&query).into_iter().collect();
            let expected: BTreeSet<_> = boxes
                .iter()
                .enumerate()
                .filter(|(_, b)| b.intersects(&query))
                .map(|(i, _)| GeomKey::from_index(i))
                .collect();
            prop_assert_eq!(hits, expected);
        }

        #[test]
        fn knn_best_first_equals_exhaustive(
            boxes in proptest::collection::vec(arb_box(), 0..120),
            x in -150.0..150.0f64,
            y in -150.0..150.0f64,
            k in 0usize..130,
        ) {
            let index = build(&boxes);
            let p = Point::new(x, y);
            prop_assert_eq!(index.knn_search(p, k), index.knn_search_exhaustive(p, k));
        }
    }
}
