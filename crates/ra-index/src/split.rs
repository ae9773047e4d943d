//! Node splitting.
//!
//! Leaves use Guttman's quadratic split.  Internal nodes are cut in half by
//! position, which is cheaper but gives a less balanced tree.

use ra_core::BoundingBox;

use crate::node::Entry;

/// Split an overflowing leaf's entries into two groups.
///
/// Seeds are the pair whose covering box wastes the most area.  Every other
/// entry, in order, joins the group whose box grows least; ties go to the
/// group with the smaller area, then to the second group.
///
/// Returns `(kept, moved)`; neither is empty.
pub(crate) fn quadratic_split<T: Copy>(entries: &[Entry<T>]) -> (Vec<Entry<T>>, Vec<Entry<T>>) {
    debug_assert!(entries.len() >= 2, "split needs at least two entries");

    let (s1, s2) = pick_seeds(entries);

    let mut kept  = vec![entries[s1]];
    let mut moved = vec![entries[s2]];
    let mut box1  = entries[s1].bbox;
    let mut box2  = entries[s2].bbox;

    for (i, e) in entries.iter().enumerate() {
        if i == s1 || i == s2 {
            continue;
        }
        let exp1 = box1.expansion_area(&e.bbox);
        let exp2 = box2.expansion_area(&e.bbox);

        let to_first = if exp1 < exp2 {
            true
        } else if exp2 < exp1 {
            false
        } else {
            box1.area() < box2.area()
        };

        if to_first {
            kept.push(*e);
            box1.expand(&e.bbox);
        } else {
            moved.push(*e);
            box2.expand(&e.bbox);
        }
    }

    (kept, moved)
}

/// Indices of the most wasteful pair; the first such pair in scan order.
fn pick_seeds<T>(entries: &[Entry<T>]) -> (usize, usize) {
    let mut best = (0, 1);
    let mut max_waste = f64::NEG_INFINITY;

    for i in 0..entries.len() {
        for j in i + 1..entries.len() {
            let waste = waste(&entries[i].bbox, &entries[j].bbox);
            if waste > max_waste {
                max_waste = waste;
                best = (i, j);
            }
        }
    }
    best
}

#[inline]
fn waste(a: &BoundingBox, b: &BoundingBox) -> f64 {
    a.union(b).area() - a.area() - b.area()
}

/// Positional split for internal nodes: the first `len / 2` children stay,
/// the rest move to the new sibling.
pub(crate) fn halve<T>(children: &mut Vec<Entry<T>>) -> Vec<Entry<T>> {
    let mid = children.len() / 2;
    children.split_off(mid)
}
