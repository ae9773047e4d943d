//! Synthetic town generator.
//!
//! A `side × side` lattice of intersections, each nudged by up to `jitter`
//! in x and y.  Every row and column of intersections becomes one street
//! (a LineString through the shared vertices, so streets meet exactly).
//! Each block gets a shop (Point) and, with probability one half, a
//! building footprint (Polygon).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use ra_core::{CoreResult, Geometry, GeometrySet, Point};

pub struct TownPlan {
    pub side:    usize,
    pub spacing: f64,
    pub jitter:  f64,
    pub seed:    u64,
}

impl TownPlan {
    /// Corner-to-corner extent of the lattice, ignoring jitter.
    pub fn extent(&self) -> f64 {
        (self.side - 1) as f64 * self.spacing
    }
}

pub fn build_town(plan: &TownPlan) -> CoreResult<GeometrySet> {
    let mut rng = SmallRng::seed_from_u64(plan.seed);
    let n = plan.side;

    let mut crossings = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            let dx = rng.gen_range(-plan.jitter..=plan.jitter);
            let dy = rng.gen_range(-plan.jitter..=plan.jitter);
            crossings.push(Point::new(i as f64 * plan.spacing + dx, j as f64 * plan.spacing + dy));
        }
    }
    let at = |i: usize, j: usize| crossings[j * n + i];

    let mut set = GeometrySet::with_capacity(2 * n + 2 * n * n);
    let mut next_id = 0i64;
    let mut id = || {
        next_id += 1;
        next_id
    };

    // Streets.
    for j in 0..n {
        set.push(Geometry::line_string((0..n).map(|i| at(i, j)).collect(), id())?);
    }
    for i in 0..n {
        set.push(Geometry::line_string((0..n).map(|j| at(i, j)).collect(), id())?);
    }

    // Block contents.
    let half = plan.spacing / 2.0;
    for j in 0..n.saturating_sub(1) {
        for i in 0..n.saturating_sub(1) {
            let centre = Point::new(i as f64 * plan.spacing + half, j as f64 * plan.spacing + half);
            let shop = Point::new(
                centre.x + rng.gen_range(-0.3..0.3) * plan.spacing,
                centre.y + rng.gen_range(-0.3..0.3) * plan.spacing,
            );
            set.push(Geometry::point(shop, id())?);

            if rng.gen_bool(0.5) {
                let w = rng.gen_range(0.1..0.25) * plan.spacing;
                let ring = vec![
                    Point::new(centre.x - w, centre.y - w),
                    Point::new(centre.x + w, centre.y - w),
                    Point::new(centre.x + w, centre.y + w),
                    Point::new(centre.x - w, centre.y + w),
                ];
                set.push(Geometry::polygon(ring, id())?);
            }
        }
    }
    Ok(set)
}
