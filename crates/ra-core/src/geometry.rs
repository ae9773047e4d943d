//! Typed geometry records and the ordered collection that owns them.

use std::fmt;
use std::ops::Index;

use crate::{BoundingBox, CoreError, CoreResult, GeomKey, Point};

/// Shape tag of a [`Geometry`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeometryKind {
    Point,
    LineString,
    /// Exterior ring only; holes are dropped by the geometry source.
    Polygon,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 3] =
        [GeometryKind::Point, GeometryKind::LineString, GeometryKind::Polygon];

    pub fn as_str(self) -> &'static str {
        match self {
            GeometryKind::Point      => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon    => "Polygon",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// A single geometry record.
///
/// The bounding box is computed once in [`Geometry::new`] and fields are only
/// readable afterwards, so the box can never drift from the vertices.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Geometry {
    id:     i64,
    kind:   GeometryKind,
    points: Vec<Point>,
    bbox:   BoundingBox,
}

impl Geometry {
    /// Validate the vertices and compute the bounding box.
    ///
    /// `id` is the source's own identifier and need not be unique.
    pub fn new(kind: GeometryKind, points: Vec<Point>, id: i64) -> CoreResult<Self> {
        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(CoreError::NonFiniteCoordinate { id, x: p.x, y: p.y });
        }
        let bbox = BoundingBox::enclosing(points.iter().copied())
            .ok_or(CoreError::EmptyGeometry { id })?;
        Ok(Self { id, kind, points, bbox })
    }

    pub fn point(p: Point, id: i64) -> CoreResult<Self> {
        Self::new(GeometryKind::Point, vec![p], id)
    }

    pub fn line_string(points: Vec<Point>, id: i64) -> CoreResult<Self> {
        Self::new(GeometryKind::LineString, points, id)
    }

    pub fn polygon(ring: Vec<Point>, id: i64) -> CoreResult<Self> {
        Self::new(GeometryKind::Polygon, ring, id)
    }

    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Distance from `p` to this record's bounding box (not its exact shape).
    #[inline]
    pub fn min_distance(&self, p: Point) -> f64 {
        self.bbox.min_distance(p)
    }
}

// ── GeometrySet ───────────────────────────────────────────────────────────────

/// Ordered, append-only collection of geometry records.
///
/// This is what the external geometry source hands over.  Records are
/// addressed by [`GeomKey`] (their position), which is what the spatial
/// index stores.
#[derive(Clone, Debug, Default)]
pub struct GeometrySet {
    records: Vec<Geometry>,
}

impl GeometrySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self { records: Vec::with_capacity(n) }
    }

    /// Append a record and return its key.
    pub fn push(&mut self, geometry: Geometry) -> GeomKey {
        let key = GeomKey::from_index(self.records.len());
        self.records.push(geometry);
        key
    }

    pub fn get(&self, key: GeomKey) -> Option<&Geometry> {
        self.records.get(key.index())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(key, record)` pairs in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (GeomKey, &Geometry)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, g)| (GeomKey::from_index(i), g))
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.records
    }

    /// Number of records of each kind, in [`GeometryKind::ALL`] order.
    pub fn kind_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for g in &self.records {
            let slot = match g.kind {
                GeometryKind::Point      => 0,
                GeometryKind::LineString => 1,
                GeometryKind::Polygon    => 2,
            };
            counts[slot] += 1;
        }
        counts
    }

    /// Bounding box of the whole collection.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut it = self.records.iter();
        let mut bbox = it.next()?.bbox;
        for g in it {
            bbox.expand(&g.bbox);
        }
        Some(bbox)
    }
}

impl Index<GeomKey> for GeometrySet {
    type Output = Geometry;

    fn index(&self, key: GeomKey) -> &Geometry {
        &self.records[key.index()]
    }
}

impl FromIterator<Geometry> for GeometrySet {
    fn from_iter<I: IntoIterator<Item = Geometry>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}

impl Extend<Geometry> for GeometrySet {
    fn extend<I: IntoIterator<Item = Geometry>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}
