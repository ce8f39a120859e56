//! GeoJSON-compatible parcel geometry
//!
//! Claims carry their parcel boundary as a GeoJSON `Point` or `Polygon`.
//! Overlap screening works on planar coordinates: at parcel scale the
//! curvature error is far below the conflict thresholds, so all area and
//! intersection math here uses the shoelace formula and polygon clipping
//! directly on longitude/latitude values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating parcel geometry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Polygon must have at least one ring")]
    EmptyPolygon,

    #[error("Polygon ring must have at least 4 positions, got {0}")]
    RingTooShort(usize),

    #[error("Polygon ring must be closed (first and last positions equal)")]
    OpenRing,

    #[error("Coordinate out of range: {axis} = {value}")]
    CoordinateOutOfRange { axis: &'static str, value: f64 },
}

/// A single longitude/latitude position
///
/// Serializes as a two-element array `[lon, lat]`, matching the GeoJSON
/// position encoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoPoint([f64; 2]);

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self([lon, lat])
    }

    pub fn lon(&self) -> f64 {
        self.0[0]
    }

    pub fn lat(&self) -> f64 {
        self.0[1]
    }
}

/// Axis-aligned bounding box used to prefilter overlap candidates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    fn of(point: GeoPoint) -> Self {
        Self {
            min_lon: point.lon(),
            min_lat: point.lat(),
            max_lon: point.lon(),
            max_lat: point.lat(),
        }
    }

    fn extend(&mut self, point: GeoPoint) {
        self.min_lon = self.min_lon.min(point.lon());
        self.min_lat = self.min_lat.min(point.lat());
        self.max_lon = self.max_lon.max(point.lon());
        self.max_lat = self.max_lat.max(point.lat());
    }

    /// Returns true if the two boxes share any area or edge
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }
}

/// Parcel geometry in GeoJSON form
///
/// Serializes to the standard GeoJSON object shape, e.g.
/// `{"type": "Polygon", "coordinates": [[[lon, lat], ...]]}`. Only the two
/// geometry types that appear on land-rights claims are supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(GeoPoint),
    Polygon(Vec<Vec<GeoPoint>>),
}

impl Geometry {
    /// Creates a point geometry
    pub fn point(lon: f64, lat: f64) -> Self {
        Geometry::Point(GeoPoint::new(lon, lat))
    }

    /// Creates a polygon with a single exterior ring
    pub fn polygon(exterior: Vec<GeoPoint>) -> Self {
        Geometry::Polygon(vec![exterior])
    }

    /// Checks GeoJSON structural rules: closed rings with at least four
    /// positions, all coordinates within valid longitude/latitude ranges.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Geometry::Point(p) => validate_position(*p),
            Geometry::Polygon(rings) => {
                if rings.is_empty() {
                    return Err(GeometryError::EmptyPolygon);
                }
                for ring in rings {
                    if ring.len() < 4 {
                        return Err(GeometryError::RingTooShort(ring.len()));
                    }
                    if ring.first() != ring.last() {
                        return Err(GeometryError::OpenRing);
                    }
                    for p in ring {
                        validate_position(*p)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Planar area via the shoelace formula, holes subtracted
    ///
    /// Points have zero area. The value is in squared coordinate units; it
    /// is only ever used in ratios, so the unit cancels out.
    pub fn area(&self) -> f64 {
        match self {
            Geometry::Point(_) => 0.0,
            Geometry::Polygon(rings) => match rings.split_first() {
                Some((exterior, holes)) => {
                    let outer = signed_ring_area(open_ring(exterior)).abs();
                    let inner: f64 = holes
                        .iter()
                        .map(|ring| signed_ring_area(open_ring(ring)).abs())
                        .sum();
                    (outer - inner).max(0.0)
                }
                None => 0.0,
            },
        }
    }

    /// Area-weighted centroid of the exterior ring
    ///
    /// Returns `None` for an empty polygon. Degenerate (zero-area) rings
    /// fall back to the vertex mean.
    pub fn centroid(&self) -> Option<GeoPoint> {
        match self {
            Geometry::Point(p) => Some(*p),
            Geometry::Polygon(rings) => {
                let pts = open_ring(rings.first()?);
                if pts.is_empty() {
                    return None;
                }
                let area = signed_ring_area(pts);
                if area.abs() < f64::EPSILON {
                    let n = pts.len() as f64;
                    let (sx, sy) = pts
                        .iter()
                        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.lon(), sy + p.lat()));
                    return Some(GeoPoint::new(sx / n, sy / n));
                }
                let mut cx = 0.0;
                let mut cy = 0.0;
                let n = pts.len();
                for i in 0..n {
                    let p = pts[i];
                    let q = pts[(i + 1) % n];
                    let cross = p.lon() * q.lat() - q.lon() * p.lat();
                    cx += (p.lon() + q.lon()) * cross;
                    cy += (p.lat() + q.lat()) * cross;
                }
                Some(GeoPoint::new(cx / (6.0 * area), cy / (6.0 * area)))
            }
        }
    }

    /// Bounding box over the exterior ring (or the point itself)
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Geometry::Point(p) => Some(BoundingBox::of(*p)),
            Geometry::Polygon(rings) => {
                let exterior = rings.first()?;
                let mut points = exterior.iter();
                let mut bbox = BoundingBox::of(*points.next()?);
                for p in points {
                    bbox.extend(*p);
                }
                Some(bbox)
            }
        }
    }

    /// Ray-cast point-in-polygon test against the exterior ring, excluding
    /// holes. Point geometries contain nothing.
    pub fn contains(&self, point: GeoPoint) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::Polygon(rings) => match rings.split_first() {
                Some((exterior, holes)) => {
                    point_in_ring(point, open_ring(exterior))
                        && !holes.iter().any(|h| point_in_ring(point, open_ring(h)))
                }
                None => false,
            },
        }
    }

    /// Planar intersection area of two polygon exteriors
    ///
    /// Uses Sutherland-Hodgman clipping; the clip ring is treated as convex,
    /// so strongly concave parcels degrade to an approximation. Any pairing
    /// involving a point has zero area.
    pub fn intersection_area(&self, other: &Geometry) -> f64 {
        let subject = match self.exterior() {
            Some(ring) => normalized_ccw(ring),
            None => return 0.0,
        };
        let clip = match other.exterior() {
            Some(ring) => normalized_ccw(ring),
            None => return 0.0,
        };
        if subject.len() < 3 || clip.len() < 3 {
            return 0.0;
        }
        let clipped = clip_ring(&subject, &clip);
        if clipped.len() < 3 {
            0.0
        } else {
            signed_ring_area(&clipped).abs()
        }
    }

    /// Fraction of `other`'s area that `self` covers, in `[0, 1]`
    ///
    /// A point inside a polygon counts as full overlap in either direction;
    /// two points never overlap.
    pub fn overlap_ratio(&self, other: &Geometry) -> f64 {
        match (self, other) {
            (Geometry::Point(_), Geometry::Point(_)) => 0.0,
            (Geometry::Point(p), Geometry::Polygon(_)) => {
                if other.contains(*p) {
                    1.0
                } else {
                    0.0
                }
            }
            (Geometry::Polygon(_), Geometry::Point(q)) => {
                if self.contains(*q) {
                    1.0
                } else {
                    0.0
                }
            }
            (Geometry::Polygon(_), Geometry::Polygon(_)) => {
                let denominator = other.area();
                if denominator <= f64::EPSILON {
                    return 0.0;
                }
                (self.intersection_area(other) / denominator).min(1.0)
            }
        }
    }

    fn exterior(&self) -> Option<&[GeoPoint]> {
        match self {
            Geometry::Point(_) => None,
            Geometry::Polygon(rings) => rings.first().map(|r| r.as_slice()),
        }
    }
}

fn validate_position(p: GeoPoint) -> Result<(), GeometryError> {
    if !p.lon().is_finite() || p.lon() < -180.0 || p.lon() > 180.0 {
        return Err(GeometryError::CoordinateOutOfRange {
            axis: "longitude",
            value: p.lon(),
        });
    }
    if !p.lat().is_finite() || p.lat() < -90.0 || p.lat() > 90.0 {
        return Err(GeometryError::CoordinateOutOfRange {
            axis: "latitude",
            value: p.lat(),
        });
    }
    Ok(())
}

/// Drops the closing duplicate position if the ring carries one
fn open_ring(ring: &[GeoPoint]) -> &[GeoPoint] {
    if ring.len() >= 2 && ring.first() == ring.last() {
        &ring[..ring.len() - 1]
    } else {
        ring
    }
}

/// Signed shoelace area of an open ring (positive when counter-clockwise)
fn signed_ring_area(ring: &[GeoPoint]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        sum += p.lon() * q.lat() - q.lon() * p.lat();
    }
    sum / 2.0
}

/// Opens the ring and reverses it if it winds clockwise
fn normalized_ccw(ring: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut pts = open_ring(ring).to_vec();
    if signed_ring_area(&pts) < 0.0 {
        pts.reverse();
    }
    pts
}

/// Standard even-odd ray cast against an open ring
fn point_in_ring(point: GeoPoint, ring: &[GeoPoint]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let (px, py) = (point.lon(), point.lat());
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].lon(), ring[i].lat());
        let (xj, yj) = (ring[j].lon(), ring[j].lat());
        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// True when `p` is on or left of the directed edge `a -> b`
fn is_left(a: GeoPoint, b: GeoPoint, p: GeoPoint) -> bool {
    (b.lon() - a.lon()) * (p.lat() - a.lat()) - (b.lat() - a.lat()) * (p.lon() - a.lon()) >= 0.0
}

/// Intersection of the segment `p1 -> p2` with the infinite line through
/// `a -> b`, or `None` when they are parallel
fn edge_intersection(p1: GeoPoint, p2: GeoPoint, a: GeoPoint, b: GeoPoint) -> Option<GeoPoint> {
    let a1 = p2.lat() - p1.lat();
    let b1 = p1.lon() - p2.lon();
    let c1 = a1 * p1.lon() + b1 * p1.lat();
    let a2 = b.lat() - a.lat();
    let b2 = a.lon() - b.lon();
    let c2 = a2 * a.lon() + b2 * a.lat();
    let det = a1 * b2 - a2 * b1;
    if det.abs() < f64::EPSILON {
        None
    } else {
        Some(GeoPoint::new(
            (b2 * c1 - b1 * c2) / det,
            (a1 * c2 - a2 * c1) / det,
        ))
    }
}

/// Sutherland-Hodgman clip of `subject` against each edge of `clip`
///
/// Both rings must be open and wound counter-clockwise.
fn clip_ring(subject: &[GeoPoint], clip: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut output: Vec<GeoPoint> = subject.to_vec();
    let n = clip.len();
    for i in 0..n {
        let a = clip[i];
        let b = clip[(i + 1) % n];
        let input = std::mem::take(&mut output);
        if input.is_empty() {
            break;
        }
        let m = input.len();
        for j in 0..m {
            let current = input[j];
            let previous = input[(j + m - 1) % m];
            let current_inside = is_left(a, b, current);
            let previous_inside = is_left(a, b, previous);
            if current_inside {
                if !previous_inside {
                    if let Some(p) = edge_intersection(previous, current, a, b) {
                        output.push(p);
                    }
                }
                output.push(current);
            } else if previous_inside {
                if let Some(p) = edge_intersection(previous, current, a, b) {
                    output.push(p);
                }
            }
        }
    }
    output
}
