// Copyright (c) 2025 Ken Barker

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! The geometry module contains the line geometries: `PolylineOnSphere` and
//! `PolygonOnSphere`, together with `MultiPointOnSphere` and
//! `BoundingSmallCircle`.
//!
//! Consecutive points of a line geometry must not be antipodal, so that every
//! segment is a valid `GreatCircleArc`. Coincident consecutive points are
//! permitted, they form zero-length arcs.
//!
//! The interior of a polygon ring is the region of the sphere on the same side
//! of the ring as its centroid.

#![allow(clippy::suboptimal_flops)]

use crate::great_circle_arc::{maximum_distance_to_point, GreatCircleArc};
use crate::{AngularDistance, AngularExtent, GeometryError, PointOnSphere, Vector3d};
use alloc::vec::Vec;

/// A point is considered to coincide with a reference point if the dot
/// product of the points is greater than this value.
pub const COINCIDENT_POINT_COSINE: f64 = 1.0 - 1.0e-12;

/// The minimum number of points in a polyline.
pub const MIN_POLYLINE_POINTS: usize = 2;

/// The minimum number of points in a polygon ring.
pub const MIN_RING_POINTS: usize = 3;

/// A sequence of points joined by great circle arcs.
pub trait LineGeometry {
    /// The points of the line geometry.
    fn line_points(&self) -> &[PointOnSphere];

    /// Whether the last point is joined to the first, i.e. a polygon ring.
    fn is_closed(&self) -> bool;

    /// The great circle arcs between the points of the line geometry.
    fn line_arcs(&self) -> Vec<GreatCircleArc> {
        line_arcs(self.line_points(), self.is_closed()).collect()
    }
}

/// The arcs between consecutive points, including the closing arc of a ring.
pub(crate) fn line_arcs(
    points: &[PointOnSphere],
    is_closed: bool,
) -> impl Iterator<Item = GreatCircleArc> + '_ {
    let closing = points
        .last()
        .zip(points.first())
        .filter(|_| is_closed && 1 < points.len());
    points
        .windows(2)
        .map(|pair| GreatCircleArc::create_unchecked(pair[0], pair[1]))
        .chain(closing.map(|(last, first)| GreatCircleArc::create_unchecked(*last, *first)))
}

/// Check that a sequence of points forms a valid line geometry.
fn validate_line_points(
    points: &[PointOnSphere],
    required: usize,
    is_closed: bool,
) -> Result<(), GeometryError> {
    if points.len() < required {
        return Err(GeometryError::InsufficientPoints {
            required,
            actual: points.len(),
        });
    }
    for arc in line_arcs(points, is_closed) {
        GreatCircleArc::create(*arc.start_point(), *arc.end_point())?;
    }
    Ok(())
}

/// The normalised sum of the points, or the first point if they sum to zero.
/// * `points` - the points, must not be empty.
#[must_use]
pub fn calculate_centroid(points: &[PointOnSphere]) -> Option<PointOnSphere> {
    let sum = points
        .iter()
        .fold(Vector3d::zeros(), |sum, p| sum + p.position_vector());
    PointOnSphere::from_normalised(&sum).or_else(|| points.first().copied())
}

/// A small circle that bounds a geometry: a centre and an angular radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSmallCircle {
    centre: PointOnSphere,
    radius: AngularExtent,
}

impl BoundingSmallCircle {
    /// Create a `BoundingSmallCircle` from its centre and angular radius.
    #[must_use]
    pub const fn new(centre: PointOnSphere, radius: AngularExtent) -> Self {
        Self { centre, radius }
    }

    /// Create the small circle centred on `centre` that bounds the arcs of a
    /// line geometry.
    /// Note: an arc may bulge beyond its end-points, so the radius is the
    /// maximum distance from the centre to the arcs, not to the points.
    #[must_use]
    pub fn from_line_points(centre: PointOnSphere, points: &[PointOnSphere], is_closed: bool) -> Self {
        let radius = if points.len() < 2 {
            points
                .iter()
                .map(|p| AngularDistance::create_from_cosine(centre.dot(p)))
                .fold(AngularDistance::ZERO, max_distance)
        } else {
            line_arcs(points, is_closed)
                .map(|arc| maximum_distance_to_point(&centre, &arc, None).0)
                .fold(AngularDistance::ZERO, max_distance)
        };
        Self::new(centre, AngularExtent::from(radius))
    }

    /// Accessor for the centre of the small circle.
    #[must_use]
    pub const fn centre(&self) -> &PointOnSphere {
        &self.centre
    }

    /// Accessor for the angular radius of the small circle.
    #[must_use]
    pub const fn radius(&self) -> &AngularExtent {
        &self.radius
    }

    /// Whether `point` is within the small circle.
    #[must_use]
    pub fn contains(&self, point: &PointOnSphere) -> bool {
        point.is_close_to(&self.centre, &self.radius)
    }
}

fn max_distance(a: AngularDistance, b: AngularDistance) -> AngularDistance {
    if b.is_precisely_greater_than(&a) {
        b
    } else {
        a
    }
}

/// A polyline: two or more points joined by great circle arcs.
#[derive(Clone, Debug, PartialEq)]
pub struct PolylineOnSphere {
    points: Vec<PointOnSphere>,
}

impl PolylineOnSphere {
    /// Create a `PolylineOnSphere`.
    /// * `points` - the points of the polyline.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InsufficientPoints` if there are fewer than two points,
    /// or `GeometryError::AntipodalArcEndpoints` if any consecutive points are antipodal.
    pub fn new(points: Vec<PointOnSphere>) -> Result<Self, GeometryError> {
        validate_line_points(&points, MIN_POLYLINE_POINTS, false)?;
        Ok(Self { points })
    }

    /// Create a `PolylineOnSphere` from points already known to be valid,
    /// e.g. the end-points of the sub-arcs of a valid polyline.
    #[must_use]
    pub(crate) fn new_unchecked(points: Vec<PointOnSphere>) -> Self {
        debug_assert!(MIN_POLYLINE_POINTS <= points.len());
        Self { points }
    }

    /// Accessor for the vertices.
    #[must_use]
    pub fn vertices(&self) -> &[PointOnSphere] {
        &self.points
    }

    /// Accessor for the number of vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.points.len()
    }

    /// The arcs of the polyline.
    pub fn arcs(&self) -> impl Iterator<Item = GreatCircleArc> + '_ {
        line_arcs(&self.points, false)
    }

    /// The number of arcs of the polyline.
    #[must_use]
    pub fn number_of_segments(&self) -> usize {
        self.points.len() - 1
    }

    /// Accessor for the first point of the polyline.
    #[must_use]
    pub fn start_point(&self) -> &PointOnSphere {
        &self.points[0]
    }

    /// Accessor for the last point of the polyline.
    #[must_use]
    pub fn end_point(&self) -> &PointOnSphere {
        &self.points[self.points.len() - 1]
    }

    /// The normalised sum of the polyline's vertices.
    #[must_use]
    pub fn centroid(&self) -> PointOnSphere {
        calculate_centroid(&self.points).unwrap_or(self.points[0])
    }

    /// The small circle about the centroid that bounds the polyline.
    #[must_use]
    pub fn bounding_small_circle(&self) -> BoundingSmallCircle {
        BoundingSmallCircle::from_line_points(self.centroid(), &self.points, false)
    }
}

impl LineGeometry for PolylineOnSphere {
    fn line_points(&self) -> &[PointOnSphere] {
        &self.points
    }

    fn is_closed(&self) -> bool {
        false
    }
}

/// A polygon: an exterior ring and zero or more interior rings, each ring
/// of three or more points.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonOnSphere {
    exterior: Vec<PointOnSphere>,
    interiors: Vec<Vec<PointOnSphere>>,
    centroid: PointOnSphere,
    bounds: BoundingSmallCircle,
}

impl PolygonOnSphere {
    /// Create a `PolygonOnSphere` without interior rings.
    /// * `exterior` - the points of the exterior ring.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InsufficientPoints` if there are fewer than three points,
    /// or `GeometryError::AntipodalArcEndpoints` if any consecutive points are antipodal.
    pub fn new(exterior: Vec<PointOnSphere>) -> Result<Self, GeometryError> {
        Self::with_interior_rings(exterior, Vec::new())
    }

    /// Create a `PolygonOnSphere` with interior rings.
    /// * `exterior` - the points of the exterior ring.
    /// * `interiors` - the points of the interior rings.
    ///
    /// # Errors
    ///
    /// As `new`, for any of the rings.
    pub fn with_interior_rings(
        exterior: Vec<PointOnSphere>,
        interiors: Vec<Vec<PointOnSphere>>,
    ) -> Result<Self, GeometryError> {
        validate_line_points(&exterior, MIN_RING_POINTS, true)?;
        for ring in &interiors {
            validate_line_points(ring, MIN_RING_POINTS, true)?;
        }

        let centroid = calculate_centroid(&exterior).unwrap_or(exterior[0]);
        let bounds = BoundingSmallCircle::from_line_points(centroid, &exterior, true);
        Ok(Self {
            exterior,
            interiors,
            centroid,
            bounds,
        })
    }

    /// Accessor for the exterior ring.
    #[must_use]
    pub fn exterior_ring(&self) -> &[PointOnSphere] {
        &self.exterior
    }

    /// Accessor for the number of interior rings.
    #[must_use]
    pub fn number_of_interior_rings(&self) -> usize {
        self.interiors.len()
    }

    pub fn interior_rings(&self) -> impl Iterator<Item = &[PointOnSphere]> {
        self.interiors.iter().map(Vec::as_slice)
    }

    /// All of the rings: the exterior ring followed by the interior rings.
    pub fn rings(&self) -> impl Iterator<Item = &[PointOnSphere]> {
        core::iter::once(self.exterior.as_slice()).chain(self.interior_rings())
    }

    /// The vertices of the exterior ring.
    #[must_use]
    pub fn vertices(&self) -> &[PointOnSphere] {
        &self.exterior
    }

    /// The number of vertices of the exterior ring.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.exterior.len()
    }

    /// The arcs of the exterior ring, including the closing arc.
    pub fn arcs(&self) -> impl Iterator<Item = GreatCircleArc> + '_ {
        line_arcs(&self.exterior, true)
    }

    /// The normalised sum of the exterior ring's vertices.
    #[must_use]
    pub const fn centroid(&self) -> &PointOnSphere {
        &self.centroid
    }

    /// The small circle about the centroid that bounds the exterior ring.
    #[must_use]
    pub const fn bounding_small_circle(&self) -> &BoundingSmallCircle {
        &self.bounds
    }

    /// Whether `point` is inside the polygon: inside the exterior ring and
    /// not inside any interior ring.
    #[must_use]
    pub fn is_point_in_polygon(&self, point: &PointOnSphere) -> bool {
        self.bounds.contains(point)
            && is_point_in_ring(&self.exterior, &self.centroid, point)
            && !self.interiors.iter().any(|ring| {
                calculate_centroid(ring).is_some_and(|centroid| is_point_in_ring(ring, &centroid, point))
            })
    }
}

impl LineGeometry for PolygonOnSphere {
    fn line_points(&self) -> &[PointOnSphere] {
        &self.exterior
    }

    fn is_closed(&self) -> bool {
        true
    }
}

/// One or more points.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiPointOnSphere {
    points: Vec<PointOnSphere>,
}

impl MultiPointOnSphere {
    /// Create a `MultiPointOnSphere`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InsufficientPoints` if `points` is empty.
    pub fn new(points: Vec<PointOnSphere>) -> Result<Self, GeometryError> {
        if points.is_empty() {
            Err(GeometryError::InsufficientPoints {
                required: 1,
                actual: 0,
            })
        } else {
            Ok(Self { points })
        }
    }

    /// Accessor for the points.
    #[must_use]
    pub fn points(&self) -> &[PointOnSphere] {
        &self.points
    }

    /// Accessor for the number of points.
    #[must_use]
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// The normalised sum of the points.
    #[must_use]
    pub fn centroid(&self) -> PointOnSphere {
        calculate_centroid(&self.points).unwrap_or(self.points[0])
    }
}

/// A unit vector perpendicular to `v`.
fn perpendicular(v: &PointOnSphere) -> Option<PointOnSphere> {
    let axis = if libm::fabs(v.x()) < libm::fabs(v.y()) {
        Vector3d::new(1.0, 0.0, 0.0)
    } else {
        Vector3d::new(0.0, 1.0, 0.0)
    };
    PointOnSphere::from_normalised(&v.position_vector().cross(&axis))
}

/// Whether the arc p-q crosses the arc a-b.
///
/// Points on the plane of the other arc are counted as being on its positive
/// side, so that a path through a shared vertex of two edges crosses only one
/// of them.
fn arcs_cross(p: &Vector3d, q: &Vector3d, a: &Vector3d, b: &Vector3d) -> bool {
    let n = p.cross(q);
    let m = a.cross(b);
    if (n.dot(a) >= 0.0) == (n.dot(b) >= 0.0) {
        return false;
    }
    if (m.dot(p) >= 0.0) == (m.dot(q) >= 0.0) {
        return false;
    }

    // the crossing point on a-b, the antipodal point is the other crossing
    let x = n.cross(&m);
    let x = if x.dot(&(a + b)) >= 0.0 { x } else { -x };
    x.dot(&(p + q)) > 0.0
}

/// Whether `point` is inside a polygon ring with the given centroid.
///
/// Counts the crossings of the ring by a path from `point` to the antipode of
/// the centroid, which is outside the ring.
#[must_use]
pub fn is_point_in_ring(
    ring: &[PointOnSphere],
    centroid: &PointOnSphere,
    point: &PointOnSphere,
) -> bool {
    let outside = centroid.antipodal();
    if outside.dot(point) > COINCIDENT_POINT_COSINE {
        return false;
    }

    // A path from the centroid to its antipode is indeterminate, so go via a
    // point on the centroid's equator.
    let mut path = Vec::with_capacity(3);
    path.push(*point.position_vector());
    if centroid.dot(point) > COINCIDENT_POINT_COSINE {
        if let Some(via) = perpendicular(centroid) {
            path.push(*via.position_vector());
        }
    }
    path.push(*outside.position_vector());

    let crossings = path
        .windows(2)
        .map(|leg| {
            line_arcs(ring, true)
                .filter(|edge| {
                    arcs_cross(
                        &leg[0],
                        &leg[1],
                        edge.start_point().position_vector(),
                        edge.end_point().position_vector(),
                    )
                })
                .count()
        })
        .sum::<usize>();
    crossings % 2 == 1
}
