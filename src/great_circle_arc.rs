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

//! The great_circle_arc module contains the `GreatCircleArc` type and the
//! free functions that operate on arcs: `intersect`, the minimum and maximum
//! distance functions and `tessellate`.
//!
//! An arc's rotation axis is the unit vector: start × end / |start × end|.
//! A point `q` on the arc's great circle lies within the arc when it is inside
//! the arc's "lune", i.e. when:
//!
//! (start × q) · axis >= 0 and (q × end) · axis >= 0
//!
//! Since arcs are always shorter than π, the lune test is unambiguous.

#![allow(clippy::suboptimal_flops)]

use crate::{Angle, AngularDistance, AngularExtent, GeometryError, PointOnSphere, Radians, Vector3d};
use alloc::vec::Vec;
use core::cell::OnceCell;
use unit_sphere::vector;

/// The end-points of an arc are considered antipodal if their dot product is
/// less than or equal to -1 plus this value.
pub const ANTIPODAL_EPSILON: f64 = 1.0e-12;

/// An arc is zero-length if the square of the magnitude of the cross product
/// of its end-points is less than this value.
pub const ZERO_LENGTH_SQ_NORM: f64 = 1.0e-24;

/// The tolerance of the half-space and lune tests.
pub const INTERSECTION_EPSILON: f64 = 1.0e-12;

/// The cosine of the angle within which a point is considered to lie on an arc.
pub const POINT_ON_ARC_COSINE: f64 = 1.0 - 1.0e-12;

/// A great circle arc on the surface of the unit sphere.
///
/// The rotation axis and arc length are calculated on first use and cached
/// for the lifetime of the arc.
#[derive(Clone, Debug)]
pub struct GreatCircleArc {
    start: PointOnSphere,
    end: PointOnSphere,
    dot_of_endpoints: f64,
    /// The unit rotation axis, None if the arc is zero-length.
    rotation_axis: OnceCell<Option<PointOnSphere>>,
    arc_length: OnceCell<Radians>,
}

impl PartialEq for GreatCircleArc {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl GreatCircleArc {
    /// Create a `GreatCircleArc` between two points.
    /// * `start` - the start point.
    /// * `end` - the end point.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::AntipodalArcEndpoints` if the points are antipodal,
    /// since the arc between them is not unique.
    pub fn create(start: PointOnSphere, end: PointOnSphere) -> Result<Self, GeometryError> {
        let arc = Self::create_unchecked(start, end);
        if arc.dot_of_endpoints <= -1.0 + ANTIPODAL_EPSILON {
            Err(GeometryError::AntipodalArcEndpoints { start, end })
        } else {
            Ok(arc)
        }
    }

    /// Create a `GreatCircleArc` without checking whether the points are antipodal.
    ///
    /// The caller must ensure that the points are not antipodal, e.g. because
    /// they are consecutive vertices of a validated polyline.
    #[must_use]
    pub fn create_unchecked(start: PointOnSphere, end: PointOnSphere) -> Self {
        Self {
            start,
            end,
            dot_of_endpoints: start.dot(&end),
            rotation_axis: OnceCell::new(),
            arc_length: OnceCell::new(),
        }
    }

    /// Accessor for the start point of the arc.
    #[must_use]
    pub const fn start_point(&self) -> &PointOnSphere {
        &self.start
    }

    /// Accessor for the end point of the arc.
    #[must_use]
    pub const fn end_point(&self) -> &PointOnSphere {
        &self.end
    }

    /// The dot product of the end-points, i.e. the cosine of the arc length.
    #[must_use]
    pub const fn dot_of_endpoints(&self) -> f64 {
        self.dot_of_endpoints
    }

    fn rotation_info(&self) -> Option<PointOnSphere> {
        *self.rotation_axis.get_or_init(|| {
            let cross = self
                .start
                .position_vector()
                .cross(self.end.position_vector());
            if cross.norm_squared() < ZERO_LENGTH_SQ_NORM {
                None
            } else {
                vector::normalise(&cross).map(PointOnSphere::new_unchecked)
            }
        })
    }

    /// Whether the arc is zero-length, i.e. its end-points coincide.
    #[must_use]
    pub fn is_zero_length(&self) -> bool {
        self.rotation_info().is_none()
    }

    /// The unit rotation axis of the arc.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::IndeterminateArcRotationAxis` if the arc is zero-length.
    pub fn rotation_axis(&self) -> Result<PointOnSphere, GeometryError> {
        self.rotation_info()
            .ok_or(GeometryError::IndeterminateArcRotationAxis {
                start: self.start,
                end: self.end,
            })
    }

    /// The length of the arc in radians.
    #[must_use]
    pub fn arc_length(&self) -> Radians {
        *self.arc_length.get_or_init(|| {
            let cross = self
                .start
                .position_vector()
                .cross(self.end.position_vector());
            Radians(libm::atan2(
                libm::sqrt(cross.norm_squared()),
                self.dot_of_endpoints,
            ))
        })
    }

    /// The point at fraction `t` of the arc length along the arc.
    /// Values of `t` outside [0, 1] extrapolate along the arc's great circle.
    /// * `t` - the fraction of the arc length.
    ///
    /// returns the start point if the arc is zero-length.
    #[must_use]
    pub fn point_on_arc(&self, t: f64) -> PointOnSphere {
        self.rotation_info().map_or(self.start, |axis| {
            let start = self.start.position_vector();
            let direction = vector::direction(start, axis.position_vector());
            let distance = Angle::from(Radians(t * self.arc_length().0));
            PointOnSphere::new_unchecked(vector::position(start, &direction, distance))
        })
    }

    /// The unit direction vector of the arc at fraction `t` of the arc length.
    /// * `t` - the fraction of the arc length.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::IndeterminateArcRotationAxis` if the arc is zero-length.
    pub fn direction_on_arc(&self, t: f64) -> Result<Vector3d, GeometryError> {
        let axis = self.rotation_axis()?;
        let point = self.point_on_arc(t);
        Ok(vector::direction(point.position_vector(), axis.position_vector()))
    }

    /// The arc in the opposite direction.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self::create_unchecked(self.end, self.start)
    }

    /// The arc on the opposite side of the sphere.
    #[must_use]
    pub fn antipodal(&self) -> Self {
        Self::create_unchecked(self.start.antipodal(), self.end.antipodal())
    }

    /// The point halfway along the arc.
    #[must_use]
    pub fn midpoint(&self) -> PointOnSphere {
        self.rotation_info().map_or(self.start, |_| {
            PointOnSphere::from_normalised(
                &(self.start.position_vector() + self.end.position_vector()),
            )
            .unwrap_or(self.start)
        })
    }

    /// Whether a point on the arc's great circle lies within the arc.
    fn is_in_lune(&self, axis: &PointOnSphere, point: &PointOnSphere) -> bool {
        let axis = axis.position_vector();
        let point = point.position_vector();
        self.start.position_vector().cross(point).dot(axis) >= -INTERSECTION_EPSILON
            && point.cross(self.end.position_vector()).dot(axis) >= -INTERSECTION_EPSILON
    }

    /// The closest point on the arc to `point` and the cosine of the angle
    /// between them.
    fn closest_feature(&self, point: &PointOnSphere) -> (PointOnSphere, f64) {
        let start_dot = point.dot(&self.start);
        let Some(axis) = self.rotation_info() else {
            return (self.start, start_dot);
        };

        let v = point.position_vector();
        let projection = v - axis.position_vector() * axis.dot(point);
        if let Some(projected) = PointOnSphere::from_normalised(&projection) {
            if self.is_in_lune(&axis, &projected) {
                return (projected, point.dot(&projected));
            }
        }

        let end_dot = point.dot(&self.end);
        if start_dot >= end_dot {
            (self.start, start_dot)
        } else {
            (self.end, end_dot)
        }
    }

    /// Find the closest point on the arc to `point`, if it is within `threshold`.
    /// * `point` - the point to test.
    /// * `threshold` - the maximum angle from the arc.
    ///
    /// returns the closest point on the arc and its distance from `point`,
    /// or None if `point` is further than `threshold` from the arc.
    #[must_use]
    pub fn is_close_to(
        &self,
        point: &PointOnSphere,
        threshold: &AngularExtent,
    ) -> Option<(PointOnSphere, AngularDistance)> {
        // The angle from the great circle is asin(|axis . point|), a lower bound
        // of the distance from the arc.
        if threshold.get_cosine() >= 0.0 {
            if let Some(axis) = self.rotation_info() {
                if libm::fabs(axis.dot(point)) > threshold.get_sine() {
                    return None;
                }
            }
        }

        let (closest, cosine) = self.closest_feature(point);
        (cosine >= threshold.get_cosine())
            .then(|| (closest, AngularDistance::create_from_cosine(cosine)))
    }

    /// Whether `point` lies on the arc, within `threshold`.
    #[must_use]
    pub fn is_point_on_arc(&self, point: &PointOnSphere, threshold: &AngularExtent) -> bool {
        self.is_close_to(point, threshold).is_some()
    }
}

/// The `AngularExtent` within which points are considered to lie on an arc.
#[must_use]
pub fn point_on_arc_threshold() -> AngularExtent {
    AngularExtent::create_from_cosine(POINT_ON_ARC_COSINE)
}

/// The two antipodal points where the great circles of two arcs cross.
/// * `arc1`, `arc2` - the arcs.
///
/// # Errors
///
/// Returns `GeometryError::IndeterminateGreatCircleIntersection` if either arc is
/// zero-length or the arcs lie on the same great circle.
pub fn great_circle_intersection(
    arc1: &GreatCircleArc,
    arc2: &GreatCircleArc,
) -> Result<(PointOnSphere, PointOnSphere), GeometryError> {
    let (Some(axis1), Some(axis2)) = (arc1.rotation_info(), arc2.rotation_info()) else {
        return Err(GeometryError::IndeterminateGreatCircleIntersection);
    };
    vector::intersection::calculate_intersection_point(axis1.position_vector(), axis2.position_vector())
        .map(|point| {
            let point = PointOnSphere::new_unchecked(point);
            (point, point.antipodal())
        })
        .ok_or(GeometryError::IndeterminateGreatCircleIntersection)
}

/// Whether the end-points of an arc are on opposite sides of (or on) a plane.
fn straddles_plane(axis: &PointOnSphere, arc: &GreatCircleArc) -> bool {
    let start = axis.dot(arc.start_point());
    let end = axis.dot(arc.end_point());
    !((start > INTERSECTION_EPSILON && end > INTERSECTION_EPSILON)
        || (start < -INTERSECTION_EPSILON && end < -INTERSECTION_EPSILON))
}

/// Find the point of intersection of two arcs on the same great circle:
/// one of the arcs' end-points that lies on the other arc.
fn intersect_on_same_great_circle(
    arc1: &GreatCircleArc,
    arc2: &GreatCircleArc,
    threshold: &AngularExtent,
) -> Option<PointOnSphere> {
    [
        (arc1.start, arc2),
        (arc1.end, arc2),
        (arc2.start, arc1),
        (arc2.end, arc1),
    ]
    .into_iter()
    .find(|(point, arc)| arc.is_point_on_arc(point, threshold))
    .map(|(point, _)| point)
}

/// Determine whether two arcs intersect.
/// * `arc1`, `arc2` - the arcs.
///
/// returns the point of intersection, or None if the arcs do not intersect.
/// If the arcs lie on the same great circle and overlap, one of the
/// end-points in the overlap is returned.
#[must_use]
pub fn intersect(arc1: &GreatCircleArc, arc2: &GreatCircleArc) -> Option<PointOnSphere> {
    let threshold = point_on_arc_threshold();
    match (arc1.rotation_info(), arc2.rotation_info()) {
        (None, None) => arc1
            .start
            .is_close_to(&arc2.start, &threshold)
            .then_some(arc1.start),
        (None, Some(_)) => arc2
            .is_point_on_arc(&arc1.start, &threshold)
            .then_some(arc1.start),
        (Some(_), None) => arc1
            .is_point_on_arc(&arc2.start, &threshold)
            .then_some(arc2.start),
        (Some(axis1), Some(axis2)) => {
            if !straddles_plane(&axis1, arc2) || !straddles_plane(&axis2, arc1) {
                return None;
            }

            match great_circle_intersection(arc1, arc2) {
                Ok((point, antipode)) => [point, antipode]
                    .into_iter()
                    .find(|p| arc1.is_in_lune(&axis1, p) && arc2.is_in_lune(&axis2, p)),
                Err(_) => intersect_on_same_great_circle(arc1, arc2, &threshold),
            }
        }
    }
}

/// The minimum distance between a point and an arc.
/// * `point` - the point.
/// * `arc` - the arc.
/// * `threshold` - an optional maximum distance.
///
/// returns the minimum distance and the closest point on the arc, or
/// `AngularDistance::PI` and None if the distance exceeds `threshold`.
#[must_use]
pub fn minimum_distance_to_point(
    point: &PointOnSphere,
    arc: &GreatCircleArc,
    threshold: Option<&AngularExtent>,
) -> (AngularDistance, Option<PointOnSphere>) {
    if let Some(threshold) = threshold {
        arc.is_close_to(point, threshold)
            .map_or((AngularDistance::PI, None), |(closest, distance)| {
                (distance, Some(closest))
            })
    } else {
        let (closest, cosine) = arc.closest_feature(point);
        (AngularDistance::create_from_cosine(cosine), Some(closest))
    }
}

/// The minimum distance between two arcs.
/// * `arc1`, `arc2` - the arcs.
/// * `threshold` - an optional maximum distance.
///
/// returns the minimum distance and the closest points on `arc1` and `arc2`,
/// or `AngularDistance::PI` and None if the distance exceeds `threshold`.
#[must_use]
pub fn minimum_distance(
    arc1: &GreatCircleArc,
    arc2: &GreatCircleArc,
    threshold: Option<&AngularExtent>,
) -> (AngularDistance, Option<(PointOnSphere, PointOnSphere)>) {
    if let Some(point) = intersect(arc1, arc2) {
        return (AngularDistance::ZERO, Some((point, point)));
    }

    // Arcs that do not intersect are closest at an end-point of one of them.
    let (closest1, closest2) = [
        (arc1.start, arc2.closest_feature(&arc1.start), true),
        (arc1.end, arc2.closest_feature(&arc1.end), true),
        (arc2.start, arc1.closest_feature(&arc2.start), false),
        (arc2.end, arc1.closest_feature(&arc2.end), false),
    ]
    .into_iter()
    .fold(
        (arc1.start, (arc2.start, -2.0)),
        |best, (end_point, (closest, cosine), on_arc1)| {
            if cosine > best.1 .1 {
                if on_arc1 {
                    (end_point, (closest, cosine))
                } else {
                    (closest, (end_point, cosine))
                }
            } else {
                best
            }
        },
    );
    let (closest2, cosine) = closest2;

    let distance = AngularDistance::create_from_cosine(cosine);
    match threshold {
        Some(threshold) if cosine < threshold.get_cosine() => (AngularDistance::PI, None),
        _ => (distance, Some((closest1, closest2))),
    }
}

/// The threshold of a minimum distance to an antipodal geometry that
/// corresponds to a maximum distance `threshold`.
fn antipodal_threshold(threshold: Option<&AngularExtent>) -> Option<AngularExtent> {
    threshold.map(|threshold| AngularExtent::PI - *threshold)
}

/// The maximum distance between a point and an arc, calculated as π minus
/// the minimum distance between the antipodal point and the arc.
/// * `point` - the point.
/// * `arc` - the arc.
/// * `threshold` - an optional minimum distance.
///
/// returns the maximum distance and the furthest point on the arc, or
/// `AngularDistance::ZERO` and None if the distance is less than `threshold`.
#[must_use]
pub fn maximum_distance_to_point(
    point: &PointOnSphere,
    arc: &GreatCircleArc,
    threshold: Option<&AngularExtent>,
) -> (AngularDistance, Option<PointOnSphere>) {
    let threshold = antipodal_threshold(threshold);
    match minimum_distance_to_point(&point.antipodal(), arc, threshold.as_ref()) {
        (distance, Some(furthest)) => (
            AngularDistance::create_from_cosine(-distance.get_cosine()),
            Some(furthest),
        ),
        (_, None) => (AngularDistance::ZERO, None),
    }
}

/// The maximum distance between two arcs, calculated as π minus the minimum
/// distance between `arc1` and the antipodal arc of `arc2`.
/// * `arc1`, `arc2` - the arcs.
/// * `threshold` - an optional minimum distance.
///
/// returns the maximum distance and the furthest points on `arc1` and `arc2`,
/// or `AngularDistance::ZERO` and None if the distance is less than `threshold`.
#[must_use]
pub fn maximum_distance(
    arc1: &GreatCircleArc,
    arc2: &GreatCircleArc,
    threshold: Option<&AngularExtent>,
) -> (AngularDistance, Option<(PointOnSphere, PointOnSphere)>) {
    let threshold = antipodal_threshold(threshold);
    match minimum_distance(arc1, &arc2.antipodal(), threshold.as_ref()) {
        (distance, Some((furthest1, antipodal2))) => (
            AngularDistance::create_from_cosine(-distance.get_cosine()),
            Some((furthest1, antipodal2.antipodal())),
        ),
        (_, None) => (AngularDistance::ZERO, None),
    }
}

/// Subdivide an arc into segments no longer than `max_segment_angle`.
/// * `arc` - the arc to tessellate.
/// * `max_segment_angle` - the maximum angle of a segment.
///
/// returns the tessellated points. The first and last points are always the
/// arc's exact start and end points.
#[must_use]
pub fn tessellate(arc: &GreatCircleArc, max_segment_angle: Radians) -> Vec<PointOnSphere> {
    let length = arc.arc_length().0;
    let segments = if arc.is_zero_length() || !(max_segment_angle.0 > 0.0) {
        1
    } else {
        number_of_segments(length, max_segment_angle.0)
    };

    let mut points = Vec::with_capacity(segments + 1);
    points.push(arc.start);
    #[allow(clippy::cast_precision_loss)]
    let denominator = segments as f64;
    points.extend((1..segments).map(|i| {
        #[allow(clippy::cast_precision_loss)]
        let t = i as f64 / denominator;
        arc.point_on_arc(t)
    }));
    points.push(arc.end);
    points
}

/// The number of uniform segments no longer than `max_segment` that span `length`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn number_of_segments(length: f64, max_segment: f64) -> usize {
    let segments = libm::ceil(length / max_segment);
    if segments < 1.0 {
        1
    } else {
        segments as usize
    }
}
