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

//! Property-based tests of arcs, angular extents and lat/lon conversion.

use angle_sc::is_within_tolerance;
use proptest::prelude::*;
use sphere_geometry::great_circle_arc::{minimum_distance, tessellate};
use sphere_geometry::{
    make_lat_lon_point, make_point_on_sphere, AngularDistance, AngularExtent, GeometryError,
    GreatCircleArc, LatLonPoint, PointOnSphere, Radians,
};

/// Arbitrary point, excluding the poles where longitude is undefined.
fn arb_lat_lon() -> impl Strategy<Value = (f64, f64)> {
    (-89.9f64..89.9, -179.9f64..179.9)
}

fn to_point((lat, lon): (f64, f64)) -> PointOnSphere {
    make_point_on_sphere(&LatLonPoint::new(lat, lon).unwrap())
}

/// Whether two points are far enough from antipodal to define an arc.
fn is_arc(p1: &PointOnSphere, p2: &PointOnSphere) -> bool {
    -1.0 + 1e-9 < p1.dot(p2)
}

proptest! {
    #[test]
    fn arc_create_keeps_end_points(a in arb_lat_lon(), b in arb_lat_lon()) {
        let (p1, p2) = (to_point(a), to_point(b));
        prop_assume!(is_arc(&p1, &p2));
        let arc = GreatCircleArc::create(p1, p2).unwrap();
        prop_assert_eq!(&p1, arc.start_point());
        prop_assert_eq!(&p2, arc.end_point());
    }
}

proptest! {
    #[test]
    fn arc_create_antipodal_fails(a in arb_lat_lon()) {
        let p = to_point(a);
        let q = p.antipodal();
        let is_antipodal = |result: Result<GreatCircleArc, GeometryError>| {
            matches!(result, Err(GeometryError::AntipodalArcEndpoints { .. }))
        };
        prop_assert!(is_antipodal(GreatCircleArc::create(p, q)));
        prop_assert!(is_antipodal(GreatCircleArc::create(q, p)));
    }
}

proptest! {
    #[test]
    fn minimum_distance_to_self_is_zero(a in arb_lat_lon(), b in arb_lat_lon()) {
        let (p1, p2) = (to_point(a), to_point(b));
        prop_assume!(is_arc(&p1, &p2));
        let arc = GreatCircleArc::create(p1, p2).unwrap();
        let (distance, closest) = minimum_distance(&arc, &arc, None);
        prop_assert_eq!(AngularDistance::ZERO, distance);
        prop_assert!(closest.is_some());
    }
}

proptest! {
    #[test]
    fn minimum_distance_is_symmetric(
        a in arb_lat_lon(),
        b in arb_lat_lon(),
        c in arb_lat_lon(),
        d in arb_lat_lon(),
    ) {
        let (p1, p2, p3, p4) = (to_point(a), to_point(b), to_point(c), to_point(d));
        prop_assume!(is_arc(&p1, &p2) && is_arc(&p3, &p4));
        let arc1 = GreatCircleArc::create(p1, p2).unwrap();
        let arc2 = GreatCircleArc::create(p3, p4).unwrap();
        let (distance12, _) = minimum_distance(&arc1, &arc2, None);
        let (distance21, _) = minimum_distance(&arc2, &arc1, None);
        prop_assert!(is_within_tolerance(
            distance12.get_cosine(),
            distance21.get_cosine(),
            1e-9
        ));
    }
}

proptest! {
    #[test]
    fn pi_minus_pi_minus_extent(angle in 0.0f64..core::f64::consts::PI) {
        let x = AngularExtent::create_from_angle(Radians(angle)).unwrap();
        let result = AngularExtent::PI - (AngularExtent::PI - x);
        prop_assert!(is_within_tolerance(x.get_cosine(), result.get_cosine(), 1e-12));
        prop_assert!(is_within_tolerance(x.get_sine(), result.get_sine(), 1e-12));
    }
}

proptest! {
    #[test]
    fn lat_lon_round_trip(a in arb_lat_lon()) {
        let lat_lon = LatLonPoint::new(a.0, a.1).unwrap();
        let result = make_lat_lon_point(&make_point_on_sphere(&lat_lon));
        prop_assert!(is_within_tolerance(lat_lon.latitude(), result.latitude(), 1e-9));
        prop_assert!(is_within_tolerance(lat_lon.longitude(), result.longitude(), 1e-9));
    }
}

proptest! {
    #[test]
    fn tessellate_keeps_end_points(
        a in arb_lat_lon(),
        b in arb_lat_lon(),
        max_angle in 0.001f64..4.0,
    ) {
        let (p1, p2) = (to_point(a), to_point(b));
        prop_assume!(is_arc(&p1, &p2));
        let arc = GreatCircleArc::create(p1, p2).unwrap();
        let points = tessellate(&arc, Radians(max_angle));
        prop_assert!(2 <= points.len());
        prop_assert_eq!(Some(&p1), points.first());
        prop_assert_eq!(Some(&p2), points.last());
    }
}
