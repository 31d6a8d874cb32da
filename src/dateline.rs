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

//! The dateline module converts geometries on the sphere into
//! latitude/longitude geometries that do not cross the dateline.
//!
//! The dateline is the great circle arc from the South pole to the North pole
//! at 180° from a central meridian. Geometries are rotated so that the central
//! meridian is at longitude 0, clipped to the dateline and then rotated back,
//! so the output longitudes are in the range:
//! [central meridian - 180°, central meridian + 180°].
//!
//! Polylines are split where they cross the dateline.
//! Polygons are clipped to the dateline and, where they contain a pole,
//! closed along the pole.

pub mod intersection_graph;

use crate::geometry::{MultiPointOnSphere, PolygonOnSphere, PolylineOnSphere};
use crate::{make_lat_lon_point, Angle, Degrees, LatLonPoint, PointOnSphere, Radians, Vector3d};
use alloc::vec::Vec;
use intersection_graph::{IntersectionGraph, Vertex};
use tracing::debug;

/// The position of an output point in the original geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterpolateOriginalSegment {
    interpolate_ratio: f64,
    original_segment_index: usize,
    original_geometry_part_index: usize,
}

impl InterpolateOriginalSegment {
    #[must_use]
    pub const fn new(
        interpolate_ratio: f64,
        original_segment_index: usize,
        original_geometry_part_index: usize,
    ) -> Self {
        Self {
            interpolate_ratio,
            original_segment_index,
            original_geometry_part_index,
        }
    }

    /// The fraction of the original segment's arc length: 0 at its start,
    /// 1 at its end.
    #[must_use]
    pub const fn interpolate_ratio(&self) -> f64 {
        self.interpolate_ratio
    }

    /// The index of the segment in its ring or polyline.
    #[must_use]
    pub const fn original_segment_index(&self) -> usize {
        self.original_segment_index
    }

    /// The index of the ring in the original polygon, 0 for the exterior
    /// ring and polylines.
    #[must_use]
    pub const fn original_geometry_part_index(&self) -> usize {
        self.original_geometry_part_index
    }
}

/// A sequence of latitude/longitude points, with the position of each point
/// in the original geometry.
///
/// Points that were tessellated or added at the corners of the dateline
/// do not have an original position.
/// The rings of a `LatLonPolygon` do not repeat their first point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LatLonPolyline {
    points: Vec<LatLonPoint>,
    interpolate_original_segments: Vec<Option<InterpolateOriginalSegment>>,
}

impl LatLonPolyline {
    /// Accessor for the points.
    #[must_use]
    pub fn points(&self) -> &[LatLonPoint] {
        &self.points
    }

    /// Accessor for the positions of the points in the original geometry.
    #[must_use]
    pub fn interpolate_original_segments(&self) -> &[Option<InterpolateOriginalSegment>] {
        &self.interpolate_original_segments
    }

    /// Accessor for the number of points.
    #[must_use]
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }
}

/// A latitude/longitude polygon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LatLonPolygon {
    exterior_ring: LatLonPolyline,
    interior_rings: Vec<LatLonPolyline>,
}

impl LatLonPolygon {
    /// Accessor for the exterior ring.
    #[must_use]
    pub const fn exterior_ring(&self) -> &LatLonPolyline {
        &self.exterior_ring
    }

    /// Accessor for the interior rings.
    #[must_use]
    pub fn interior_rings(&self) -> &[LatLonPolyline] {
        &self.interior_rings
    }
}

/// Latitude/longitude points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LatLonMultiPoint {
    points: Vec<LatLonPoint>,
}

impl LatLonMultiPoint {
    /// Accessor for the points.
    #[must_use]
    pub fn points(&self) -> &[LatLonPoint] {
        &self.points
    }
}

/// Options for wrapping polylines and polygons.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WrapOptions {
    /// The maximum angle between tessellated points, no tessellation if None.
    pub tessellate: Option<Radians>,
    /// Whether to add interior rings that do not cross the dateline to the
    /// output polygons that contain them, otherwise they are output as
    /// separate polygons.
    pub group_interior_with_exterior_rings: bool,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            tessellate: None,
            group_interior_with_exterior_rings: true,
        }
    }
}

impl WrapOptions {
    #[must_use]
    pub const fn with_tessellation(mut self, max_segment_angle: Radians) -> Self {
        self.tessellate = Some(max_segment_angle);
        self
    }

    #[must_use]
    pub const fn with_grouping(mut self, group_interior_with_exterior_rings: bool) -> Self {
        self.group_interior_with_exterior_rings = group_interior_with_exterior_rings;
        self
    }
}

/// Wraps geometries to the dateline of a central meridian.
///
/// # Examples
/// ```
/// use sphere_geometry::{
///     make_point_on_sphere, DateLineWrapper, LatLonPoint, PolylineOnSphere, WrapOptions,
/// };
///
/// let points = [(0.0, 170.0), (0.0, -170.0)]
///     .iter()
///     .map(|&(lat, lon)| make_point_on_sphere(&LatLonPoint::new(lat, lon).unwrap()))
///     .collect();
/// let polyline = PolylineOnSphere::new(points).unwrap();
///
/// let wrapper = DateLineWrapper::default();
/// let polylines = wrapper.wrap_polyline(&polyline, &WrapOptions::default());
/// assert_eq!(2, polylines.len());
/// assert_eq!(180.0, polylines[0].points()[1].longitude());
/// assert_eq!(-180.0, polylines[1].points()[0].longitude());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DateLineWrapper {
    /// The central meridian in degrees, [-180, 180].
    central_meridian: f64,
    angle: Angle,
}

impl Default for DateLineWrapper {
    fn default() -> Self {
        Self::new(Degrees(0.0))
    }
}

impl DateLineWrapper {
    /// Construct a `DateLineWrapper`.
    /// * `central_meridian` - the longitude of the central meridian, it is
    ///   normalised to the range [-180, 180].
    #[must_use]
    pub fn new(central_meridian: Degrees) -> Self {
        let angle = Angle::from(central_meridian);
        let central_meridian = if (-180.0..=180.0).contains(&central_meridian.0) {
            central_meridian.0
        } else {
            Degrees::from(angle).0
        };
        Self {
            central_meridian,
            angle,
        }
    }

    #[must_use]
    pub const fn central_meridian(&self) -> Degrees {
        Degrees(self.central_meridian)
    }

    /// Rotate a point so that the central meridian is at longitude zero.
    fn rotate_to_frame(&self, point: &PointOnSphere) -> PointOnSphere {
        let (sin, cos) = (self.angle.sin().0, self.angle.cos().0);
        PointOnSphere::new_unchecked(Vector3d::new(
            point.x() * cos + point.y() * sin,
            point.y() * cos - point.x() * sin,
            point.z(),
        ))
    }

    fn rotate_points(&self, points: &[PointOnSphere]) -> Vec<PointOnSphere> {
        points.iter().map(|p| self.rotate_to_frame(p)).collect()
    }

    /// Convert a latitude/longitude in the dateline frame.
    fn rotate_from_frame(&self, point: &LatLonPoint) -> LatLonPoint {
        LatLonPoint::new_unchecked(point.latitude(), point.longitude() + self.central_meridian)
    }

    fn output_line(&self, vertices: &[Vertex], is_closed: bool, options: &WrapOptions) -> LatLonPolyline {
        let tessellated;
        let vertices = if let Some(max_segment_angle) = options.tessellate {
            tessellated = intersection_graph::tessellate(vertices, is_closed, max_segment_angle);
            tessellated.as_slice()
        } else {
            vertices
        };
        LatLonPolyline {
            points: vertices.iter().map(|v| self.rotate_from_frame(&v.point)).collect(),
            interpolate_original_segments: vertices.iter().map(|v| v.interpolate).collect(),
        }
    }

    /// Wrap a polyline to the dateline.
    /// * `polyline` - the polyline.
    /// * `options` - the wrapping options, only `tessellate` is used.
    ///
    /// returns the polyline split where it crosses the dateline.
    #[must_use]
    pub fn wrap_polyline(&self, polyline: &PolylineOnSphere, options: &WrapOptions) -> Vec<LatLonPolyline> {
        let points = self.rotate_points(polyline.vertices());
        let lines = intersection_graph::wrap_polyline(&points);
        debug!(
            central_meridian = self.central_meridian,
            polylines = lines.len(),
            "wrapped polyline"
        );
        lines
            .iter()
            .map(|line| self.output_line(line, false, options))
            .collect()
    }

    /// Wrap a polygon to the dateline.
    /// * `polygon` - the polygon.
    /// * `options` - the wrapping options.
    ///
    /// returns the polygon clipped to the dateline.
    #[must_use]
    pub fn wrap_polygon(&self, polygon: &PolygonOnSphere, options: &WrapOptions) -> Vec<LatLonPolygon> {
        let rings: Vec<Vec<PointOnSphere>> = polygon
            .rings()
            .map(|ring| self.rotate_points(ring))
            .collect();
        let mut graph = IntersectionGraph::new(&rings);
        if graph.has_intersections() {
            // The poles are not moved by the rotation
            graph.generate_dateline_list(|pole| polygon.is_point_in_polygon(pole));
        }
        let polygons = graph.output_polygons(options.group_interior_with_exterior_rings);
        debug!(
            central_meridian = self.central_meridian,
            polygons = polygons.len(),
            "wrapped polygon"
        );

        polygons
            .iter()
            .map(|wrapped| LatLonPolygon {
                exterior_ring: self.output_line(&wrapped.exterior, true, options),
                interior_rings: wrapped
                    .interiors
                    .iter()
                    .map(|ring| self.output_line(ring, true, options))
                    .collect(),
            })
            .collect()
    }

    /// Convert the points of a multi-point to latitude/longitude points with
    /// longitudes relative to the central meridian.
    #[must_use]
    pub fn wrap_multi_point(&self, multi_point: &MultiPointOnSphere) -> LatLonMultiPoint {
        LatLonMultiPoint {
            points: multi_point
                .points()
                .iter()
                .map(|p| self.rotate_from_frame(&make_lat_lon_point(&self.rotate_to_frame(p))))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_point_on_sphere;
    use angle_sc::is_within_tolerance;

    fn points(lat_lons: &[(f64, f64)]) -> Vec<PointOnSphere> {
        lat_lons
            .iter()
            .map(|&(lat, lon)| make_point_on_sphere(&LatLonPoint::new(lat, lon).unwrap()))
            .collect()
    }

    fn longitudes(line: &LatLonPolyline) -> Vec<f64> {
        line.points().iter().map(LatLonPoint::longitude).collect()
    }

    #[test]
    fn test_wrap_options() {
        let options = WrapOptions::default();
        assert!(options.tessellate.is_none());
        assert!(options.group_interior_with_exterior_rings);

        let options = options
            .with_tessellation(Radians(0.1))
            .with_grouping(false);
        assert_eq!(Some(Radians(0.1)), options.tessellate);
        assert!(!options.group_interior_with_exterior_rings);
    }

    #[test]
    fn test_central_meridian() {
        assert_eq!(Degrees(0.0), DateLineWrapper::default().central_meridian());
        let wrapper = DateLineWrapper::new(Degrees(-200.0));
        assert!(is_within_tolerance(160.0, wrapper.central_meridian().0, 1e-12));
    }

    #[test]
    fn test_wrap_polyline_crossing_dateline() {
        let polyline = PolylineOnSphere::new(points(&[(0.0, 170.0), (0.0, -170.0)])).unwrap();
        let polylines = DateLineWrapper::default().wrap_polyline(&polyline, &WrapOptions::default());
        assert_eq!(2, polylines.len());

        assert!(is_within_tolerance(170.0, polylines[0].points()[0].longitude(), 1e-12));
        assert_eq!(180.0, polylines[0].points()[1].longitude());
        assert_eq!(-180.0, polylines[1].points()[0].longitude());
        assert!(is_within_tolerance(-170.0, polylines[1].points()[1].longitude(), 1e-12));

        let segments = polylines[0].interpolate_original_segments();
        let first = segments[0].unwrap();
        assert_eq!(0.0, first.interpolate_ratio());
        assert_eq!(0, first.original_segment_index());
        assert_eq!(0, first.original_geometry_part_index());
        assert!(segments[1].is_some());
    }

    #[test]
    fn test_wrap_polyline_central_meridian() {
        let polyline = PolylineOnSphere::new(points(&[(0.0, 170.0), (0.0, -170.0)])).unwrap();

        // the polyline does not cross the dateline at 0°
        let wrapper = DateLineWrapper::new(Degrees(180.0));
        let polylines = wrapper.wrap_polyline(&polyline, &WrapOptions::default());
        assert_eq!(1, polylines.len());
        let result = longitudes(&polylines[0]);
        assert!(is_within_tolerance(170.0, result[0], 1e-9));
        assert!(is_within_tolerance(190.0, result[1], 1e-9));

        let polyline = PolylineOnSphere::new(points(&[(0.0, -100.0), (0.0, -80.0)])).unwrap();
        let wrapper = DateLineWrapper::new(Degrees(90.0));
        let polylines = wrapper.wrap_polyline(&polyline, &WrapOptions::default());
        assert_eq!(2, polylines.len());
        assert!(is_within_tolerance(270.0, polylines[0].points()[1].longitude(), 1e-9));
        assert!(is_within_tolerance(-90.0, polylines[1].points()[0].longitude(), 1e-9));
    }

    #[test]
    fn test_wrap_polyline_unchanged() {
        let lat_lons = [(10.0, 20.0), (30.0, 40.0), (-10.0, 100.0)];
        let polyline = PolylineOnSphere::new(points(&lat_lons)).unwrap();
        let polylines = DateLineWrapper::default().wrap_polyline(&polyline, &WrapOptions::default());
        assert_eq!(1, polylines.len());
        for (expected, actual) in lat_lons.iter().zip(polylines[0].points()) {
            assert!(is_within_tolerance(expected.0, actual.latitude(), 1e-9));
            assert!(is_within_tolerance(expected.1, actual.longitude(), 1e-9));
        }
    }

    #[test]
    fn test_wrap_polyline_tessellated() {
        let polyline = PolylineOnSphere::new(points(&[(0.0, 170.0), (0.0, -170.0)])).unwrap();
        let options = WrapOptions::default().with_tessellation(Radians(3.0_f64.to_radians()));
        let polylines = DateLineWrapper::default().wrap_polyline(&polyline, &options);
        assert_eq!(2, polylines.len());
        for polyline in &polylines {
            // 10° in segments of at most 3°
            assert_eq!(5, polyline.number_of_points());
            let segments = polyline.interpolate_original_segments();
            assert!(segments[0].is_some());
            assert!(segments[1].is_none());
            assert!(segments[4].is_some());
        }
    }

    #[test]
    fn test_wrap_polyline_over_north_pole() {
        let polyline = PolylineOnSphere::new(points(&[
            (10.0, 170.0),
            (10.0, 180.0),
            (10.0, 0.0),
            (10.0, -10.0),
        ]))
        .unwrap();
        let polylines = DateLineWrapper::default().wrap_polyline(&polyline, &WrapOptions::default());
        assert_eq!(1, polylines.len());
        let poles: Vec<_> = polylines[0]
            .points()
            .iter()
            .filter(|p| 90.0 == p.latitude())
            .map(LatLonPoint::longitude)
            .collect();
        assert_eq!(alloc::vec![180.0, 0.0], poles);

        // tessellated along the dateline and the central meridian, not along the pole
        let options = WrapOptions::default().with_tessellation(Radians(30.0_f64.to_radians()));
        let polylines = DateLineWrapper::default().wrap_polyline(&polyline, &options);
        assert_eq!(1, polylines.len());
        assert_eq!(10, polylines[0].number_of_points());
    }

    #[test]
    fn test_wrap_square_polygon() {
        let polygon = PolygonOnSphere::new(points(&[
            (10.0, 170.0),
            (10.0, -170.0),
            (-10.0, -170.0),
            (-10.0, 170.0),
        ]))
        .unwrap();
        let polygons = DateLineWrapper::default().wrap_polygon(&polygon, &WrapOptions::default());
        assert_eq!(2, polygons.len());
        for polygon in &polygons {
            let ring = polygon.exterior_ring();
            assert_eq!(4, ring.number_of_points());
            assert!(polygon.interior_rings().is_empty());

            // all of the points are on one side of the dateline
            let result = longitudes(ring);
            let east = result.iter().all(|lon| 0.0 < *lon);
            let west = result.iter().all(|lon| *lon < 0.0);
            assert!(east || west);
            assert_eq!(2, result.iter().filter(|lon| 180.0 == libm::fabs(**lon)).count());
        }
    }

    #[test]
    fn test_wrap_polar_cap() {
        let polygon = PolygonOnSphere::new(points(&[(80.0, 0.0), (80.0, 120.0), (80.0, -120.0)])).unwrap();
        assert!(polygon.is_point_in_polygon(&PointOnSphere::north_pole()));

        let polygons = DateLineWrapper::default().wrap_polygon(&polygon, &WrapOptions::default());
        assert_eq!(1, polygons.len());
        let ring = polygons[0].exterior_ring();
        assert_eq!(7, ring.number_of_points());
        let corners = ring
            .points()
            .iter()
            .filter(|p| 90.0 == p.latitude())
            .count();
        assert_eq!(2, corners);
        // the corners were not in the original polygon
        let originals = ring
            .interpolate_original_segments()
            .iter()
            .filter(|s| s.is_none())
            .count();
        assert_eq!(2, originals);
    }

    #[test]
    fn test_wrap_polygon_unchanged() {
        let lat_lons = [(0.0, 0.0), (0.0, 20.0), (20.0, 20.0), (20.0, 0.0)];
        let polygon = PolygonOnSphere::new(points(&lat_lons)).unwrap();
        let polygons = DateLineWrapper::default().wrap_polygon(&polygon, &WrapOptions::default());
        assert_eq!(1, polygons.len());
        let ring = polygons[0].exterior_ring();
        assert_eq!(4, ring.number_of_points());
        for (expected, actual) in lat_lons.iter().zip(ring.points()) {
            assert!(is_within_tolerance(expected.0, actual.latitude(), 1e-9));
            assert!(is_within_tolerance(expected.1, actual.longitude(), 1e-9));
        }
    }

    #[test]
    fn test_wrap_polygon_with_interior_ring() {
        let polygon = polygon_with_hole();
        let polygons = DateLineWrapper::default().wrap_polygon(&polygon, &WrapOptions::default());
        assert_eq!(2, polygons.len());
        let interiors: usize = polygons.iter().map(|p| p.interior_rings().len()).sum();
        assert_eq!(1, interiors);
        let grouped = polygons
            .iter()
            .find(|p| !p.interior_rings().is_empty())
            .unwrap();
        assert!(0.0 < grouped.exterior_ring().points()[0].longitude());
        let ring = &grouped.interior_rings()[0];
        assert_eq!(
            1,
            ring.interpolate_original_segments()[0]
                .unwrap()
                .original_geometry_part_index()
        );

        let options = WrapOptions::default().with_grouping(false);
        let polygons = DateLineWrapper::default().wrap_polygon(&polygon, &options);
        assert_eq!(3, polygons.len());
        assert!(polygons.iter().all(|p| p.interior_rings().is_empty()));
    }

    #[test]
    fn test_wrap_polygon_with_interior_ring_near_a_curved_edge() {
        // the hole is North of the exterior ring's Northern vertices, but
        // South of its great circle edge
        let exterior = points(&[(60.0, 150.0), (60.0, -150.0), (-20.0, -150.0), (-20.0, 150.0)]);
        let interior = points(&[(62.3, 163.0), (62.3, 167.0), (55.0, 167.0), (55.0, 163.0)]);
        let polygon = PolygonOnSphere::with_interior_rings(exterior, alloc::vec![interior]).unwrap();
        assert!(polygon.is_point_in_polygon(&points(&[(62.3, 163.0)])[0]));

        let polygons = DateLineWrapper::default().wrap_polygon(&polygon, &WrapOptions::default());
        assert_eq!(2, polygons.len());
        let grouped: Vec<_> = polygons
            .iter()
            .filter(|p| !p.interior_rings().is_empty())
            .collect();
        assert_eq!(1, grouped.len());
        assert_eq!(1, grouped[0].interior_rings().len());
        assert!(0.0 < grouped[0].exterior_ring().points()[0].longitude());
    }

    fn polygon_with_hole() -> PolygonOnSphere {
        let exterior = points(&[(-20.0, 150.0), (-20.0, -150.0), (20.0, -150.0), (20.0, 150.0)]);
        let interior = points(&[(-5.0, 155.0), (5.0, 155.0), (5.0, 165.0), (-5.0, 165.0)]);
        PolygonOnSphere::with_interior_rings(exterior, alloc::vec![interior]).unwrap()
    }

    #[test]
    fn test_wrap_multi_point() {
        let multi_point = MultiPointOnSphere::new(points(&[(10.0, 170.0), (-10.0, -170.0)])).unwrap();
        let result = DateLineWrapper::new(Degrees(180.0)).wrap_multi_point(&multi_point);
        assert_eq!(2, result.points().len());
        assert!(is_within_tolerance(10.0, result.points()[0].latitude(), 1e-9));
        assert!(is_within_tolerance(170.0, result.points()[0].longitude(), 1e-9));
        assert!(is_within_tolerance(190.0, result.points()[1].longitude(), 1e-9));
    }
}
