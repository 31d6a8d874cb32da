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

//! The intersection_graph module contains the vertex lists used to clip
//! geometries to the dateline.
//!
//! All calculations are performed in the dateline frame, i.e. after the
//! geometry has been rotated so that the central meridian is at longitude 0.
//! The dateline is then the half of the great circle y = 0 where x < 0.
//!
//! Each crossing of the dateline creates two intersection vertices: an "exit"
//! copy on the side the geometry is leaving and an "entry" copy on the side it
//! is entering. For polygons, every intersection vertex is also copied into
//! the dateline list: the four corners of the lat/lon rectangle and the
//! intersection vertices in order around its boundary. The polygons are output
//! by traversing both lists, jumping between them at intersection vertices.

#![allow(clippy::float_cmp)]
#![allow(clippy::suboptimal_flops)]

use super::InterpolateOriginalSegment;
use crate::geometry::{calculate_centroid, is_point_in_ring};
use crate::great_circle_arc::{number_of_segments, tessellate as tessellate_arc, GreatCircleArc};
use crate::{make_lat_lon_point, make_point_on_sphere, LatLonPoint, PointOnSphere, Radians};
use alloc::vec::Vec;
use tracing::{trace, warn};
use unit_sphere::vector;

/// Points whose distance from the dateline plane is less than this value are
/// on the plane.
pub const DATELINE_EPSILON: f64 = 1.0e-10;

/// Points whose z coordinate is greater than this value are on a pole.
pub const POLE_CAP_COSINE: f64 = 1.0 - 1.0e-12;

/// The classification of a vertex relative to the dateline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexClassification {
    /// In the eastern hemisphere, off the dateline plane.
    Front,
    /// In the western hemisphere, off the dateline plane.
    Back,
    OnNorthPole,
    OnSouthPole,
    /// On the dateline plane, but on the central meridian half of it.
    OffDatelineArcOnPlane,
    OnDatelineArc,
}

/// Classify a point in the dateline frame.
///
/// The tests are in priority order: the pole caps overlap the dateline plane.
#[must_use]
pub fn classify_vertex(point: &PointOnSphere) -> VertexClassification {
    let y = point.y();
    if y > DATELINE_EPSILON {
        VertexClassification::Front
    } else if y < -DATELINE_EPSILON {
        VertexClassification::Back
    } else if point.z() >= POLE_CAP_COSINE {
        VertexClassification::OnNorthPole
    } else if point.z() <= -POLE_CAP_COSINE {
        VertexClassification::OnSouthPole
    } else if point.x() > 0.0 {
        VertexClassification::OffDatelineArcOnPlane
    } else {
        VertexClassification::OnDatelineArc
    }
}

/// The side of the dateline that a line geometry is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Front,
    Back,
}

impl Side {
    const fn from_classification(classification: VertexClassification) -> Option<Self> {
        match classification {
            VertexClassification::Front => Some(Self::Front),
            VertexClassification::Back => Some(Self::Back),
            _ => None,
        }
    }

    /// The longitude of the dateline on this side.
    const fn longitude(self) -> f64 {
        match self {
            Self::Front => 180.0,
            Self::Back => -180.0,
        }
    }
}

const fn is_on_dateline(classification: VertexClassification) -> bool {
    matches!(
        classification,
        VertexClassification::OnDatelineArc
            | VertexClassification::OnNorthPole
            | VertexClassification::OnSouthPole
    )
}

/// A vertex of the geometry list or the dateline list.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    /// The latitude and longitude in the dateline frame.
    pub point: LatLonPoint,
    pub point3d: Option<PointOnSphere>,
    pub prev: usize,
    pub next: usize,
    pub is_intersection: bool,
    /// Whether the longitude is the point's own, rather than ±180.
    pub is_unwrapped_point: bool,
    pub used_to_output_polygon: bool,
    /// Whether the geometry leaves the lat/lon rectangle here (geometry list),
    /// or the boundary after this vertex is outside the polygon (dateline list).
    pub exits_other_polygon: bool,
    pub interpolate: Option<InterpolateOriginalSegment>,
    /// The corresponding intersection vertex in the other list.
    pub intersection_neighbour: Option<usize>,
}

impl Vertex {
    const fn new(
        point: LatLonPoint,
        point3d: Option<PointOnSphere>,
        is_unwrapped_point: bool,
        interpolate: Option<InterpolateOriginalSegment>,
    ) -> Self {
        Self {
            point,
            point3d,
            prev: 0,
            next: 0,
            is_intersection: false,
            is_unwrapped_point,
            used_to_output_polygon: false,
            exits_other_polygon: false,
            interpolate,
            intersection_neighbour: None,
        }
    }

    const fn intersection(
        point: LatLonPoint,
        point3d: Option<PointOnSphere>,
        interpolate: Option<InterpolateOriginalSegment>,
        exits_other_polygon: bool,
    ) -> Self {
        let mut vertex = Self::new(point, point3d, false, interpolate);
        vertex.is_intersection = true;
        vertex.exits_other_polygon = exits_other_polygon;
        vertex
    }

    /// The 3D point of the vertex.
    fn position(&self) -> PointOnSphere {
        self.point3d
            .unwrap_or_else(|| make_point_on_sphere(&self.point))
    }
}

/// Builds the vertices of a line geometry, inserting intersection vertices
/// where it crosses the dateline.
struct LineBuilder {
    vertices: Vec<Vertex>,
    side: Side,
    /// The previous point, its classification and index.
    previous: Option<(PointOnSphere, VertexClassification, usize)>,
    part_index: usize,
    crosses_north_pole: bool,
    crosses_south_pole: bool,
    has_intersections: bool,
}

impl LineBuilder {
    const fn new(side: Side, part_index: usize) -> Self {
        Self {
            vertices: Vec::new(),
            side,
            previous: None,
            part_index,
            crosses_north_pole: false,
            crosses_south_pole: false,
            has_intersections: false,
        }
    }

    /// Visit the next point of the line geometry.
    /// * `index` - the index of the point in the line geometry.
    /// * `point` - the point in the dateline frame.
    /// * `classification` - the classification of the point.
    /// * `interpolate` - the point's position in the original geometry.
    /// * `output` - whether to output the point, false for the closing
    ///   point of a ring.
    fn visit(
        &mut self,
        index: usize,
        point: &PointOnSphere,
        classification: VertexClassification,
        interpolate: InterpolateOriginalSegment,
        output: bool,
    ) {
        if let Some((previous, previous_classification, previous_index)) = self.previous {
            use VertexClassification::{OffDatelineArcOnPlane, OnDatelineArc};
            let from_dateline = match (previous_classification, classification) {
                (OnDatelineArc, OffDatelineArcOnPlane) => Some(true),
                (OffDatelineArcOnPlane, OnDatelineArc) => Some(false),
                _ => None,
            };
            if let Some(from_dateline) = from_dateline {
                self.cross_pole_on_plane(&previous, point, previous_index, from_dateline);
            }
        }

        if let Some(side) = Side::from_classification(classification) {
            if side != self.side {
                if let Some((previous, previous_classification, previous_index)) = self.previous {
                    if is_on_dateline(previous_classification) {
                        self.cross_at_last_vertex(side);
                    } else if Side::from_classification(previous_classification).is_some() {
                        self.cross_segment(&previous, point, previous_index, side);
                    }
                }
                self.side = side;
            }
        }

        if output {
            let vertex = if is_on_dateline(classification) {
                let latitude = match classification {
                    VertexClassification::OnNorthPole => 90.0,
                    VertexClassification::OnSouthPole => -90.0,
                    _ => make_lat_lon_point(point).latitude(),
                };
                Vertex::new(
                    LatLonPoint::new_unchecked(latitude, self.side.longitude()),
                    Some(*point),
                    false,
                    Some(interpolate),
                )
            } else {
                Vertex::new(make_lat_lon_point(point), Some(*point), true, Some(interpolate))
            };
            self.vertices.push(vertex);
        }
        self.previous = Some((*point, classification, index));
    }

    fn record_pole_crossing(&mut self, latitude: f64) {
        if latitude == 90.0 {
            self.crosses_north_pole = true;
        } else if latitude == -90.0 {
            self.crosses_south_pole = true;
        }
    }

    /// Add the exit and entry copies of a crossing.
    fn add_crossing(
        &mut self,
        latitude: f64,
        point: PointOnSphere,
        interpolate: Option<InterpolateOriginalSegment>,
        side: Side,
    ) {
        trace!(latitude, ?side, "dateline crossing");
        self.record_pole_crossing(latitude);
        self.vertices.push(Vertex::intersection(
            LatLonPoint::new_unchecked(latitude, self.side.longitude()),
            Some(point),
            interpolate,
            true,
        ));
        self.vertices.push(Vertex::intersection(
            LatLonPoint::new_unchecked(latitude, side.longitude()),
            Some(point),
            interpolate,
            false,
        ));
        self.has_intersections = true;
    }

    /// The geometry crossed the dateline at the last vertex, which is on it.
    fn cross_at_last_vertex(&mut self, side: Side) {
        let Some(last) = self.vertices.last_mut() else {
            return;
        };
        last.is_intersection = true;
        last.exits_other_polygon = true;
        let mut entry = *last;
        entry.exits_other_polygon = false;
        entry.point = LatLonPoint::new_unchecked(last.point.latitude(), side.longitude());

        trace!(latitude = entry.point.latitude(), ?side, "dateline crossing at vertex");
        self.record_pole_crossing(entry.point.latitude());
        self.vertices.push(entry);
        self.has_intersections = true;
    }

    /// The segment from `start` to `end` goes from one side of the dateline
    /// plane to the other: across the dateline, a pole or the central meridian.
    fn cross_segment(&mut self, start: &PointOnSphere, end: &PointOnSphere, segment: usize, side: Side) {
        let (y_start, y_end) = (start.y(), end.y());
        let t = y_start / (y_start - y_end);
        let Some(point) = PointOnSphere::from_normalised(
            &(start.position_vector() * (1.0 - t) + end.position_vector() * t),
        ) else {
            return;
        };

        let (latitude, point) = if point.z() >= POLE_CAP_COSINE {
            (90.0, PointOnSphere::north_pole())
        } else if point.z() <= -POLE_CAP_COSINE {
            (-90.0, PointOnSphere::south_pole())
        } else if point.x() < 0.0 {
            (make_lat_lon_point(&point).latitude(), point)
        } else {
            // crosses the central meridian
            return;
        };

        let ratio = arc_ratio(start, end, &point);
        let interpolate = InterpolateOriginalSegment::new(ratio, segment, self.part_index);
        self.add_crossing(latitude, point, Some(interpolate), side);
    }

    /// The segment from `start` to `end` runs along the dateline plane over a
    /// pole, between the dateline and the central meridian.
    ///
    /// The pole is output at the longitude of the dateline and at the central
    /// meridian, so that the line follows the edge of the lat/lon rectangle.
    fn cross_pole_on_plane(
        &mut self,
        start: &PointOnSphere,
        end: &PointOnSphere,
        segment: usize,
        from_dateline: bool,
    ) {
        let (latitude, pole) = if 0.0 <= start.z() + end.z() {
            (90.0, PointOnSphere::north_pole())
        } else {
            (-90.0, PointOnSphere::south_pole())
        };
        trace!(latitude, "pole crossing along the dateline plane");
        self.record_pole_crossing(latitude);

        let ratio = arc_ratio(start, end, &pole);
        let interpolate = Some(InterpolateOriginalSegment::new(ratio, segment, self.part_index));
        let longitudes = if from_dateline {
            [self.side.longitude(), 0.0]
        } else {
            [0.0, self.side.longitude()]
        };
        for longitude in longitudes {
            self.vertices.push(Vertex::new(
                LatLonPoint::new_unchecked(latitude, longitude),
                Some(pole),
                0.0 == longitude,
                interpolate,
            ));
        }
    }
}

/// The fraction of the arc length from `start` to `end` at `point`, a point
/// on the arc.
fn arc_ratio(start: &PointOnSphere, end: &PointOnSphere, point: &PointOnSphere) -> f64 {
    let arc = GreatCircleArc::create_unchecked(*start, *end);
    arc.rotation_axis().map_or(0.0, |axis| {
        vector::calculate_great_circle_atd(
            start.position_vector(),
            axis.position_vector(),
            point.position_vector(),
        )
        .0 / arc.arc_length().0
    })
}

/// The position of an original vertex of a line geometry.
const fn original_vertex(
    index: usize,
    number_of_points: usize,
    is_closed: bool,
    part_index: usize,
) -> InterpolateOriginalSegment {
    if !is_closed && 1 < number_of_points && index + 1 == number_of_points {
        InterpolateOriginalSegment::new(1.0, index - 1, part_index)
    } else {
        InterpolateOriginalSegment::new(0.0, index, part_index)
    }
}

/// Wrap a polyline in the dateline frame.
///
/// returns the vertices of the polylines on either side of the dateline.
#[must_use]
pub fn wrap_polyline(points: &[PointOnSphere]) -> Vec<Vec<Vertex>> {
    let classifications: Vec<_> = points.iter().map(classify_vertex).collect();
    let side = classifications
        .iter()
        .find_map(|c| Side::from_classification(*c))
        .unwrap_or(Side::Front);

    let mut builder = LineBuilder::new(side, 0);
    for (index, (point, classification)) in points.iter().zip(&classifications).enumerate() {
        let interpolate = original_vertex(index, points.len(), false, 0);
        builder.visit(index, point, *classification, interpolate, true);
    }

    let mut lines = Vec::new();
    let mut line = Vec::new();
    for vertex in builder.vertices {
        line.push(vertex);
        if vertex.is_intersection && vertex.exits_other_polygon {
            lines.push(core::mem::take(&mut line));
        }
    }
    lines.push(line);
    lines.retain(|line| 2 <= line.len());
    lines
}

/// The range of a ring's vertices in the geometry list.
#[derive(Clone, Copy, Debug)]
struct RingRange {
    start: usize,
    end: usize,
    has_intersections: bool,
}

/// The corners of the lat/lon rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Corner {
    SouthWest,
    SouthEast,
    NorthEast,
    NorthWest,
}

impl Corner {
    const fn point(self) -> (f64, f64) {
        match self {
            Self::SouthWest => (-90.0, -180.0),
            Self::SouthEast => (-90.0, 180.0),
            Self::NorthEast => (90.0, 180.0),
            Self::NorthWest => (90.0, -180.0),
        }
    }

    /// The position of the corner around the boundary and its rank amongst
    /// intersections at the same position.
    const fn key(self) -> (f64, u8) {
        match self {
            Self::SouthWest => (0.0, 0),
            Self::SouthEast => (1.0, 0),
            Self::NorthEast => (2.0, 2),
            Self::NorthWest => (3.0, 0),
        }
    }
}

/// The position of an intersection around the boundary of the lat/lon
/// rectangle, anti-clockwise from the South West corner.
///
/// Intersections on the poles are ordered after the SE and NW corners and
/// before the NE corner, so that they are on the dateline edges.
fn boundary_key(point: &LatLonPoint) -> (f64, u8) {
    let latitude = point.latitude();
    if 0.0 < point.longitude() {
        (1.0 + (latitude + 90.0) / 180.0, 1)
    } else {
        (3.0 + (90.0 - latitude) / 180.0, 1)
    }
}

/// A polygon output by the intersection graph: vertices in the dateline frame.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedPolygon {
    pub exterior: Vec<Vertex>,
    pub interiors: Vec<Vec<Vertex>>,
}

impl WrappedPolygon {
    const fn new(exterior: Vec<Vertex>) -> Self {
        Self {
            exterior,
            interiors: Vec::new(),
        }
    }
}

/// The geometry and dateline vertex lists of a polygon.
#[derive(Debug)]
pub struct IntersectionGraph {
    geometry_vertices: Vec<Vertex>,
    dateline_vertices: Vec<Vertex>,
    rings: Vec<RingRange>,
    crosses_north_pole: bool,
    crosses_south_pole: bool,
}

impl IntersectionGraph {
    /// Build the geometry list of a polygon.
    /// * `rings` - the rings of the polygon in the dateline frame, exterior first.
    #[must_use]
    pub fn new(rings: &[Vec<PointOnSphere>]) -> Self {
        let mut graph = Self {
            geometry_vertices: Vec::new(),
            dateline_vertices: Vec::new(),
            rings: Vec::with_capacity(rings.len()),
            crosses_north_pole: false,
            crosses_south_pole: false,
        };
        for (part_index, ring) in rings.iter().enumerate() {
            graph.add_ring(ring, part_index);
        }
        graph
    }

    fn add_ring(&mut self, points: &[PointOnSphere], part_index: usize) {
        let classifications: Vec<_> = points.iter().map(classify_vertex).collect();
        // start at a vertex that is definitely on one side of the dateline
        let (first, side) = classifications
            .iter()
            .enumerate()
            .find_map(|(i, c)| Side::from_classification(*c).map(|side| (i, side)))
            .unwrap_or((0, Side::Front));

        let n = points.len();
        let mut builder = LineBuilder::new(side, part_index);
        for offset in 0..n {
            let index = (first + offset) % n;
            let interpolate = original_vertex(index, n, true, part_index);
            builder.visit(index, &points[index], classifications[index], interpolate, true);
        }
        if 0 < n {
            let interpolate = original_vertex(first, n, true, part_index);
            builder.visit(first, &points[first], classifications[first], interpolate, false);
        }

        // link the ring's vertices cyclically
        let start = self.geometry_vertices.len();
        let end = start + builder.vertices.len();
        for (i, mut vertex) in builder.vertices.into_iter().enumerate() {
            let index = start + i;
            vertex.prev = if index == start { end - 1 } else { index - 1 };
            vertex.next = if index + 1 == end { start } else { index + 1 };
            self.geometry_vertices.push(vertex);
        }

        self.rings.push(RingRange {
            start,
            end,
            has_intersections: builder.has_intersections,
        });
        self.crosses_north_pole |= builder.crosses_north_pole;
        self.crosses_south_pole |= builder.crosses_south_pole;
    }

    /// Whether any ring of the polygon crosses the dateline.
    #[must_use]
    pub fn has_intersections(&self) -> bool {
        self.rings.iter().any(|ring| ring.has_intersections)
    }

    /// Build the dateline list and determine whether the dateline boundary
    /// enters or exits the polygon at each intersection.
    /// * `contains_pole` - whether the polygon contains a pole.
    pub fn generate_dateline_list<F>(&mut self, contains_pole: F)
    where
        F: Fn(&PointOnSphere) -> bool,
    {
        let corners = [
            Corner::SouthWest,
            Corner::SouthEast,
            Corner::NorthEast,
            Corner::NorthWest,
        ];
        let mut entries: Vec<((f64, u8), Option<Corner>, Vertex)> = corners
            .iter()
            .map(|&corner| {
                let (latitude, longitude) = corner.point();
                let point = LatLonPoint::new_unchecked(latitude, longitude);
                (corner.key(), Some(corner), Vertex::new(point, None, false, None))
            })
            .collect();
        for (index, vertex) in self.geometry_vertices.iter().enumerate() {
            if vertex.is_intersection {
                let mut copy = Vertex::intersection(vertex.point, vertex.point3d, vertex.interpolate, false);
                copy.intersection_neighbour = Some(index);
                entries.push((boundary_key(&vertex.point), None, copy));
            }
        }
        entries.sort_by(|a, b| a.0 .0.total_cmp(&b.0 .0).then(a.0 .1.cmp(&b.0 .1)));

        let n = entries.len();
        self.dateline_vertices = Vec::with_capacity(n);
        let mut start_corners = (0, 0);
        for (index, (_, corner, mut vertex)) in entries.into_iter().enumerate() {
            vertex.prev = (index + n - 1) % n;
            vertex.next = (index + 1) % n;
            if let Some(neighbour) = vertex.intersection_neighbour {
                self.geometry_vertices[neighbour].intersection_neighbour = Some(index);
            }
            match corner {
                Some(Corner::SouthWest) => start_corners.0 = index,
                Some(Corner::NorthEast) => start_corners.1 = index,
                _ => {}
            }
            self.dateline_vertices.push(vertex);
        }

        // Whether the polygon contains a pole that it does not cross is known,
        // so start there.
        let (start, mut is_inside) = if !self.crosses_south_pole {
            (start_corners.0, contains_pole(&PointOnSphere::south_pole()))
        } else if !self.crosses_north_pole {
            (start_corners.1, contains_pole(&PointOnSphere::north_pole()))
        } else {
            warn!("polygon crosses both poles, entry and exit points are approximate");
            (start_corners.0, false)
        };

        let mut index = start;
        for _ in 0..n {
            let vertex = &mut self.dateline_vertices[index];
            if vertex.is_intersection {
                is_inside = !is_inside;
                vertex.exits_other_polygon = !is_inside;
            }
            index = vertex.next;
        }
    }

    /// Traverse the geometry and dateline lists to output the clipped rings.
    fn traverse(&mut self) -> Vec<Vec<Vertex>> {
        let max_steps = 2 * (self.geometry_vertices.len() + self.dateline_vertices.len()) + 4;
        let mut rings = Vec::new();

        for first in 0..self.geometry_vertices.len() {
            let vertex = &self.geometry_vertices[first];
            if !vertex.is_intersection
                || vertex.exits_other_polygon
                || vertex.used_to_output_polygon
            {
                continue;
            }

            let mut ring = Vec::new();
            let mut current = first;
            let mut steps = 0;
            'ring: loop {
                // follow the geometry from an entry copy to an exit copy,
                // or backwards from an exit copy to an entry copy
                let forward = !self.geometry_vertices[current].exits_other_polygon;
                let mut index = current;
                loop {
                    let vertex = &mut self.geometry_vertices[index];
                    vertex.used_to_output_polygon = true;
                    ring.push(*vertex);
                    steps += 1;
                    if steps > max_steps {
                        warn!(steps, "dateline traversal did not close a ring");
                        break 'ring;
                    }
                    if index != current && vertex.is_intersection {
                        break;
                    }
                    index = if forward { vertex.next } else { vertex.prev };
                }

                // follow the dateline boundary inside the polygon
                let Some(dateline_index) = self.geometry_vertices[index].intersection_neighbour else {
                    break;
                };
                let forward = !self.dateline_vertices[dateline_index].exits_other_polygon;
                let step = |vertex: &Vertex| if forward { vertex.next } else { vertex.prev };
                let mut index = step(&self.dateline_vertices[dateline_index]);
                while !self.dateline_vertices[index].is_intersection {
                    ring.push(self.dateline_vertices[index]);
                    steps += 1;
                    if steps > max_steps {
                        warn!(steps, "dateline traversal did not close a ring");
                        break 'ring;
                    }
                    index = step(&self.dateline_vertices[index]);
                }

                match self.dateline_vertices[index].intersection_neighbour {
                    Some(next) if !self.geometry_vertices[next].used_to_output_polygon => {
                        current = next;
                    }
                    _ => break,
                }
            }

            if 3 <= ring.len() {
                rings.push(ring);
            }
        }
        rings
    }

    /// Output the polygons.
    ///
    /// Rings that do not cross the dateline are output unchanged, interior
    /// rings are either added to the output polygon that contains them or
    /// output as separate polygons.
    /// * `group_interior_with_exterior_rings` - whether to add interior rings
    ///   to the polygons that contain them.
    #[must_use]
    pub fn output_polygons(&mut self, group_interior_with_exterior_rings: bool) -> Vec<WrappedPolygon> {
        let mut polygons: Vec<WrappedPolygon> = if self.has_intersections() {
            self.traverse().into_iter().map(WrappedPolygon::new).collect()
        } else {
            Vec::new()
        };

        for (ring_index, range) in self.rings.iter().enumerate() {
            if range.has_intersections {
                continue;
            }
            let ring = self.geometry_vertices[range.start..range.end].to_vec();
            if ring.is_empty() {
                continue;
            }
            if ring_index == 0 || !group_interior_with_exterior_rings {
                polygons.push(WrappedPolygon::new(ring));
                continue;
            }

            let test_point = ring
                .iter()
                .find(|v| v.is_unwrapped_point)
                .unwrap_or(&ring[0])
                .position();
            if let Some(polygon) = polygons
                .iter_mut()
                .find(|polygon| is_point_in_wrapped_ring(&polygon.exterior, &test_point))
            {
                polygon.interiors.push(ring);
            } else {
                polygons.push(WrappedPolygon::new(ring));
            }
        }
        polygons
    }
}

/// The positions of a ring's vertices on the sphere.
///
/// Edges along the dateline are split at their mid latitude, since an edge
/// from pole to pole has no great circle.
fn ring_positions(ring: &[Vertex]) -> Vec<PointOnSphere> {
    let mut points = Vec::with_capacity(ring.len());
    for (i, vertex) in ring.iter().enumerate() {
        points.push(vertex.position());
        let next = &ring[(i + 1) % ring.len()];
        let (latitude1, latitude2) = (vertex.point.latitude(), next.point.latitude());
        if !vertex.is_unwrapped_point
            && !next.is_unwrapped_point
            && vertex.point.longitude() == next.point.longitude()
            && latitude1 != latitude2
        {
            let midpoint = LatLonPoint::new_unchecked(
                0.5 * (latitude1 + latitude2),
                vertex.point.longitude(),
            );
            points.push(make_point_on_sphere(&midpoint));
        }
    }
    points
}

/// Whether a point is inside a ring output by the intersection graph.
/// * `ring` - the ring's vertices in the dateline frame.
/// * `point` - the point in the dateline frame.
#[must_use]
pub fn is_point_in_wrapped_ring(ring: &[Vertex], point: &PointOnSphere) -> bool {
    let points = ring_positions(ring);
    calculate_centroid(&points).is_some_and(|centroid| is_point_in_ring(&points, &centroid, point))
}

/// Tessellate the vertices of a line geometry in the dateline frame.
/// * `vertices` - the vertices.
/// * `is_closed` - whether to tessellate the closing edge of a ring.
/// * `max_segment_angle` - the maximum angle of a tessellated segment.
///
/// Edges along the dateline are tessellated by latitude, edges along a pole
/// are not tessellated and all other edges are tessellated along their great
/// circle arcs. Tessellated vertices do not interpolate an original segment.
/// The vertices are returned unchanged if `max_segment_angle` is not positive.
#[must_use]
pub fn tessellate(vertices: &[Vertex], is_closed: bool, max_segment_angle: Radians) -> Vec<Vertex> {
    if max_segment_angle.0.is_nan() || max_segment_angle.0 <= 0.0 {
        return vertices.to_vec();
    }
    let mut result = Vec::with_capacity(vertices.len());
    for (i, vertex) in vertices.iter().enumerate() {
        result.push(*vertex);
        let next = if i + 1 < vertices.len() {
            vertices.get(i + 1)
        } else if is_closed && 1 < vertices.len() {
            vertices.first()
        } else {
            None
        };
        if let Some(next) = next {
            tessellate_edge(vertex, next, max_segment_angle, &mut result);
        }
    }
    result
}

#[allow(clippy::cast_precision_loss)]
fn tessellate_edge(start: &Vertex, end: &Vertex, max_segment_angle: Radians, result: &mut Vec<Vertex>) {
    let (latitude1, latitude2) = (start.point.latitude(), end.point.latitude());
    if 90.0 == libm::fabs(latitude1) && latitude1 == latitude2 {
        return;
    }

    if !start.is_unwrapped_point
        && !end.is_unwrapped_point
        && start.point.longitude() == end.point.longitude()
    {
        let delta = latitude2 - latitude1;
        let segments = number_of_segments(libm::fabs(delta.to_radians()), max_segment_angle.0);
        let longitude = start.point.longitude();
        result.extend((1..segments).map(|k| {
            let latitude = latitude1 + delta * k as f64 / segments as f64;
            Vertex::new(LatLonPoint::new_unchecked(latitude, longitude), None, false, None)
        }));
        return;
    }

    let arc = GreatCircleArc::create_unchecked(start.position(), end.position());
    let points = tessellate_arc(&arc, max_segment_angle);
    if 2 < points.len() {
        result.extend(
            points[1..points.len() - 1]
                .iter()
                .map(|p| Vertex::new(make_lat_lon_point(p), Some(*p), true, None)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use angle_sc::is_within_tolerance;

    fn point(lat: f64, lon: f64) -> PointOnSphere {
        make_point_on_sphere(&LatLonPoint::new(lat, lon).unwrap())
    }

    fn lat_lons(vertices: &[Vertex]) -> Vec<(f64, f64)> {
        vertices
            .iter()
            .map(|v| (v.point.latitude(), v.point.longitude()))
            .collect()
    }

    #[test]
    fn test_classify_vertex() {
        assert_eq!(VertexClassification::Front, classify_vertex(&point(10.0, 90.0)));
        assert_eq!(VertexClassification::Back, classify_vertex(&point(10.0, -90.0)));
        assert_eq!(
            VertexClassification::OnNorthPole,
            classify_vertex(&PointOnSphere::north_pole())
        );
        assert_eq!(
            VertexClassification::OnSouthPole,
            classify_vertex(&PointOnSphere::south_pole())
        );
        assert_eq!(
            VertexClassification::OffDatelineArcOnPlane,
            classify_vertex(&point(10.0, 0.0))
        );
        assert_eq!(
            VertexClassification::OnDatelineArc,
            classify_vertex(&point(10.0, 180.0))
        );
        assert_eq!(
            VertexClassification::OnDatelineArc,
            classify_vertex(&point(-10.0, -180.0))
        );
    }

    #[test]
    fn test_wrap_polyline_crossing() {
        let lines = wrap_polyline(&[point(0.0, 170.0), point(0.0, -170.0)]);
        assert_eq!(2, lines.len());
        assert_eq!(2, lines[0].len());
        assert_eq!(2, lines[1].len());
        assert_eq!(180.0, lines[0][1].point.longitude());
        assert_eq!(-180.0, lines[1][0].point.longitude());
        assert!(is_within_tolerance(0.0, lines[0][1].point.latitude(), 1e-12));

        let interpolate = lines[0][1].interpolate.unwrap();
        assert!(is_within_tolerance(0.5, interpolate.interpolate_ratio(), 1e-12));
        assert_eq!(0, interpolate.original_segment_index());

        let last = lines[1][1].interpolate.unwrap();
        assert_eq!(1.0, last.interpolate_ratio());
        assert_eq!(0, last.original_segment_index());
    }

    #[test]
    fn test_wrap_polyline_central_meridian_crossing() {
        let lines = wrap_polyline(&[point(0.0, 10.0), point(0.0, -10.0)]);
        assert_eq!(1, lines.len());
        assert_eq!(2, lines[0].len());
    }

    #[test]
    fn test_wrap_polyline_through_dateline_vertex() {
        let lines = wrap_polyline(&[point(0.0, 170.0), point(0.0, 180.0), point(0.0, -170.0)]);
        assert_eq!(2, lines.len());
        assert_eq!(180.0, lines[0][1].point.longitude());
        assert_eq!(-180.0, lines[1][0].point.longitude());

        // touching the dateline is not crossing it
        let lines = wrap_polyline(&[point(0.0, 170.0), point(0.0, 180.0), point(10.0, 170.0)]);
        assert_eq!(1, lines.len());
        assert_eq!(3, lines[0].len());
        assert_eq!(180.0, lines[0][1].point.longitude());

        // starting on the dateline
        let lines = wrap_polyline(&[point(0.0, 180.0), point(0.0, -170.0)]);
        assert_eq!(1, lines.len());
        assert_eq!(-180.0, lines[0][0].point.longitude());
    }

    #[test]
    fn test_wrap_polyline_interpolate_ratio() {
        // the ratio is along the arc, 10° of 30°
        let lines = wrap_polyline(&[point(0.0, 170.0), point(0.0, -160.0)]);
        assert_eq!(2, lines.len());
        let interpolate = lines[0][1].interpolate.unwrap();
        assert!(is_within_tolerance(1.0 / 3.0, interpolate.interpolate_ratio(), 1e-12));
        assert_eq!(interpolate, lines[1][0].interpolate.unwrap());
    }

    #[test]
    fn test_wrap_polyline_over_pole_along_dateline_plane() {
        let lines = wrap_polyline(&[
            point(10.0, 170.0),
            point(10.0, 180.0),
            point(10.0, 0.0),
            point(10.0, -10.0),
        ]);
        assert_eq!(1, lines.len());
        let points = lat_lons(&lines[0]);
        assert_eq!(6, points.len());
        assert_eq!((90.0, 180.0), points[2]);
        assert_eq!((90.0, 0.0), points[3]);
        assert!(is_within_tolerance(10.0, points[4].0, 1e-12));
        assert!(is_within_tolerance(0.0, points[4].1, 1e-12));

        let interpolate = lines[0][2].interpolate.unwrap();
        assert_eq!(1, interpolate.original_segment_index());
        assert!(is_within_tolerance(0.5, interpolate.interpolate_ratio(), 1e-12));

        // and back again, over the South pole
        let lines = wrap_polyline(&[point(-10.0, 10.0), point(-10.0, 0.0), point(-10.0, 180.0)]);
        assert_eq!(1, lines.len());
        let points = lat_lons(&lines[0]);
        assert_eq!(5, points.len());
        assert_eq!((-90.0, 0.0), points[2]);
        assert_eq!((-90.0, 180.0), points[3]);
    }

    #[test]
    fn test_polygon_over_pole_along_dateline_plane() {
        let ring = alloc::vec![
            point(10.0, 170.0),
            point(10.0, 180.0),
            point(10.0, 0.0),
            point(0.0, 90.0),
        ];
        let mut graph = IntersectionGraph::new(&[ring]);
        assert!(!graph.has_intersections());
        assert!(graph.crosses_north_pole);
        assert!(!graph.crosses_south_pole);

        let polygons = graph.output_polygons(true);
        assert_eq!(1, polygons.len());
        let points = lat_lons(&polygons[0].exterior);
        assert_eq!(6, points.len());
        assert!(points.contains(&(90.0, 180.0)));
        assert!(points.contains(&(90.0, 0.0)));
    }

    #[test]
    fn test_square_polygon() {
        let ring = alloc::vec![
            point(10.0, 170.0),
            point(10.0, -170.0),
            point(-10.0, -170.0),
            point(-10.0, 170.0),
        ];
        let mut graph = IntersectionGraph::new(&[ring]);
        assert!(graph.has_intersections());
        graph.generate_dateline_list(|_| false);
        let polygons = graph.output_polygons(true);
        assert_eq!(2, polygons.len());
        for polygon in &polygons {
            assert_eq!(4, polygon.exterior.len());
            let on_dateline = polygon
                .exterior
                .iter()
                .filter(|v| 180.0 == libm::fabs(v.point.longitude()))
                .count();
            assert_eq!(2, on_dateline);
        }
    }

    #[test]
    fn test_polar_cap_polygon() {
        let ring = alloc::vec![point(80.0, 0.0), point(80.0, 120.0), point(80.0, -120.0)];
        let mut graph = IntersectionGraph::new(&[ring]);
        graph.generate_dateline_list(|_| false);
        let polygons = graph.output_polygons(true);
        assert_eq!(1, polygons.len());

        // the ring is closed along the North pole
        let points = lat_lons(&polygons[0].exterior);
        assert_eq!(7, points.len());
        assert!(points.contains(&(90.0, 180.0)));
        assert!(points.contains(&(90.0, -180.0)));
    }

    #[test]
    fn test_polygon_crossing_north_pole() {
        let ring = alloc::vec![
            point(70.0, 90.0),
            point(70.0, -90.0),
            point(60.0, -135.0),
            point(60.0, 135.0),
        ];
        let mut graph = IntersectionGraph::new(&[ring]);
        assert!(graph.crosses_north_pole);
        assert!(!graph.crosses_south_pole);
        graph.generate_dateline_list(|_| false);
        let polygons = graph.output_polygons(true);
        assert_eq!(2, polygons.len());
        assert_eq!(4, polygons[0].exterior.len());
        assert_eq!(4, polygons[1].exterior.len());
    }

    #[test]
    fn test_polygon_crossing_south_pole() {
        let ring = alloc::vec![
            point(-70.0, 90.0),
            point(-70.0, -90.0),
            point(-60.0, -135.0),
            point(-60.0, 135.0),
        ];
        let mut graph = IntersectionGraph::new(&[ring]);
        assert!(!graph.crosses_north_pole);
        assert!(graph.crosses_south_pole);
        graph.generate_dateline_list(|_| false);
        let polygons = graph.output_polygons(true);
        assert_eq!(2, polygons.len());
    }

    #[test]
    fn test_polygon_crossing_both_poles() {
        // A hemisphere bounded by the ±90 meridians: whether the dateline
        // boundary starts inside or outside the polygon is chosen arbitrarily.
        let ring = alloc::vec![
            point(0.0, 90.0),
            point(80.0, 90.0),
            point(80.0, -90.0),
            point(0.0, -90.0),
            point(-80.0, -90.0),
            point(-80.0, 90.0),
        ];
        let mut graph = IntersectionGraph::new(&[ring]);
        assert!(graph.crosses_north_pole);
        assert!(graph.crosses_south_pole);
        graph.generate_dateline_list(|_| true);
        let polygons = graph.output_polygons(true);
        assert_eq!(2, polygons.len());
        for polygon in &polygons {
            assert_eq!(5, polygon.exterior.len());
        }
    }

    #[test]
    fn test_is_point_in_wrapped_ring() {
        // the Northern edge bulges towards the pole between its end points
        let ring: Vec<Vertex> = [(60.0, 150.0), (60.0, 170.0), (-20.0, 170.0), (-20.0, 150.0)]
            .iter()
            .map(|&(lat, lon)| Vertex::new(LatLonPoint::new(lat, lon).unwrap(), None, true, None))
            .collect();
        assert!(is_point_in_wrapped_ring(&ring, &point(60.2, 160.0)));
        assert!(!is_point_in_wrapped_ring(&ring, &point(60.6, 160.0)));
        assert!(!is_point_in_wrapped_ring(&ring, &point(0.0, 175.0)));

        // a ring along the whole dateline, from the South pole to the North pole
        let ring: Vec<Vertex> = [(-90.0, 180.0), (90.0, 180.0), (90.0, 90.0), (0.0, 90.0)]
            .iter()
            .enumerate()
            .map(|(i, &(lat, lon))| {
                Vertex::new(LatLonPoint::new(lat, lon).unwrap(), None, 1 < i, None)
            })
            .collect();
        assert!(is_point_in_wrapped_ring(&ring, &point(10.0, 150.0)));
        assert!(!is_point_in_wrapped_ring(&ring, &point(10.0, 60.0)));
    }

    #[test]
    fn test_tessellate_along_dateline() {
        let vertices = [
            Vertex::new(LatLonPoint::new(-90.0, 180.0).unwrap(), None, false, None),
            Vertex::new(LatLonPoint::new(90.0, 180.0).unwrap(), None, false, None),
            Vertex::new(LatLonPoint::new(90.0, -180.0).unwrap(), None, false, None),
        ];
        let result = tessellate(&vertices, false, Radians(11.0_f64.to_radians()));
        // 17 segments along the dateline, none along the pole
        assert_eq!(19, result.len());
        for pair in result[..18].windows(2) {
            assert_eq!(180.0, pair[1].point.longitude());
            assert!(pair[0].point.latitude() < pair[1].point.latitude());
        }
        assert!(is_within_tolerance(
            -90.0 + 180.0 / 17.0,
            result[1].point.latitude(),
            1e-12
        ));
        assert_eq!(-180.0, result[18].point.longitude());
    }
}
