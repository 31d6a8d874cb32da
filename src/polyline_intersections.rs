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

//! The polyline_intersections module partitions two line geometries at their
//! points of intersection and overlap.
//!
//! Each geometry is converted into an arena linked list of its (non zero-length)
//! arcs. Every pair of arcs is tested for intersection and, where they
//! intersect, both arcs are split at the point of intersection. Where arcs lie
//! on the same great circle and overlap, the overlapping sub-arc is split out
//! of both lists and tagged as overlapping.
//!
//! Splitting an arc only ever inserts nodes after it, so the arcs that remain
//! to be tested are always reachable from the current node.
//!
//! Two geometries that only touch at an end-point of each are not considered
//! to intersect.

#![allow(clippy::suboptimal_flops)]

use crate::geometry::{line_arcs, LineGeometry, PolylineOnSphere};
use crate::great_circle_arc::{intersect, point_on_arc_threshold, GreatCircleArc};
use crate::{AngularExtent, PointOnSphere};
use alloc::vec::Vec;
use tracing::{debug, trace};
use unit_sphere::vector;

/// The tolerance of the near each other tests.
pub const NEAR_EPSILON: f64 = 1.0e-12;

/// Arcs on the same great circle whose overlap is shorter than this angle
/// (in radians) touch, rather than overlap.
pub const TOUCH_ANGLE: f64 = 2.0e-6;

/// A polyline between two consecutive intersections of a geometry, or between
/// an intersection and an end of the geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionedPolyline {
    polyline: PolylineOnSphere,
    is_overlapping: bool,
    prev_intersection: Option<usize>,
    next_intersection: Option<usize>,
}

impl PartitionedPolyline {
    /// Accessor for the partitioned polyline.
    #[must_use]
    pub const fn polyline(&self) -> &PolylineOnSphere {
        &self.polyline
    }

    /// Whether the partitioned polyline overlaps the other geometry.
    #[must_use]
    pub const fn is_overlapping(&self) -> bool {
        self.is_overlapping
    }

    /// The index of the intersection at the start of the partitioned polyline,
    /// None if it starts at the start of its geometry.
    #[must_use]
    pub const fn prev_intersection(&self) -> Option<usize> {
        self.prev_intersection
    }

    /// The index of the intersection at the end of the partitioned polyline,
    /// None if it ends at the end of its geometry.
    #[must_use]
    pub const fn next_intersection(&self) -> Option<usize> {
        self.next_intersection
    }
}

/// A point of intersection shared by both geometries.
///
/// The partitioned polyline indices refer to `Graph::partitioned_polylines1`
/// and `Graph::partitioned_polylines2` respectively.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    position: PointOnSphere,
    prev_partitioned_polyline1: Option<usize>,
    next_partitioned_polyline1: Option<usize>,
    prev_partitioned_polyline2: Option<usize>,
    next_partitioned_polyline2: Option<usize>,
}

impl Intersection {
    const fn new(position: PointOnSphere) -> Self {
        Self {
            position,
            prev_partitioned_polyline1: None,
            next_partitioned_polyline1: None,
            prev_partitioned_polyline2: None,
            next_partitioned_polyline2: None,
        }
    }

    /// Accessor for the position of the intersection.
    #[must_use]
    pub const fn position(&self) -> &PointOnSphere {
        &self.position
    }

    /// The partitioned polyline of the first geometry that ends here.
    #[must_use]
    pub const fn prev_partitioned_polyline1(&self) -> Option<usize> {
        self.prev_partitioned_polyline1
    }

    /// The partitioned polyline of the first geometry that starts here.
    #[must_use]
    pub const fn next_partitioned_polyline1(&self) -> Option<usize> {
        self.next_partitioned_polyline1
    }

    /// The partitioned polyline of the second geometry that ends here.
    #[must_use]
    pub const fn prev_partitioned_polyline2(&self) -> Option<usize> {
        self.prev_partitioned_polyline2
    }

    /// The partitioned polyline of the second geometry that starts here.
    #[must_use]
    pub const fn next_partitioned_polyline2(&self) -> Option<usize> {
        self.next_partitioned_polyline2
    }
}

/// The two partitioned geometries and their shared intersections.
///
/// The intersections are in the order they are encountered along the first
/// geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    partitioned_polylines1: Vec<PartitionedPolyline>,
    partitioned_polylines2: Vec<PartitionedPolyline>,
    intersections: Vec<Intersection>,
}

impl Graph {
    /// Accessor for the partitioned polylines of the first geometry.
    #[must_use]
    pub fn partitioned_polylines1(&self) -> &[PartitionedPolyline] {
        &self.partitioned_polylines1
    }

    /// Accessor for the partitioned polylines of the second geometry.
    #[must_use]
    pub fn partitioned_polylines2(&self) -> &[PartitionedPolyline] {
        &self.partitioned_polylines2
    }

    /// Accessor for the intersection points.
    #[must_use]
    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }
}

#[derive(Clone, Debug)]
struct ArcNode {
    arc: GreatCircleArc,
    is_overlapping: bool,
    /// The intersection at the start point of the arc.
    start_intersection: Option<usize>,
    next: Option<usize>,
}

/// A geometry's arcs as a linked list in an arena.
#[derive(Debug)]
struct ArcList {
    nodes: Vec<ArcNode>,
    head: Option<usize>,
    /// The intersection at the end point of an open geometry.
    tail_intersection: Option<usize>,
    is_closed: bool,
    /// The first and last points of an open geometry.
    terminals: Option<(PointOnSphere, PointOnSphere)>,
}

impl ArcList {
    fn new<G: LineGeometry + ?Sized>(geometry: &G) -> Self {
        let points = geometry.line_points();
        let is_closed = geometry.is_closed();

        let mut nodes: Vec<ArcNode> = line_arcs(points, is_closed)
            .filter(|arc| !arc.is_zero_length())
            .map(|arc| ArcNode {
                arc,
                is_overlapping: false,
                start_intersection: None,
                next: None,
            })
            .collect();
        let count = nodes.len();
        for (i, node) in nodes.iter_mut().enumerate() {
            node.next = (i + 1 < count).then_some(i + 1);
        }

        Self {
            head: (0 < count).then_some(0),
            nodes,
            tail_intersection: None,
            is_closed,
            terminals: if is_closed {
                None
            } else {
                points.first().copied().zip(points.last().copied())
            },
        }
    }

    /// The node indices in list order.
    fn ordered_indices(&self) -> Vec<usize> {
        let mut indices = Vec::with_capacity(self.nodes.len());
        let mut index = self.head;
        while let Some(i) = index {
            indices.push(i);
            index = self.nodes[i].next;
        }
        indices
    }

    /// Whether `point` is the first or last point of an open geometry.
    fn is_terminal(&self, point: &PointOnSphere, threshold: &AngularExtent) -> bool {
        self.terminals.is_some_and(|(first, last)| {
            point.is_close_to(&first, threshold) || point.is_close_to(&last, threshold)
        })
    }

    /// Split the arc of node `index` at `point`, which lies on the arc, and
    /// record intersection `id` there.
    ///
    /// returns the index of the node whose arc starts at `point`, or None if
    /// `point` is the end of an open geometry.
    fn split(&mut self, index: usize, point: PointOnSphere, id: usize) -> Option<usize> {
        let threshold = point_on_arc_threshold();
        let start = *self.nodes[index].arc.start_point();
        let end = *self.nodes[index].arc.end_point();

        if point.is_close_to(&start, &threshold) {
            mark(&mut self.nodes[index].start_intersection, id);
            return Some(index);
        }

        if point.is_close_to(&end, &threshold) {
            let next = self.nodes[index]
                .next
                .or_else(|| self.head.filter(|_| self.is_closed));
            if let Some(next) = next {
                mark(&mut self.nodes[next].start_intersection, id);
            } else {
                mark(&mut self.tail_intersection, id);
            }
            return next;
        }

        let new_index = self.nodes.len();
        let node = ArcNode {
            arc: GreatCircleArc::create_unchecked(point, end),
            is_overlapping: self.nodes[index].is_overlapping,
            start_intersection: Some(id),
            next: self.nodes[index].next,
        };
        self.nodes.push(node);
        self.nodes[index].arc = GreatCircleArc::create_unchecked(start, point);
        self.nodes[index].next = Some(new_index);
        Some(new_index)
    }

    /// Split out the sub-arc from `first` to `second` of the arc of node
    /// `index` and tag it as overlapping.
    fn split_overlap(
        &mut self,
        index: usize,
        (first, first_id): (PointOnSphere, usize),
        (second, second_id): (PointOnSphere, usize),
    ) {
        if let Some(overlap) = self.split(index, first, first_id) {
            self.split(overlap, second, second_id);
            self.nodes[overlap].is_overlapping = true;
        }
    }
}

/// Record intersection `id` in `slot`, unless an intersection is already there.
fn mark(slot: &mut Option<usize>, id: usize) {
    if slot.is_none() {
        *slot = Some(id);
    }
}

/// The half angle of an arc, from the half angle identities.
fn half_extent(arc: &GreatCircleArc) -> AngularExtent {
    let cosine = arc.dot_of_endpoints();
    AngularExtent::create_from_cosine_and_sine(
        libm::sqrt(f64::max(0.0, 0.5 * (1.0 + cosine))),
        libm::sqrt(f64::max(0.0, 0.5 * (1.0 - cosine))),
    )
}

/// Whether the end-points of `arc` are both strictly on the same side of the
/// plane with normal `axis`.
fn is_on_one_side(axis: &PointOnSphere, arc: &GreatCircleArc) -> bool {
    let start = axis.dot(arc.start_point());
    let end = axis.dot(arc.end_point());
    (start > NEAR_EPSILON && end > NEAR_EPSILON) || (start < -NEAR_EPSILON && end < -NEAR_EPSILON)
}

/// A cheap test to reject arcs that cannot intersect.
///
/// Arcs cannot intersect if either arc is entirely on one side of the other's
/// great circle, or if the distance between their midpoints is greater than
/// the sum of their half lengths.
fn arcs_are_near_each_other(arc1: &GreatCircleArc, arc2: &GreatCircleArc) -> bool {
    if let (Ok(axis1), Ok(axis2)) = (arc1.rotation_axis(), arc2.rotation_axis()) {
        if is_on_one_side(&axis1, arc2) || is_on_one_side(&axis2, arc1) {
            return false;
        }
    }

    let bound = half_extent(arc1) + half_extent(arc2);
    arc1.midpoint().dot(&arc2.midpoint()) >= bound.get_cosine() - NEAR_EPSILON
}

/// The state of the partitioning of two geometries.
struct Partitioner {
    list1: ArcList,
    list2: ArcList,
    positions: Vec<PointOnSphere>,
    threshold: AngularExtent,
}

impl Partitioner {
    /// The id of the intersection at `point`, adding a new intersection if
    /// there is none close to it.
    fn intersection_id(&mut self, point: PointOnSphere) -> usize {
        if let Some(id) = self
            .positions
            .iter()
            .position(|p| p.is_close_to(&point, &self.threshold))
        {
            id
        } else {
            trace!(?point, "new intersection");
            self.positions.push(point);
            self.positions.len() - 1
        }
    }

    fn add_intersection(&mut self, index1: usize, index2: usize, point: PointOnSphere) {
        if self.list1.is_terminal(&point, &self.threshold)
            && self.list2.is_terminal(&point, &self.threshold)
        {
            trace!(?point, "ignoring end-point only intersection");
            return;
        }

        let id = self.intersection_id(point);
        self.list1.split(index1, point, id);
        self.list2.split(index2, point, id);
    }

    fn process_arcs(&mut self, index1: usize, index2: usize) {
        let arc1 = self.list1.nodes[index1].arc.clone();
        let arc2 = self.list2.nodes[index2].arc.clone();
        if !arcs_are_near_each_other(&arc1, &arc2) {
            return;
        }
        let (Ok(axis1), Ok(axis2)) = (arc1.rotation_axis(), arc2.rotation_axis()) else {
            return;
        };

        let on_same_great_circle = libm::fabs(axis1.dot(arc2.start_point())) <= NEAR_EPSILON
            && libm::fabs(axis1.dot(arc2.end_point())) <= NEAR_EPSILON;
        if on_same_great_circle {
            self.process_same_great_circle(index1, index2, &arc1, &arc2, &axis1, &axis2);
        } else if let Some(point) = intersect(&arc1, &arc2) {
            self.add_intersection(index1, index2, point);
        }
    }

    /// Arcs on the same great circle either touch at an end-point or overlap.
    ///
    /// Positions on the great circle are measured as angles from the start of
    /// `arc1` in its direction of rotation.
    fn process_same_great_circle(
        &mut self,
        index1: usize,
        index2: usize,
        arc1: &GreatCircleArc,
        arc2: &GreatCircleArc,
        axis1: &PointOnSphere,
        axis2: &PointOnSphere,
    ) {
        let start1 = arc1.start_point();
        let angle = |p: &PointOnSphere| {
            vector::calculate_great_circle_atd(
                start1.position_vector(),
                axis1.position_vector(),
                p.position_vector(),
            )
            .0
        };

        let same_direction = 0.0 < axis1.dot(axis2);
        let (low_point, high_point) = if same_direction {
            (*arc2.start_point(), *arc2.end_point())
        } else {
            (*arc2.end_point(), *arc2.start_point())
        };
        let low = angle(&low_point);
        let high = low + arc2.arc_length().0;
        let length1 = arc1.arc_length().0;

        let overlap = f64::min(length1, high) - f64::max(0.0, low);
        if overlap < -TOUCH_ANGLE {
            return;
        }

        let overlap_start = if 0.0 < low { low_point } else { *start1 };
        if overlap <= TOUCH_ANGLE {
            self.add_intersection(index1, index2, overlap_start);
            return;
        }

        let overlap_end = if high < length1 {
            high_point
        } else {
            *arc1.end_point()
        };
        trace!(?overlap_start, ?overlap_end, "overlapping arcs");

        let start = (overlap_start, self.intersection_id(overlap_start));
        let end = (overlap_end, self.intersection_id(overlap_end));
        self.list1.split_overlap(index1, start, end);
        if same_direction {
            self.list2.split_overlap(index2, start, end);
        } else {
            self.list2.split_overlap(index2, end, start);
        }
    }

    /// Test every pair of arcs that are not already known to overlap.
    fn run(&mut self) {
        let mut index1 = self.list1.head;
        while let Some(i1) = index1 {
            let mut index2 = self.list2.head;
            while let Some(i2) = index2 {
                if !self.list1.nodes[i1].is_overlapping && !self.list2.nodes[i2].is_overlapping {
                    self.process_arcs(i1, i2);
                }
                index2 = self.list2.nodes[i2].next;
            }
            index1 = self.list1.nodes[i1].next;
        }
    }
}

/// A partitioned polyline with intersection ids rather than indices.
struct RawPartition {
    points: Vec<PointOnSphere>,
    is_overlapping: bool,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Partition an arc list at its intersections.
fn partition_list(list: &ArcList) -> Vec<RawPartition> {
    let mut order = list.ordered_indices();
    if list.is_closed {
        // start a ring at an intersection
        if let Some(first) = order
            .iter()
            .position(|&i| list.nodes[i].start_intersection.is_some())
        {
            order.rotate_left(first);
        }
    }

    let mut partitions = Vec::new();
    let mut current: Option<RawPartition> = None;
    for &index in &order {
        let node = &list.nodes[index];
        if let Some(id) = node.start_intersection {
            if let Some(mut partition) = current.take() {
                partition.next = Some(id);
                partitions.push(partition);
            }
        }
        current
            .get_or_insert_with(|| RawPartition {
                points: alloc::vec![*node.arc.start_point()],
                is_overlapping: node.is_overlapping,
                prev: node.start_intersection,
                next: None,
            })
            .points
            .push(*node.arc.end_point());
    }

    if let Some(mut partition) = current {
        partition.next = if list.is_closed {
            order
                .first()
                .and_then(|&i| list.nodes[i].start_intersection)
        } else {
            list.tail_intersection
        };
        partitions.push(partition);
    }
    partitions
}

/// Build the output graph from the partitioned lists.
fn build_graph(list1: &ArcList, list2: &ArcList, positions: &[PointOnSphere]) -> Graph {
    let partitions1 = partition_list(list1);
    let partitions2 = partition_list(list2);

    // number the intersections in the order they occur along the first geometry
    let mut output_index: Vec<Option<usize>> = alloc::vec![None; positions.len()];
    let mut intersections = Vec::with_capacity(positions.len());
    let ids = partitions1
        .iter()
        .flat_map(|p| [p.prev, p.next])
        .chain(partitions2.iter().flat_map(|p| [p.prev, p.next]))
        .flatten();
    for id in ids {
        if output_index[id].is_none() {
            output_index[id] = Some(intersections.len());
            intersections.push(Intersection::new(positions[id]));
        }
    }
    let map = |id: Option<usize>| id.and_then(|id| output_index[id]);

    for (i, partition) in partitions1.iter().enumerate() {
        if let Some(prev) = map(partition.prev) {
            intersections[prev].next_partitioned_polyline1 = Some(i);
        }
        if let Some(next) = map(partition.next) {
            intersections[next].prev_partitioned_polyline1 = Some(i);
        }
    }
    for (i, partition) in partitions2.iter().enumerate() {
        if let Some(prev) = map(partition.prev) {
            intersections[prev].next_partitioned_polyline2 = Some(i);
        }
        if let Some(next) = map(partition.next) {
            intersections[next].prev_partitioned_polyline2 = Some(i);
        }
    }

    let convert = |partitions: Vec<RawPartition>| {
        partitions
            .into_iter()
            .map(|p| PartitionedPolyline {
                polyline: PolylineOnSphere::new_unchecked(p.points),
                is_overlapping: p.is_overlapping,
                prev_intersection: map(p.prev),
                next_intersection: map(p.next),
            })
            .collect::<Vec<_>>()
    };

    Graph {
        partitioned_polylines1: convert(partitions1),
        partitioned_polylines2: convert(partitions2),
        intersections,
    }
}

/// Partition two line geometries at their points of intersection and overlap.
/// The geometries may be polylines or polygons, in which case the exterior
/// ring of the polygon is partitioned.
/// * `geometry1`, `geometry2` - the geometries.
///
/// returns the partitioned geometries and their intersections, or None if the
/// geometries do not intersect. Geometries that only touch at an end-point of
/// each do not intersect.
#[must_use]
pub fn partition_intersecting_geometries<G1, G2>(geometry1: &G1, geometry2: &G2) -> Option<Graph>
where
    G1: LineGeometry + ?Sized,
    G2: LineGeometry + ?Sized,
{
    let mut partitioner = Partitioner {
        list1: ArcList::new(geometry1),
        list2: ArcList::new(geometry2),
        positions: Vec::new(),
        threshold: point_on_arc_threshold(),
    };
    partitioner.run();

    if partitioner.positions.is_empty() {
        debug!("geometries do not intersect");
        return None;
    }

    let graph = build_graph(&partitioner.list1, &partitioner.list2, &partitioner.positions);
    debug!(
        intersections = graph.intersections.len(),
        partitioned_polylines1 = graph.partitioned_polylines1.len(),
        partitioned_polylines2 = graph.partitioned_polylines2.len(),
        "partitioned intersecting geometries"
    );
    Some(graph)
}
