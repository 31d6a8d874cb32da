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

//! sphere-geometry
//!
//! A library for performing robust geometric calculations with points,
//! great circle arcs, polylines and polygons on the surface of a unit sphere.
//!
//! ## Great circle arcs
//!
//! The shortest path between two points on the surface of a sphere is a
//! [great circle arc](https://en.wikipedia.org/wiki/Great_circle).
//! A `GreatCircleArc` is defined by its start and end points, which must not be
//! antipodal since then there is no unique shortest path between them.
//! A zero-length arc is valid, but it has no determinate rotation axis.
//!
//! Angles between points are compared in "cosine space", using
//! `AngularDistance` and `AngularExtent`, to avoid the cost of
//! inverse trigonometric functions in comparison heavy code.
//!
//! ## Intersections
//!
//! The `polyline_intersections` module partitions two polylines (or polygon
//! rings) at their points of intersection or overlap into a graph of
//! non-intersecting partitioned polylines and shared intersection nodes.
//!
//! ## Dateline wrapping
//!
//! The `dateline` module clips polylines and polygons to the dateline
//! (the great circle arc from the South to the North pole at longitude ±180°)
//! of an arbitrary central meridian, so that they can be displayed as
//! latitude/longitude geometries that do not cross the ±180° longitude seam.
//!
//! ## Design
//!
//! The library depends upon the following crates:
//!
//! - [angle-sc](https://crates.io/crates/angle-sc) - to define `Angle`,
//!   `Degrees` and `Radians` and perform trigonometric calculations;
//! - [unit-sphere](https://crates.io/crates/unit-sphere) - to define `Vector3d`
//!   and convert between latitude/longitude and points on the unit sphere.
//! - [thiserror](https://crates.io/crates/thiserror) - to define `GeometryError`.
//! - [tracing](https://crates.io/crates/tracing) - for diagnostics.
//!
//! All of the algorithms are pure functions of immutable inputs, so
//! independent calls may be made on separate threads without synchronisation.
//!
//! The library is declared [no_std](https://docs.rust-embedded.org/book/intro/no-std.html)
//! so it can be used in embedded applications.

#![cfg_attr(not(test), no_std)]

extern crate alloc;
extern crate angle_sc;
extern crate unit_sphere;

pub mod angular;
pub mod dateline;
pub mod error;
pub mod geometry;
pub mod great_circle_arc;
pub mod polyline_intersections;

pub use angle_sc::{Angle, Degrees, Radians, Validate};
pub use angular::{AngularDistance, AngularExtent};
pub use dateline::{
    DateLineWrapper, InterpolateOriginalSegment, LatLonMultiPoint, LatLonPolygon, LatLonPolyline,
    WrapOptions,
};
pub use error::GeometryError;
pub use geometry::{
    BoundingSmallCircle, LineGeometry, MultiPointOnSphere, PolygonOnSphere, PolylineOnSphere,
};
pub use great_circle_arc::GreatCircleArc;
pub use unit_sphere::Vector3d;

use unit_sphere::vector;

/// The maximum difference of the square of a vector's magnitude from one for
/// the vector to be considered a unit vector.
pub const UNIT_VECTOR_EPSILON: f64 = 1.0e-10;

/// A point on the surface of the unit sphere.
///
/// The point is a 3D unit vector. Equality is exact vector equality.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointOnSphere(Vector3d);

impl Validate for PointOnSphere {
    /// Test whether a `PointOnSphere` is valid, i.e. whether it is a unit vector.
    fn is_valid(&self) -> bool {
        libm::fabs(self.0.norm_squared() - 1.0) <= UNIT_VECTOR_EPSILON
    }
}

impl PointOnSphere {
    /// Construct a `PointOnSphere` from a unit vector.
    /// * `v` - the unit vector.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::NonUnitVector` if `v` is not of unit length.
    pub fn new(v: Vector3d) -> Result<Self, GeometryError> {
        let point = Self(v);
        if point.is_valid() {
            Ok(point)
        } else {
            Err(GeometryError::NonUnitVector)
        }
    }

    /// Construct a `PointOnSphere` by normalising a vector.
    /// * `v` - the vector, it need not be of unit length.
    ///
    /// returns None if the vector is too short to be normalised.
    #[must_use]
    pub fn from_normalised(v: &Vector3d) -> Option<Self> {
        vector::normalise(v).map(Self)
    }

    /// Construct a `PointOnSphere` without checking that `v` is a unit vector.
    #[must_use]
    pub(crate) const fn new_unchecked(v: Vector3d) -> Self {
        Self(v)
    }

    /// The North pole.
    #[must_use]
    pub fn north_pole() -> Self {
        Self(Vector3d::new(0.0, 0.0, 1.0))
    }

    /// The South pole.
    #[must_use]
    pub fn south_pole() -> Self {
        Self(Vector3d::new(0.0, 0.0, -1.0))
    }

    /// Accessor for the unit vector of the point.
    #[must_use]
    pub const fn position_vector(&self) -> &Vector3d {
        &self.0
    }

    /// Accessor for the x coordinate of the point.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.0.x
    }

    /// Accessor for the y coordinate of the point.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.0.y
    }

    /// Accessor for the z coordinate of the point.
    #[must_use]
    pub fn z(&self) -> f64 {
        self.0.z
    }

    /// The dot product of this point with another point, i.e. the cosine of
    /// the angle between them.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.0.dot(&other.0)
    }

    /// The point on the opposite side of the sphere.
    #[must_use]
    pub fn antipodal(&self) -> Self {
        Self(-self.0)
    }

    /// Whether this point is within `AngularExtent` `threshold` of another point.
    #[must_use]
    pub fn is_close_to(&self, other: &Self, threshold: &AngularExtent) -> bool {
        self.dot(other) >= threshold.get_cosine()
    }
}

/// A latitude and longitude in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLonPoint {
    latitude: f64,
    longitude: f64,
}

impl Validate for LatLonPoint {
    /// Test whether a `LatLonPoint` is valid.
    /// I.e. whether -90 <= latitude <= 90 and -360 <= longitude <= 360.
    fn is_valid(&self) -> bool {
        Self::is_valid_latitude(self.latitude) && Self::is_valid_longitude(self.longitude)
    }
}

impl LatLonPoint {
    /// Construct a `LatLonPoint`.
    /// * `latitude` - the latitude in degrees, [-90, 90].
    /// * `longitude` - the longitude in degrees, [-360, 360].
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidLatitude` or `GeometryError::InvalidLongitude`
    /// if the values are out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeometryError> {
        if !Self::is_valid_latitude(latitude) {
            return Err(GeometryError::InvalidLatitude(latitude));
        }
        if !Self::is_valid_longitude(longitude) {
            return Err(GeometryError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Construct a `LatLonPoint` from values already known to be in range.
    #[must_use]
    pub(crate) const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    #[must_use]
    pub fn is_valid_latitude(latitude: f64) -> bool {
        (-90.0..=90.0).contains(&latitude)
    }

    #[must_use]
    pub fn is_valid_longitude(longitude: f64) -> bool {
        (-360.0..=360.0).contains(&longitude)
    }

    /// Accessor for the latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Accessor for the longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl From<&LatLonPoint> for PointOnSphere {
    fn from(lat_lon: &LatLonPoint) -> Self {
        make_point_on_sphere(lat_lon)
    }
}

impl From<&PointOnSphere> for LatLonPoint {
    fn from(point: &PointOnSphere) -> Self {
        make_lat_lon_point(point)
    }
}

/// Convert a `LatLonPoint` to a `PointOnSphere`.
/// * `lat_lon` - the latitude and longitude.
///
/// # Examples
/// ```
/// use sphere_geometry::{make_point_on_sphere, LatLonPoint};
/// use angle_sc::is_within_tolerance;
///
/// let lat_lon = LatLonPoint::new(0.0, 90.0).unwrap();
/// let point = make_point_on_sphere(&lat_lon);
/// assert!(is_within_tolerance(0.0, point.x(), f64::EPSILON));
/// assert!(is_within_tolerance(1.0, point.y(), f64::EPSILON));
/// assert!(is_within_tolerance(0.0, point.z(), f64::EPSILON));
/// ```
#[must_use]
pub fn make_point_on_sphere(lat_lon: &LatLonPoint) -> PointOnSphere {
    PointOnSphere(vector::to_point(
        Angle::from(Degrees(lat_lon.latitude)),
        Angle::from(Degrees(lat_lon.longitude)),
    ))
}

/// Convert a `PointOnSphere` to a `LatLonPoint`.
/// The longitude is in the range [-180, 180] degrees.
/// * `point` - the point on the sphere.
#[must_use]
pub fn make_lat_lon_point(point: &PointOnSphere) -> LatLonPoint {
    LatLonPoint {
        latitude: Degrees::from(vector::latitude(&point.0)).0,
        longitude: Degrees::from(vector::longitude(&point.0)).0,
    }
}
